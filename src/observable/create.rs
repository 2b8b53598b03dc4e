use crate::observer::Observer;
use crate::subscriber::Subscriber;
use crate::subscription::SingleSubscription;

use super::{Observable, ObservableExt};

/// Creates an observable from a subscribe function.
///
/// The function runs once per subscription and receives a [`Subscriber`]
/// wrapping the downstream observer, through which it can `next` values and
/// finish with `error` or `complete`. Notifications issued after a terminal
/// one are dropped by the subscriber.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// observable::create(|mut subscriber: Subscriber<_>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// })
/// .subscribe(|v| println!("{},", v));
/// ```
pub fn create<F>(subscribe: F) -> ObservableFn<F> { ObservableFn(subscribe) }

#[derive(Clone)]
pub struct ObservableFn<F>(F);

impl<F, Item, Err, O> Observable<Item, Err, O> for ObservableFn<F>
where
  O: Observer<Item, Err>,
  F: FnOnce(Subscriber<O>),
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    (self.0)(Subscriber::new(observer));
    SingleSubscription::default()
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for ObservableFn<F> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn delivers_through_the_subscriber() {
    let values = MutRc::own(Vec::new());
    let completions = MutRc::own(0);

    let c_values = values.clone();
    let c_completions = completions.clone();
    observable::create(|mut subscriber: Subscriber<_>| {
      subscriber.next(1);
      subscriber.next(2);
      subscriber.next(3);
      subscriber.complete();
    })
    .subscribe_complete(
      move |v| c_values.rc_deref_mut().push(v),
      move || *c_completions.rc_deref_mut() += 1,
    );

    assert_eq!(*values.rc_deref(), [1, 2, 3]);
    assert_eq!(*completions.rc_deref(), 1);
  }

  #[test]
  fn nothing_follows_a_terminal_notification() {
    let values = MutRc::own(Vec::new());
    let errors = MutRc::own(0);
    let completions = MutRc::own(0);

    let c_values = values.clone();
    let c_errors = errors.clone();
    let c_completions = completions.clone();
    observable::create(|mut subscriber: Subscriber<_>| {
      subscriber.next(1);
      subscriber.complete();
      subscriber.next(2);
      subscriber.error("late");
      subscriber.complete();
    })
    .subscribe_all(
      move |v| c_values.rc_deref_mut().push(v),
      move |_: &str| *c_errors.rc_deref_mut() += 1,
      move || *c_completions.rc_deref_mut() += 1,
    );

    assert_eq!(*values.rc_deref(), [1]);
    assert_eq!(*errors.rc_deref(), 0);
    assert_eq!(*completions.rc_deref(), 1);
  }

  #[test]
  fn error_is_delivered_once() {
    let errors = MutRc::own(Vec::new());

    let c_errors = errors.clone();
    observable::create(|mut subscriber: Subscriber<_>| {
      subscriber.next(1);
      subscriber.error("boom");
      subscriber.error("boom again");
    })
    .subscribe_err(|_: i32| {}, move |e| c_errors.rc_deref_mut().push(e));

    assert_eq!(*errors.rc_deref(), ["boom"]);
  }
}
