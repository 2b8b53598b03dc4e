use crate::observer::Observer;
use crate::subscription::SingleSubscription;
use std::marker::PhantomData;

use super::{Observable, ObservableExt};

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// # Examples
/// ```
/// use rivulet::prelude::*;
///
/// observable::empty()
///   .subscribe(|v: i32| {println!("{},", v)});
///
/// // Result: nothing printed
/// ```
pub fn empty<Item>() -> Empty<Item> { Empty(PhantomData) }

pub struct Empty<Item>(PhantomData<Item>);

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Empty<Item>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.complete();
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Empty<Item> {}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error. It is the
/// closing notifier behind `group_by`: a group watching it stays open until
/// the source terminates.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(PhantomData) }

pub struct Never<Item, Err>(PhantomData<(Item, Err)>);

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item, Err, O> Observable<Item, Err, O> for Never<Item, Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, _: O) -> Self::Unsub {
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Never<Item, Err> {}

/// Creates an observable that emits no items and terminates with an error.
///
/// # Arguments
///
/// * `e` - An error to emit and terminate with
pub fn throw<Err>(e: Err) -> Throw<Err> { Throw(e) }

#[derive(Clone)]
pub struct Throw<Err>(Err);

impl<Item, Err, O> Observable<Item, Err, O> for Throw<Err>
where
  O: Observer<Item, Err>,
{
  type Unsub = SingleSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.error(self.0);
    SingleSubscription::default()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Throw<Err> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn throw() {
    let value_emitted = MutRc::own(false);
    let completed = MutRc::own(false);
    let error_emitted = MutRc::own(String::new());

    let c_value = value_emitted.clone();
    let c_completed = completed.clone();
    let c_error = error_emitted.clone();
    observable::throw(String::from("error")).subscribe_all(
      // helping with type inference
      move |_: i32| *c_value.rc_deref_mut() = true,
      move |e| *c_error.rc_deref_mut() = e,
      move || *c_completed.rc_deref_mut() = true,
    );
    assert!(!*value_emitted.rc_deref());
    assert!(!*completed.rc_deref());
    assert_eq!(*error_emitted.rc_deref(), "error");
  }

  #[test]
  fn empty() {
    let hits = MutRc::own(0);
    let completed = MutRc::own(false);

    let c_hits = hits.clone();
    let c_completed = completed.clone();
    observable::empty().subscribe_complete(
      move |_: ()| *c_hits.rc_deref_mut() += 1,
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*hits.rc_deref(), 0);
    assert!(*completed.rc_deref());
  }
}
