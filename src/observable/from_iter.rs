use crate::observer::Observer;
use crate::rc::{MutArc, MutRc, RcDeref, RcDerefMut};
use crate::scheduler::{
  CurrentThreadScheduler, LocalScheduler, SharedScheduler, TaskState,
};
use crate::subscription::{FnSubscription, SharedSubscription, Subscription};
use std::{
  convert::Infallible,
  iter::{Repeat, Take},
};

use super::{Observable, ObservableExt};

/// Creates an observable that pulls values from an iterator, one per
/// scheduled step.
///
/// Each subscription drives an independent iterator on the default
/// immediate-reentrant scheduler: one value is pulled and pushed per step,
/// and the step re-arms itself through the scheduler, so cancellation is
/// observed before every pull and an endless source never grows the call
/// stack. Completes when the iterator is exhausted. Never emits an error.
///
/// Subscribing consumes the observable; clone it to subscribe again, which
/// hands the new subscription its own clone of the iterable, pulled from the
/// start.
///
/// # Arguments
///
/// * `iter` - An iterable to pull all the values from.
///
/// # Examples
///
/// A simple example for a range:
///
/// ```
/// use rivulet::prelude::*;
///
/// observable::from_iter(0..10)
///   .subscribe(|v| {println!("{},", v)});
/// ```
///
/// Or with a vector:
///
/// ```
/// use rivulet::prelude::*;
///
/// observable::from_iter(vec![0,1,2,3])
///   .subscribe(|v| {println!("{},", v)});
/// ```
pub fn from_iter<Iter>(
  iter: Iter,
) -> ObservableIter<Iter, CurrentThreadScheduler>
where
  Iter: IntoIterator,
{
  from_iter_on(iter, CurrentThreadScheduler)
}

/// [`from_iter`] on a caller-provided local scheduler.
pub fn from_iter_on<Iter, SD>(
  iter: Iter,
  scheduler: SD,
) -> ObservableIter<Iter, SD>
where
  Iter: IntoIterator,
  SD: LocalScheduler,
{
  ObservableIter { iter, scheduler }
}

/// [`from_iter`] on a shared scheduler: the pulls happen on the scheduler's
/// threads and the returned subscription may be cancelled from any thread.
pub fn from_iter_shared<Iter, SD>(
  iter: Iter,
  scheduler: SD,
) -> SharedObservableIter<Iter, SD>
where
  Iter: IntoIterator,
  SD: SharedScheduler,
{
  SharedObservableIter { iter, scheduler }
}

/// Creates an observable from an iterator of `Result`s: `Ok` values are
/// emitted in order, the first `Err` terminates the stream with that error
/// and nothing follows it.
pub fn from_iter_result<Iter, Item, Err>(
  iter: Iter,
) -> ObservableIterResult<Iter, CurrentThreadScheduler>
where
  Iter: IntoIterator<Item = Result<Item, Err>>,
{
  from_iter_result_on(iter, CurrentThreadScheduler)
}

/// [`from_iter_result`] on a caller-provided local scheduler.
pub fn from_iter_result_on<Iter, Item, Err, SD>(
  iter: Iter,
  scheduler: SD,
) -> ObservableIterResult<Iter, SD>
where
  Iter: IntoIterator<Item = Result<Item, Err>>,
  SD: LocalScheduler,
{
  ObservableIterResult { iter, scheduler }
}

/// Creates an observable producing the same value repeated N times.
///
/// Completes immediately after emitting N values. Never emits an error.
///
/// # Arguments
///
/// * `v` - A value to emit.
/// * `n` - A number of times to repeat it.
///
/// # Examples
///
/// ```
/// use rivulet::prelude::*;
///
/// observable::repeat(123, 3)
///   .subscribe(|v| {println!("{},", v)});
///
/// // print log:
/// // 123
/// // 123
/// // 123
/// ```
pub fn repeat<Item>(
  v: Item,
  n: usize,
) -> ObservableIter<Take<Repeat<Item>>, CurrentThreadScheduler>
where
  Item: Clone,
{
  from_iter(std::iter::repeat(v).take(n))
}

#[derive(Clone)]
pub struct ObservableIter<Iter, SD> {
  iter: Iter,
  scheduler: SD,
}

#[derive(Clone)]
pub struct SharedObservableIter<Iter, SD> {
  iter: Iter,
  scheduler: SD,
}

#[derive(Clone)]
pub struct ObservableIterResult<Iter, SD> {
  iter: Iter,
  scheduler: SD,
}

/// Per-subscription pull state: the live iterator plus the disposed flag the
/// subscription's teardown flips. Checked at the head of every scheduled
/// step.
struct IterCursor<I> {
  iter: I,
  disposed: bool,
}

impl<Iter, SD, O> Observable<Iter::Item, Infallible, O>
  for ObservableIter<Iter, SD>
where
  Iter: IntoIterator,
  Iter::IntoIter: 'static,
  O: Observer<Iter::Item, Infallible> + 'static,
  SD: LocalScheduler,
{
  type Unsub = Subscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let cursor =
      MutRc::own(IterCursor { iter: self.iter.into_iter(), disposed: false });

    let step = cursor.clone();
    let handle = self.scheduler.schedule(move || {
      let disposed = step.rc_deref().disposed;
      if disposed || observer.is_closed() {
        return TaskState::Done;
      }
      let pulled = step.rc_deref_mut().iter.next();
      match pulled {
        Some(v) => {
          observer.next(v);
          TaskState::Continue
        }
        None => {
          observer.complete();
          TaskState::Done
        }
      }
    });

    let subscription = Subscription::default();
    subscription.add(handle);
    subscription
      .add(FnSubscription::new(move || cursor.rc_deref_mut().disposed = true));
    subscription
  }
}

impl<Iter, SD> ObservableExt<Iter::Item, Infallible>
  for ObservableIter<Iter, SD>
where
  Iter: IntoIterator,
{
}

impl<Iter, SD, O> Observable<Iter::Item, Infallible, O>
  for SharedObservableIter<Iter, SD>
where
  Iter: IntoIterator,
  Iter::IntoIter: Send + 'static,
  O: Observer<Iter::Item, Infallible> + Send + 'static,
  SD: SharedScheduler,
{
  type Unsub = SharedSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let cursor =
      MutArc::own(IterCursor { iter: self.iter.into_iter(), disposed: false });

    let step = cursor.clone();
    let handle = self.scheduler.schedule(move || {
      let disposed = step.rc_deref().disposed;
      if disposed || observer.is_closed() {
        return TaskState::Done;
      }
      let pulled = step.rc_deref_mut().iter.next();
      match pulled {
        Some(v) => {
          observer.next(v);
          TaskState::Continue
        }
        None => {
          observer.complete();
          TaskState::Done
        }
      }
    });

    let subscription = SharedSubscription::default();
    subscription.add(handle);
    subscription
      .add(FnSubscription::new(move || cursor.rc_deref_mut().disposed = true));
    subscription
  }
}

impl<Iter, SD> ObservableExt<Iter::Item, Infallible>
  for SharedObservableIter<Iter, SD>
where
  Iter: IntoIterator,
{
}

impl<Iter, Item, Err, SD, O> Observable<Item, Err, O>
  for ObservableIterResult<Iter, SD>
where
  Iter: IntoIterator<Item = Result<Item, Err>>,
  Iter::IntoIter: 'static,
  O: Observer<Item, Err> + 'static,
  SD: LocalScheduler,
{
  type Unsub = Subscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let cursor =
      MutRc::own(IterCursor { iter: self.iter.into_iter(), disposed: false });

    let step = cursor.clone();
    let handle = self.scheduler.schedule(move || {
      let disposed = step.rc_deref().disposed;
      if disposed || observer.is_closed() {
        return TaskState::Done;
      }
      let pulled = step.rc_deref_mut().iter.next();
      match pulled {
        Some(Ok(v)) => {
          observer.next(v);
          TaskState::Continue
        }
        Some(Err(e)) => {
          observer.error(e);
          TaskState::Done
        }
        None => {
          observer.complete();
          TaskState::Done
        }
      }
    });

    let subscription = Subscription::default();
    subscription.add(handle);
    subscription
      .add(FnSubscription::new(move || cursor.rc_deref_mut().disposed = true));
    subscription
  }
}

impl<Iter, Item, Err, SD> ObservableExt<Item, Err>
  for ObservableIterResult<Iter, SD>
where
  Iter: IntoIterator<Item = Result<Item, Err>>,
{
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use bencher::{benchmark_group, Bencher};

  fn from_range() {
    let hits = MutRc::own(0);
    let completed = MutRc::own(false);
    let c_hits = hits.clone();
    let c_completed = completed.clone();
    observable::from_iter(0..100).subscribe_complete(
      move |_| *c_hits.rc_deref_mut() += 1,
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*hits.rc_deref(), 100);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn from_range_delivers_all() { from_range(); }

  #[test]
  fn from_vec() {
    let collected = MutRc::own(Vec::new());
    let completed = MutRc::own(false);
    let c_collected = collected.clone();
    let c_completed = completed.clone();
    observable::from_iter(vec![10, 20, 30]).subscribe_complete(
      move |v| c_collected.rc_deref_mut().push(v),
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*collected.rc_deref(), [10, 20, 30]);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn empty_source_only_completes() {
    let hits = MutRc::own(0);
    let completed = MutRc::own(false);
    let c_hits = hits.clone();
    let c_completed = completed.clone();
    observable::from_iter(Vec::<i32>::new()).subscribe_complete(
      move |_| *c_hits.rc_deref_mut() += 1,
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*hits.rc_deref(), 0);
    assert!(*completed.rc_deref());
  }

  #[test]
  fn repeat_three_times() {
    let hits = MutRc::own(0);
    let c_hits = hits.clone();
    repeat(123, 3).subscribe(move |v| {
      *c_hits.rc_deref_mut() += 1;
      assert_eq!(123, v);
    });
    assert_eq!(*hits.rc_deref(), 3);
  }

  #[test]
  fn repeat_zero_times() {
    let hits = MutRc::own(0);
    let c_hits = hits.clone();
    repeat(123, 0).subscribe(move |_| *c_hits.rc_deref_mut() += 1);
    assert_eq!(*hits.rc_deref(), 0);
  }

  #[test]
  fn dispose_before_first_pull_emits_nothing() {
    // subscribing from inside a running stream defers the new stream's
    // steps, so its subscription can be cancelled before any value is
    // pulled
    let inner_hits = MutRc::own(0);
    let c_hits = inner_hits.clone();
    observable::from_iter(0..1).subscribe(move |_| {
      let cc_hits = c_hits.clone();
      let mut sub = observable::from_iter(0..100)
        .subscribe(move |_| *cc_hits.rc_deref_mut() += 1)
        .into_inner();
      sub.unsubscribe();
    });

    assert_eq!(*inner_hits.rc_deref(), 0);
  }

  #[test]
  fn resubscription_pulls_an_independent_iterator() {
    let first = MutRc::own(Vec::new());
    let second = MutRc::own(Vec::new());
    let source = observable::from_iter(vec![1, 2]);

    let c_first = first.clone();
    source.clone().subscribe(move |v| c_first.rc_deref_mut().push(v));
    let c_second = second.clone();
    source.subscribe(move |v| c_second.rc_deref_mut().push(v));

    assert_eq!(*first.rc_deref(), [1, 2]);
    assert_eq!(*second.rc_deref(), [1, 2]);
  }

  #[test]
  fn result_source_stops_at_first_error() {
    let values = MutRc::own(Vec::new());
    let error = MutRc::own(None);
    let completed = MutRc::own(false);

    let c_values = values.clone();
    let c_error = error.clone();
    let c_completed = completed.clone();
    observable::from_iter_result(vec![Ok(1), Ok(2), Err("pull failed")])
      .subscribe_all(
        move |v| c_values.rc_deref_mut().push(v),
        move |e| *c_error.rc_deref_mut() = Some(e),
        move || *c_completed.rc_deref_mut() = true,
      );

    assert_eq!(*values.rc_deref(), [1, 2]);
    assert_eq!(*error.rc_deref(), Some("pull failed"));
    assert!(!*completed.rc_deref());
  }

  #[test]
  fn result_source_without_error_completes() {
    let values = MutRc::own(Vec::new());
    let completed = MutRc::own(false);

    let c_values = values.clone();
    let c_completed = completed.clone();
    observable::from_iter_result(
      (0..3).map(Ok::<_, &str>).collect::<Vec<_>>(),
    )
    .subscribe_all(
      move |v| c_values.rc_deref_mut().push(v),
      |_| {},
      move || *c_completed.rc_deref_mut() = true,
    );

    assert_eq!(*values.rc_deref(), [0, 1, 2]);
    assert!(*completed.rc_deref());
  }

  #[cfg(feature = "pool-scheduler")]
  mod shared {
    use crate::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn delivers_in_order_and_completes() {
      let (tx, rx) = mpsc::channel();
      let done_tx = tx.clone();
      observable::from_iter_shared(0..10, ThreadPoolScheduler::default())
        .subscribe_complete(
          move |v| tx.send(Some(v)).unwrap(),
          move || done_tx.send(None).unwrap(),
        );

      let mut got = Vec::new();
      loop {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
          Some(v) => got.push(v),
          None => break,
        }
      }
      assert_eq!(got, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn unsubscribe_stops_an_endless_source() {
      let count = Arc::new(AtomicUsize::new(0));
      let c_count = count.clone();
      let mut sub =
        observable::from_iter_shared(0.., ThreadPoolScheduler::default())
          .subscribe(move |_: u64| {
            c_count.fetch_add(1, Ordering::SeqCst);
          })
          .into_inner();

      std::thread::sleep(Duration::from_millis(50));
      sub.unsubscribe();
      std::thread::sleep(Duration::from_millis(100));
      let settled = count.load(Ordering::SeqCst);
      std::thread::sleep(Duration::from_millis(100));
      assert_eq!(settled, count.load(Ordering::SeqCst));
    }
  }

  #[test]
  fn bench() { do_bench(); }

  benchmark_group!(do_bench, bench_from_iter);

  fn bench_from_iter(b: &mut Bencher) { b.iter(from_range); }
}
