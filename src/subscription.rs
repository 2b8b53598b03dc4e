use smallvec::SmallVec;
use std::{
  any::Any,
  cell::RefCell,
  rc::Rc,
  sync::{Arc, Mutex},
};

/// A cancellation handle returned from `Observable.actual_subscribe` and the
/// subscribe family, allowing unsubscribing.
pub trait SubscriptionLike {
  /// Deregisters the stream before it has finished delivering all events.
  /// Idempotent: unsubscribing twice has the same effect as once.
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

/// A standalone closed flag with no upstream effect. Sources that finish
/// delivering within `actual_subscribe` return it.
#[derive(Clone, Debug, Default)]
pub struct SingleSubscription {
  closed: bool,
}

impl SubscriptionLike for SingleSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.closed = true; }
  #[inline]
  fn is_closed(&self) -> bool { self.closed }
}

/// Wraps a zero-argument cleanup action as a subscription. The action runs at
/// most once, on the first `unsubscribe`.
pub struct FnSubscription<F>(Option<F>);

impl<F: FnOnce()> FnSubscription<F> {
  #[inline]
  pub fn new(teardown: F) -> Self { FnSubscription(Some(teardown)) }
}

impl<F: FnOnce()> SubscriptionLike for FnSubscription<F> {
  fn unsubscribe(&mut self) {
    if let Some(teardown) = self.0.take() {
      teardown();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_none() }
}

/// Composite subscription for single-thread use: owns a set of child
/// subscriptions and unsubscribes all of them, exactly once, when it is
/// itself unsubscribed. Cloning shares the same underlying set.
#[derive(Clone, Default)]
pub struct Subscription(Rc<RefCell<Inner<Box<dyn SubscriptionLike>>>>);

impl Subscription {
  /// Adds a child. If this composite is already closed the child is
  /// unsubscribed immediately instead of stored.
  pub fn add<S: SubscriptionLike + 'static>(&self, subscription: S) {
    if !self.is_same(&subscription) {
      self.0.borrow_mut().add(Box::new(subscription));
    }
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Rc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }
}

impl SubscriptionLike for Subscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0.borrow_mut().unsubscribe(); }
  #[inline]
  fn is_closed(&self) -> bool { self.0.borrow().is_closed() }
}

/// Thread-safe composite subscription, for streams driven from a shared
/// scheduler.
#[derive(Clone, Default)]
pub struct SharedSubscription(
  Arc<Mutex<Inner<Box<dyn SubscriptionLike + Send>>>>,
);

impl SharedSubscription {
  pub fn add<S: SubscriptionLike + Send + 'static>(&self, subscription: S) {
    if !self.is_same(&subscription) {
      self.0.lock().unwrap().add(Box::new(subscription));
    }
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Arc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }
}

impl SubscriptionLike for SharedSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0.lock().unwrap().unsubscribe(); }
  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().unwrap().is_closed() }
}

struct Inner<T> {
  closed: bool,
  teardown: SmallVec<[T; 1]>,
}

impl<T: SubscriptionLike> SubscriptionLike for Inner<T> {
  #[inline(always)]
  fn is_closed(&self) -> bool { self.closed }

  fn unsubscribe(&mut self) {
    if !self.closed {
      self.closed = true;
      for v in &mut self.teardown {
        v.unsubscribe();
      }
      self.teardown.clear();
    }
  }
}

impl<T: SubscriptionLike> Inner<T> {
  fn add(&mut self, mut v: T) {
    if self.closed {
      v.unsubscribe();
    } else {
      self.teardown.retain(|v| !v.is_closed());
      self.teardown.push(v);
    }
  }
}

impl<T> Default for Inner<T> {
  fn default() -> Self {
    Inner { closed: false, teardown: SmallVec::new() }
  }
}

impl<T: ?Sized> SubscriptionLike for Box<T>
where
  T: SubscriptionLike,
{
  #[inline]
  fn unsubscribe(&mut self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
pub struct SubscriptionWrapper<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription: `unsubscribe()` is
  /// called automatically as soon as the returned value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> {
    SubscriptionGuard(self.0)
  }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: SubscriptionLike> SubscriptionLike for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe() }
  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII guard of a subscription: when it is dropped (falls out of scope),
/// the subscription is unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope.
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> {
    SubscriptionGuard(subscription)
  }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::rc::{MutRc, RcDeref, RcDerefMut};

  #[test]
  fn add_and_prune() {
    let composite = Subscription::default();
    composite.add(SingleSubscription::default());
    composite.add(SingleSubscription::default());
    assert_eq!(composite.0.borrow().teardown.len(), 2);

    let mut closed = SingleSubscription::default();
    closed.unsubscribe();
    // adding prunes children that are already closed
    composite.add(closed);
    assert_eq!(composite.0.borrow().teardown.len(), 1);
  }

  #[test]
  fn unsubscribe_exactly_once() {
    let count = MutRc::own(0);
    let composite = Subscription::default();
    let c_count = count.clone();
    composite.add(FnSubscription::new(move || {
      *c_count.rc_deref_mut() += 1
    }));

    let mut first = composite.clone();
    first.unsubscribe();
    let mut second = composite;
    second.unsubscribe();
    assert_eq!(*count.rc_deref(), 1);
    assert!(second.is_closed());
  }

  #[test]
  fn add_to_closed_runs_teardown() {
    let ran = MutRc::own(false);
    let mut composite = Subscription::default();
    composite.unsubscribe();

    let c_ran = ran.clone();
    composite.add(FnSubscription::new(move || *c_ran.rc_deref_mut() = true));
    assert!(*ran.rc_deref());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let composite = Subscription::default();
    {
      let _guard = SubscriptionGuard::new(composite.clone());
    }
    assert!(composite.is_closed());
  }

  #[test]
  fn shared_composite() {
    let composite = SharedSubscription::default();
    composite.add(SingleSubscription::default());
    let mut clone = composite.clone();
    clone.unsubscribe();
    assert!(composite.is_closed());
  }
}
