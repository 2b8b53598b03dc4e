//! The core observable contract and the user-facing subscribe entry points.

use crate::observer::{ObserverAll, ObserverComp, ObserverErr, ObserverNext};
use crate::ops::group_by::{
  never_duration, GroupByOp, GroupByUntilOp, GroupObservable,
};
use crate::subscription::{SubscriptionLike, SubscriptionWrapper};
use std::convert::identity;
use std::marker::PhantomData;

mod create;
mod from_iter;
mod trivial;
pub use create::*;
pub use from_iter::*;
pub use trivial::*;

/// A description of how to produce a sequence of values for one subscriber.
///
/// Subscribing activates the description for the given observer and returns
/// the handle that cancels that one activation; every subscription is
/// independent.
pub trait Observable<Item, Err, O> {
  type Unsub: SubscriptionLike;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// User-facing entry points, implemented for every observable type.
///
/// The subscribe methods build the matching closure observer and activate the
/// stream with it. `subscribe` and `subscribe_complete` are only available
/// when the stream cannot fail; use `subscribe_err` or `subscribe_all` to
/// observe errors.
pub trait ObservableExt<Item, Err>: Sized {
  /// Activates the stream, delivering each value to `next`.
  fn subscribe<N>(
    self,
    next: N,
  ) -> SubscriptionWrapper<
    <Self as Observable<Item, Err, ObserverNext<N>>>::Unsub,
  >
  where
    N: FnMut(Item),
    Self: Observable<Item, Err, ObserverNext<N>>,
  {
    SubscriptionWrapper(self.actual_subscribe(ObserverNext::new(next)))
  }

  /// Activates the stream, delivering values to `next` and a failure to
  /// `error`.
  fn subscribe_err<N, E>(
    self,
    next: N,
    error: E,
  ) -> SubscriptionWrapper<
    <Self as Observable<Item, Err, ObserverErr<N, E>>>::Unsub,
  >
  where
    N: FnMut(Item),
    E: FnMut(Err),
    Self: Observable<Item, Err, ObserverErr<N, E>>,
  {
    SubscriptionWrapper(self.actual_subscribe(ObserverErr::new(next, error)))
  }

  /// Activates the stream, delivering values to `next` and the completion to
  /// `complete`.
  fn subscribe_complete<N, C>(
    self,
    next: N,
    complete: C,
  ) -> SubscriptionWrapper<
    <Self as Observable<Item, Err, ObserverComp<N, C>>>::Unsub,
  >
  where
    N: FnMut(Item),
    C: FnMut(),
    Self: Observable<Item, Err, ObserverComp<N, C>>,
  {
    SubscriptionWrapper(
      self.actual_subscribe(ObserverComp::new(next, complete)),
    )
  }

  /// Activates the stream with handlers for all three channels.
  fn subscribe_all<N, E, C>(
    self,
    next: N,
    error: E,
    complete: C,
  ) -> SubscriptionWrapper<
    <Self as Observable<Item, Err, ObserverAll<N, E, C>>>::Unsub,
  >
  where
    N: FnMut(Item),
    E: FnMut(Err),
    C: FnMut(),
    Self: Observable<Item, Err, ObserverAll<N, E, C>>,
  {
    SubscriptionWrapper(
      self.actual_subscribe(ObserverAll::new(next, error, complete)),
    )
  }

  /// Partitions the stream into per-key sub-streams.
  ///
  /// The first value whose key has no open group opens one and emits it on
  /// the outer stream; later values with the same key are routed into the
  /// existing group. Groups stay open until the source terminates: the
  /// terminal notification reaches every open group as well as the outer
  /// stream.
  ///
  /// # Examples
  ///
  /// ```
  /// use rivulet::prelude::*;
  ///
  /// observable::from_iter(0..6).group_by(|v: &i32| v % 2).subscribe(
  ///   |group| {
  ///     let key = group.key;
  ///     group.subscribe(move |v| println!("group {}: {}", key, v));
  ///   },
  /// );
  /// ```
  fn group_by<Key, KeyOf>(
    self,
    key_of: KeyOf,
  ) -> GroupByOp<Self, KeyOf, Key, Item, Err>
  where
    KeyOf: FnMut(&Item) -> Key,
  {
    GroupByUntilOp {
      source: self,
      key_of,
      element_of: identity,
      duration_of: never_duration,
      _hint: PhantomData,
    }
  }

  /// The generalized form of [`group_by`](ObservableExt::group_by): maps
  /// each value to the element pushed into its group, and obtains from
  /// `duration_of` a closing notifier per opened group. The notifier's
  /// first value or completion closes that group; a later value with the
  /// closed group's key opens a fresh group.
  fn group_by_until<Key, Element, Dur, KeyOf, ElementOf, DurOf>(
    self,
    key_of: KeyOf,
    element_of: ElementOf,
    duration_of: DurOf,
  ) -> GroupByUntilOp<Self, KeyOf, ElementOf, DurOf, Item>
  where
    KeyOf: FnMut(&Item) -> Key,
    ElementOf: FnMut(Item) -> Element,
    DurOf: FnMut(&GroupObservable<Key, Element, Err>) -> Dur,
  {
    GroupByUntilOp {
      source: self,
      key_of,
      element_of,
      duration_of,
      _hint: PhantomData,
    }
  }
}
