//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// The module itself, for `observable::from_iter(..)`-style calls
pub use crate::observable;
// Core traits
pub use crate::observable::{Observable, ObservableExt};
// Creation/Factories
pub use crate::observable::{
  create, empty, from_iter, from_iter_on, from_iter_result,
  from_iter_result_on, from_iter_shared, never, repeat, throw, Empty, Never,
  ObservableFn, ObservableIter, ObservableIterResult, SharedObservableIter,
  Throw,
};
// Observer trait and closure observers
pub use crate::observer::{
  Observer, ObserverAll, ObserverComp, ObserverErr, ObserverNext,
};
// Operators
pub use crate::ops::group_by::{GroupByOp, GroupByUntilOp, GroupObservable};
// Shared-ownership helpers
pub use crate::rc::{MutArc, MutRc, RcDeref, RcDerefMut};
// Schedulers
#[cfg(feature = "pool-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
pub use crate::scheduler::{
  CurrentThreadScheduler, LocalScheduler, SharedScheduler, TaskHandle,
  TaskState,
};
// Subject
pub use crate::subject::Subject;
// Subscriber
pub use crate::subscriber::Subscriber;
// Subscription
pub use crate::subscription::{
  FnSubscription, SharedSubscription, SingleSubscription, Subscription,
  SubscriptionGuard, SubscriptionLike, SubscriptionWrapper,
};
