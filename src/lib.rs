//! # rivulet: a minimal reactive-stream core
//!
//! Turns pull-based sequences into push-based, cancellable notification
//! streams, and partitions one stream into independently-lifetimed
//! sub-streams grouped by a derived key.
//!
//! ## Quick Start
//!
//! ```rust
//! use rivulet::prelude::*;
//!
//! observable::from_iter(["ant", "bee", "asp", "bat"])
//!   .group_by(|word: &&str| word.as_bytes()[0])
//!   .subscribe(|group| {
//!     let initial = group.key as char;
//!     group.subscribe(move |word| println!("{}: {}", initial, word));
//!   });
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | The core trait: a subscribable description of a stream |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`SubscriptionLike`] | Handle to cancel an active subscription |
//! | [`CurrentThreadScheduler`] | Immediate-reentrant trampoline driving sources |
//!
//! Sources are driven one pull per scheduled step, so cancellation is
//! honored between any two values and endless sources never grow the call
//! stack. Groups produced by `group_by` stay open until their source
//! terminates, and the terminal event reaches the outer stream and every
//! open group.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`SubscriptionLike`]: subscription::SubscriptionLike
//! [`CurrentThreadScheduler`]: scheduler::CurrentThreadScheduler

pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
