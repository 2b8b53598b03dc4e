//! Cooperative scheduling of repeatable units of work.
//!
//! A scheduled task is a step function run to completion one invocation at a
//! time: returning [`TaskState::Continue`] asks the scheduler to invoke it
//! again (an explicit trampoline, so recursive sources never grow the call
//! stack), returning [`TaskState::Done`] retires it. `schedule` hands back a
//! [`TaskHandle`] that cancels the task if it has not run yet, or stops its
//! re-arming if it has.

use crate::subscription::SubscriptionLike;
use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

#[cfg(feature = "pool-scheduler")]
use futures::executor::ThreadPool;
#[cfg(feature = "pool-scheduler")]
use once_cell::sync::Lazy;

/// What a scheduled step wants to happen after it returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
  /// Re-arm: the scheduler invokes the step again at the earliest
  /// opportunity.
  Continue,
  /// Retire the task.
  Done,
}

/// Cancellation handle for a scheduled task. The flag is checked before every
/// step, so a cancelled task delivers nothing further; a step already in
/// flight on another thread is not interrupted.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<AtomicBool>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }
}

impl SubscriptionLike for TaskHandle {
  #[inline]
  fn unsubscribe(&mut self) { self.0.store(true, Ordering::Relaxed); }
  #[inline]
  fn is_closed(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

/// Schedules steps that stay on the scheduling thread.
pub trait LocalScheduler {
  fn schedule<T>(&self, task: T) -> TaskHandle
  where
    T: FnMut() -> TaskState + 'static;
}

/// Schedules steps that may hop to another thread between invocations.
pub trait SharedScheduler {
  fn schedule<T>(&self, task: T) -> TaskHandle
  where
    T: FnMut() -> TaskState + Send + 'static;
}

/// Immediate-reentrant trampoline over a thread-local queue.
///
/// The outermost `schedule` call drains the queue in place, so scheduling
/// from outside any task delivers synchronously before returning. A
/// `schedule` issued from inside a running step only enqueues: the new task
/// runs after the current step returns, and its handle is returned right
/// away, making cancellation before first delivery possible.
#[derive(Clone, Copy, Default)]
pub struct CurrentThreadScheduler;

struct QueuedTask {
  step: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

thread_local! {
  static QUEUE: RefCell<VecDeque<QueuedTask>> = RefCell::new(VecDeque::new());
  static DRAINING: Cell<bool> = const { Cell::new(false) };
}

struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) { DRAINING.with(|d| d.set(false)); }
}

impl LocalScheduler for CurrentThreadScheduler {
  fn schedule<T>(&self, task: T) -> TaskHandle
  where
    T: FnMut() -> TaskState + 'static,
  {
    let handle = TaskHandle::new();
    QUEUE.with(|q| {
      q.borrow_mut()
        .push_back(QueuedTask { step: Box::new(task), handle: handle.clone() })
    });

    let reentered = DRAINING.with(|d| d.replace(true));
    if !reentered {
      let _guard = DrainGuard;
      loop {
        let queued = QUEUE.with(|q| q.borrow_mut().pop_front());
        let Some(mut queued) = queued else { break };
        if queued.handle.is_closed() {
          continue;
        }
        // the step runs outside the queue borrow: it may schedule or cancel
        // reentrantly
        if (queued.step)() == TaskState::Continue && !queued.handle.is_closed()
        {
          QUEUE.with(|q| q.borrow_mut().push_back(queued));
        }
      }
    }
    handle
  }
}

#[cfg(feature = "pool-scheduler")]
static DEFAULT_POOL: Lazy<ThreadPool> =
  Lazy::new(|| ThreadPool::new().expect("failed to build scheduler pool"));

/// Runs each step as its own pool task, re-spawning while the step asks to
/// continue, so a long source never pins a pool thread.
#[cfg(feature = "pool-scheduler")]
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

#[cfg(feature = "pool-scheduler")]
impl ThreadPoolScheduler {
  pub fn new(pool: ThreadPool) -> Self { ThreadPoolScheduler { pool } }
}

#[cfg(feature = "pool-scheduler")]
impl Default for ThreadPoolScheduler {
  fn default() -> Self { ThreadPoolScheduler { pool: DEFAULT_POOL.clone() } }
}

#[cfg(feature = "pool-scheduler")]
impl SharedScheduler for ThreadPoolScheduler {
  fn schedule<T>(&self, task: T) -> TaskHandle
  where
    T: FnMut() -> TaskState + Send + 'static,
  {
    let handle = TaskHandle::new();
    spawn_step(self.pool.clone(), task, handle.clone());
    handle
  }
}

#[cfg(feature = "pool-scheduler")]
fn spawn_step<T>(pool: ThreadPool, mut task: T, handle: TaskHandle)
where
  T: FnMut() -> TaskState + Send + 'static,
{
  let next_pool = pool.clone();
  pool.spawn_ok(async move {
    if handle.is_closed() {
      return;
    }
    if task() == TaskState::Continue && !handle.is_closed() {
      spawn_step(next_pool, task, handle);
    }
  });
}
