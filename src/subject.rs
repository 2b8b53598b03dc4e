//! A multicasting sink: `Observer` on the push side, `Observable` on the
//! subscribe side.
//!
//! Values pushed before the first subscriber arrives are buffered and flushed
//! to that subscriber; later subscribers receive live values only. The
//! terminal notification is replayed to any late subscriber.

use crate::observable::{Observable, ObservableExt};
use crate::observer::Observer;
use crate::rc::{MutRc, RcDeref, RcDerefMut};
use crate::subscription::{Subscription, SubscriptionLike};
use std::collections::VecDeque;

pub struct Subject<Item, Err> {
  inner: MutRc<SubjectInner<Item, Err>>,
}

struct SubjectInner<Item, Err> {
  observers: Vec<SubjectObserver<Item, Err>>,
  buffer: VecDeque<Item>,
  terminal: Option<Terminal<Err>>,
  seen_observer: bool,
}

struct SubjectObserver<Item, Err> {
  observer: Box<dyn Observer<Item, Err>>,
  handle: Subscription,
}

#[derive(Clone)]
enum Terminal<Err> {
  Completed,
  Errored(Err),
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Whether a terminal notification has been pushed.
  pub fn is_terminated(&self) -> bool {
    self.inner.rc_deref().terminal.is_some()
  }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self {
    Subject {
      inner: MutRc::own(SubjectInner {
        observers: Vec::new(),
        buffer: VecDeque::new(),
        terminal: None,
        seen_observer: false,
      }),
    }
  }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { inner: self.inner.clone() } }
}

impl<Item, Err> Subject<Item, Err> {
  /// Runs `deliver` over every live subscriber with the observer list moved
  /// out of the shared cell, so subscriber callbacks may re-enter this
  /// subject. Subscribers added during delivery are kept; closed ones are
  /// pruned afterwards.
  fn each_observer<F>(&mut self, mut deliver: F)
  where
    F: FnMut(&mut SubjectObserver<Item, Err>),
  {
    let mut active = std::mem::take(&mut self.inner.rc_deref_mut().observers);
    for subscriber in &mut active {
      if !subscriber.handle.is_closed() {
        deliver(subscriber);
      }
    }
    let mut inner = self.inner.rc_deref_mut();
    active.extend(inner.observers.drain(..));
    active.retain(|s| !s.handle.is_closed());
    inner.observers = active;
  }
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    {
      let mut inner = self.inner.rc_deref_mut();
      if inner.terminal.is_some() {
        return;
      }
      if !inner.seen_observer {
        inner.buffer.push_back(value);
        return;
      }
    }
    self.each_observer(|s| s.observer.next(value.clone()));
  }

  fn error(&mut self, err: Err) {
    {
      let mut inner = self.inner.rc_deref_mut();
      if inner.terminal.is_some() {
        return;
      }
      inner.terminal = Some(Terminal::Errored(err.clone()));
    }
    self.each_observer(|s| {
      s.observer.error(err.clone());
      s.handle.unsubscribe();
    });
  }

  fn complete(&mut self) {
    {
      let mut inner = self.inner.rc_deref_mut();
      if inner.terminal.is_some() {
        return;
      }
      inner.terminal = Some(Terminal::Completed);
    }
    self.each_observer(|s| {
      s.observer.complete();
      s.handle.unsubscribe();
    });
  }

  #[inline]
  fn is_closed(&self) -> bool { self.is_terminated() }
}

impl<Item, Err, O> Observable<Item, Err, O> for Subject<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Err: Clone,
{
  type Unsub = Subscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    let mut handle = Subscription::default();
    let pending: Vec<Item> = {
      let mut inner = self.inner.rc_deref_mut();
      let first = !inner.seen_observer;
      inner.seen_observer = true;
      if first { inner.buffer.drain(..).collect() } else { Vec::new() }
    };
    for value in pending {
      observer.next(value);
    }
    let terminal = self.inner.rc_deref().terminal.clone();
    match terminal {
      Some(Terminal::Completed) => {
        observer.complete();
        handle.unsubscribe();
      }
      Some(Terminal::Errored(err)) => {
        observer.error(err);
        handle.unsubscribe();
      }
      None => self.inner.rc_deref_mut().observers.push(SubjectObserver {
        observer: Box::new(observer),
        handle: handle.clone(),
      }),
    }
    handle
  }
}

impl<Item, Err> ObservableExt<Item, Err> for Subject<Item, Err> {}
