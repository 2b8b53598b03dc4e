use crate::observable::{never, Never, Observable, ObservableExt};
use crate::observer::Observer;
use crate::rc::{MutRc, RcDeref, RcDerefMut};
use crate::subject::Subject;
use crate::subscription::{Subscription, SubscriptionLike};
use std::{collections::HashMap, hash::Hash, marker::PhantomData};

/// A per-key sub-stream emitted on the outer stream of `group_by`: the key it
/// was opened for, plus the stream of elements routed to it.
pub struct GroupObservable<Key, Element, Err> {
  pub key: Key,
  subject: Subject<Element, Err>,
}

impl<Key: Clone, Element, Err> Clone for GroupObservable<Key, Element, Err> {
  fn clone(&self) -> Self {
    GroupObservable { key: self.key.clone(), subject: self.subject.clone() }
  }
}

impl<Key, Element, Err, O> Observable<Element, Err, O>
  for GroupObservable<Key, Element, Err>
where
  O: Observer<Element, Err> + 'static,
  Err: Clone,
{
  type Unsub = Subscription;

  #[inline]
  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.subject.actual_subscribe(observer)
  }
}

impl<Key, Element, Err> ObservableExt<Element, Err>
  for GroupObservable<Key, Element, Err>
{
}

/// Observable returned by `group_by_until` (and, through [`GroupByOp`], by
/// `group_by`).
pub struct GroupByUntilOp<Source, KeyOf, ElementOf, DurOf, Item> {
  pub(crate) source: Source,
  pub(crate) key_of: KeyOf,
  pub(crate) element_of: ElementOf,
  pub(crate) duration_of: DurOf,
  pub(crate) _hint: PhantomData<Item>,
}

/// `group_by` is `group_by_until` with identity elements and groups that
/// never close on their own.
pub type GroupByOp<Source, KeyOf, Key, Item, Err> = GroupByUntilOp<
  Source,
  KeyOf,
  fn(Item) -> Item,
  fn(&GroupObservable<Key, Item, Err>) -> Never<(), Err>,
  Item,
>;

pub(crate) fn never_duration<Key, Element, Err>(
  _: &GroupObservable<Key, Element, Err>,
) -> Never<(), Err> {
  never()
}

impl<Source, KeyOf, ElementOf, DurOf, Dur, Key, Item, Element, Err, O>
  Observable<GroupObservable<Key, Element, Err>, Err, O>
  for GroupByUntilOp<Source, KeyOf, ElementOf, DurOf, Item>
where
  O: Observer<GroupObservable<Key, Element, Err>, Err>,
  Source: Observable<
    Item,
    Err,
    GroupByUntilObserver<O, KeyOf, ElementOf, DurOf, Key, Element, Err>,
  >,
  Source::Unsub: 'static,
  KeyOf: FnMut(&Item) -> Key,
  ElementOf: FnMut(Item) -> Element,
  DurOf: FnMut(&GroupObservable<Key, Element, Err>) -> Dur,
  Dur: Observable<(), Err, GroupCloser<Key, Element, Err>>,
  Dur::Unsub: 'static,
  Key: Hash + Eq + Clone,
  Element: Clone,
  Err: Clone,
{
  type Unsub = Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let subscription = Subscription::default();
    let source_sub = self.source.actual_subscribe(GroupByUntilObserver {
      observer,
      key_of: self.key_of,
      element_of: self.element_of,
      duration_of: self.duration_of,
      groups: MutRc::own(HashMap::new()),
      subscription: subscription.clone(),
    });
    subscription.add(source_sub);
    subscription
  }
}

impl<Source, KeyOf, ElementOf, DurOf, Item, Key, Element, Err>
  ObservableExt<GroupObservable<Key, Element, Err>, Err>
  for GroupByUntilOp<Source, KeyOf, ElementOf, DurOf, Item>
where
  Source: ObservableExt<Item, Err>,
{
}

type GroupMap<Key, Element, Err> = HashMap<Key, Subject<Element, Err>>;

pub struct GroupByUntilObserver<O, KeyOf, ElementOf, DurOf, Key, Element, Err>
{
  observer: O,
  key_of: KeyOf,
  element_of: ElementOf,
  duration_of: DurOf,
  groups: MutRc<GroupMap<Key, Element, Err>>,
  subscription: Subscription,
}

impl<O, KeyOf, ElementOf, DurOf, Dur, Key, Item, Element, Err>
  Observer<Item, Err>
  for GroupByUntilObserver<O, KeyOf, ElementOf, DurOf, Key, Element, Err>
where
  O: Observer<GroupObservable<Key, Element, Err>, Err>,
  KeyOf: FnMut(&Item) -> Key,
  ElementOf: FnMut(Item) -> Element,
  DurOf: FnMut(&GroupObservable<Key, Element, Err>) -> Dur,
  Dur: Observable<(), Err, GroupCloser<Key, Element, Err>>,
  Dur::Unsub: 'static,
  Key: Hash + Eq + Clone,
  Element: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    let key = (self.key_of)(&value);
    let known = self.groups.rc_deref().get(&key).cloned();
    let mut subject = match known {
      Some(subject) => subject,
      None => {
        let subject = Subject::default();
        self.groups.rc_deref_mut().insert(key.clone(), subject.clone());
        let group =
          GroupObservable { key: key.clone(), subject: subject.clone() };

        // single-assignment slot for the notifier subscription, so the
        // closer can retire it from inside a notification
        let closing = Subscription::default();
        let closer = GroupCloser {
          groups: self.groups.clone(),
          key,
          subject: subject.clone(),
          notifier: closing.clone(),
          closed: false,
        };
        closing.add((self.duration_of)(&group).actual_subscribe(closer));
        self.subscription.add(closing);

        self.observer.next(group);
        subject
      }
    };
    // push through the local handle: a notifier that fired while wiring has
    // already removed the map entry, and a closed subject drops the element
    subject.next((self.element_of)(value));
  }

  fn error(&mut self, err: Err) {
    let subjects: Vec<_> =
      self.groups.rc_deref_mut().drain().map(|(_, s)| s).collect();
    for mut subject in subjects {
      subject.error(err.clone());
    }
    self.observer.error(err);
    self.subscription.unsubscribe();
  }

  fn complete(&mut self) {
    let subjects: Vec<_> =
      self.groups.rc_deref_mut().drain().map(|(_, s)| s).collect();
    for mut subject in subjects {
      subject.complete();
    }
    self.observer.complete();
    self.subscription.unsubscribe();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Watches one group's closing notifier: the notifier's first value or its
/// completion closes the group, removing it from the open set and completing
/// its subject. A notifier error closes the group with that error.
pub struct GroupCloser<Key, Element, Err> {
  groups: MutRc<GroupMap<Key, Element, Err>>,
  key: Key,
  subject: Subject<Element, Err>,
  notifier: Subscription,
  closed: bool,
}

impl<Key, Element, Err> GroupCloser<Key, Element, Err>
where
  Key: Hash + Eq,
  Element: Clone,
  Err: Clone,
{
  fn close(&mut self) {
    if !self.closed {
      self.closed = true;
      self.groups.rc_deref_mut().remove(&self.key);
      self.subject.complete();
      self.notifier.unsubscribe();
    }
  }
}

impl<Key, Element, Err> Observer<(), Err> for GroupCloser<Key, Element, Err>
where
  Key: Hash + Eq,
  Element: Clone,
  Err: Clone,
{
  fn next(&mut self, _: ()) { self.close(); }

  fn complete(&mut self) { self.close(); }

  fn error(&mut self, err: Err) {
    if !self.closed {
      self.closed = true;
      self.groups.rc_deref_mut().remove(&self.key);
      self.subject.error(err);
      self.notifier.unsubscribe();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed }
}
