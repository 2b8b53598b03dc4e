use crate::observer::Observer;

/// Guards the notification protocol in front of a downstream observer: after
/// one terminal notification (error or complete), every further call is
/// dropped. [`crate::observable::create`] hands one of these to the
/// subscribe function, so a misbehaving producer cannot violate the
/// contract downstream observers rely on.
pub struct Subscriber<O> {
  observer: O,
  stopped: bool,
}

impl<O> Subscriber<O> {
  #[inline]
  pub fn new(observer: O) -> Self { Subscriber { observer, stopped: false } }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.stopped {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if !self.stopped {
      self.stopped = true;
      self.observer.error(err);
    }
  }

  fn complete(&mut self) {
    if !self.stopped {
      self.stopped = true;
      self.observer.complete();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.stopped || self.observer.is_closed() }
}
