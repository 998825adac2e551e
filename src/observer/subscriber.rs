use super::Observer;
use crate::{
  disposable::{CompositeDisposable, Disposable},
  error::RxError,
};

/// The observer at the end of a subscribed chain.
///
/// It owns the subscription node: every upstream disposable forwarded through
/// the chain lands here, and the node is disposed right after the terminal
/// event, or by whoever holds the handle returned from `subscribe`. Once the
/// node is disposed, no event reaches the wrapped observer.
pub struct Subscriber<O> {
  observer: O,
  subscription: CompositeDisposable,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self { Self { observer, subscription: CompositeDisposable::new() } }

  /// The handle disposing this subscription and everything upstream of it.
  pub fn subscription(&self) -> Disposable { self.subscription.clone().into() }
}

impl<Item, O> Observer<Item> for Subscriber<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_disposed() {
      self.observer.next(value);
    }
  }

  fn error(self, err: RxError) {
    if !self.subscription.is_disposed() {
      self.observer.error(err);
      self.subscription.dispose();
    }
  }

  fn complete(self) {
    if !self.subscription.is_disposed() {
      self.observer.complete();
      self.subscription.dispose();
    }
  }

  #[inline]
  fn set_upstream(&mut self, upstream: Disposable) { self.subscription.add(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.subscription.is_disposed() || self.observer.is_disposed() }
}
