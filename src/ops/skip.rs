use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Drops the first `count` values.
#[derive(Clone)]
pub struct SkipOp(pub(crate) usize);

pub struct SkipObserver<O> {
  downstream: O,
  remaining: usize,
}

impl<Item> Operator<Item> for SkipOp {
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    SkipObserver { downstream, remaining: self.0 }
  }
}

impl<Item, O> Observer<Item> for SkipObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      self.downstream.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  fn error(self, err: RxError) { self.downstream.error(err) }

  fn complete(self) { self.downstream.complete() }

  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.set_upstream(upstream) }

  fn is_disposed(&self) -> bool { self.downstream.is_disposed() }
}
