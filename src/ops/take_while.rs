use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Emits values while the predicate holds and completes on the first value
/// failing it.
#[derive(Clone)]
pub struct TakeWhileOp<F>(pub(crate) F);

pub struct TakeWhileObserver<O, F> {
  downstream: Option<O>,
  predicate: F,
}

impl<Item, F> Operator<Item> for TakeWhileOp<F>
where
  F: FnMut(&Item) -> bool + Send + 'static,
{
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    TakeWhileObserver { downstream: Some(downstream), predicate: self.0 }
  }
}

impl<Item, O, F> Observer<Item> for TakeWhileObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) -> bool + Send,
{
  fn next(&mut self, value: Item) {
    if self.downstream.is_none() {
      return;
    }
    if (self.predicate)(&value) {
      if let Some(downstream) = self.downstream.as_mut() {
        downstream.next(value);
      }
    } else if let Some(downstream) = self.downstream.take() {
      downstream.complete();
    }
  }

  fn error(self, err: RxError) {
    if let Some(downstream) = self.downstream {
      downstream.error(err);
    }
  }

  fn complete(self) {
    if let Some(downstream) = self.downstream {
      downstream.complete();
    }
  }

  fn set_upstream(&mut self, upstream: Disposable) {
    match self.downstream.as_mut() {
      Some(downstream) => downstream.set_upstream(upstream),
      None => upstream.dispose(),
    }
  }

  fn is_disposed(&self) -> bool { self.downstream.as_ref().map_or(true, |d| d.is_disposed()) }
}
