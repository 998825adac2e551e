use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Emits the first `count` values, then completes.
///
/// Completing disposes the upstream, so a synchronous source stops producing
/// as soon as the last wanted value is through. `take(0)` completes without
/// waiting for the source.
#[derive(Clone)]
pub struct TakeOp(pub(crate) usize);

pub struct TakeObserver<O> {
  downstream: Option<O>,
  remaining: usize,
}

impl<Item> Operator<Item> for TakeOp {
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    if self.0 == 0 {
      downstream.complete();
      return TakeObserver { downstream: None, remaining: 0 };
    }
    TakeObserver { downstream: Some(downstream), remaining: self.0 }
  }
}

impl<Item, O> Observer<Item> for TakeObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(downstream) = self.downstream.as_mut() {
      self.remaining -= 1;
      downstream.next(value);
      if self.remaining == 0 {
        if let Some(downstream) = self.downstream.take() {
          downstream.complete();
        }
      }
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
