use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Runs a side effect on every value and passes it on unchanged.
#[derive(Clone)]
pub struct TapOp<F>(pub(crate) F);

pub struct TapObserver<O, F> {
  downstream: O,
  func: F,
}

impl<Item, F> Operator<Item> for TapOp<F>
where
  F: FnMut(&Item) + Send + 'static,
{
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    TapObserver { downstream, func: self.0 }
  }
}

impl<Item, O, F> Observer<Item> for TapObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) + Send,
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.downstream.next(value);
  }

  fn error(self, err: RxError) { self.downstream.error(err) }

  fn complete(self) { self.downstream.complete() }

  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.set_upstream(upstream) }

  fn is_disposed(&self) -> bool { self.downstream.is_disposed() }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  #[test]
  fn sees_every_value_first() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let got = Arc::new(Mutex::new(vec![]));
    let c_got = got.clone();
    observable::from_iter([1, 2])
      .tap(move |v| c_seen.lock().unwrap().push(*v))
      .subscribe(move |v| c_got.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    assert_eq!(*got.lock().unwrap(), vec![1, 2]);
  }
}
