use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Folds every value into an accumulator and emits each intermediate result.
#[derive(Clone)]
pub struct ScanOp<B, F> {
  pub(crate) seed: B,
  pub(crate) func: F,
}

pub struct ScanObserver<O, B, F> {
  downstream: O,
  acc: B,
  func: F,
}

impl<Item, B, F> Operator<Item> for ScanOp<B, F>
where
  B: Clone + Send + 'static,
  F: FnMut(&B, Item) -> B + Send + 'static,
{
  type Out = B;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    ScanObserver { downstream, acc: self.seed, func: self.func }
  }
}

impl<Item, O, B, F> Observer<Item> for ScanObserver<O, B, F>
where
  O: Observer<B>,
  B: Clone + Send,
  F: FnMut(&B, Item) -> B + Send,
{
  fn next(&mut self, value: Item) {
    self.acc = (self.func)(&self.acc, value);
    self.downstream.next(self.acc.clone());
  }

  fn error(self, err: RxError) { self.downstream.error(err) }

  fn complete(self) { self.downstream.complete() }

  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.set_upstream(upstream) }

  fn is_disposed(&self) -> bool { self.downstream.is_disposed() }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn running_sum() {
    let recorder = Recorder::new();
    observable::from_iter(1..=4)
      .scan(0, |acc, v| acc + v)
      .subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 3, 6, 10]);
  }

  #[test]
  fn each_subscription_starts_from_the_seed() {
    let source = observable::from_iter(1..=2).scan(10, |acc, v| acc + v);
    let first = Recorder::new();
    let second = Recorder::new();
    source.clone().subscribe_observer(first.clone());
    source.subscribe_observer(second.clone());
    assert_eq!(first.values(), vec![11, 13]);
    assert_eq!(second.values(), vec![11, 13]);
  }
}
