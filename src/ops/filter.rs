use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Emit only those items from an Observable that pass a predicate test
///
/// # Example
///
/// ```
/// use rxplus::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let coll = Arc::new(Mutex::new(vec![]));
/// let c_coll = coll.clone();
///
/// observable::from_iter(0..10)
///   .filter(|v| *v % 2 == 0)
///   .subscribe(move |v| c_coll.lock().unwrap().push(v));
///
/// // only even numbers received.
/// assert_eq!(*coll.lock().unwrap(), vec![0, 2, 4, 6, 8]);
/// ```
#[derive(Clone)]
pub struct FilterOp<F>(pub(crate) F);

pub struct FilterObserver<O, F> {
  downstream: O,
  predicate: F,
}

impl<Item, F> Operator<Item> for FilterOp<F>
where
  F: FnMut(&Item) -> bool + Send + 'static,
{
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    FilterObserver { downstream, predicate: self.0 }
  }
}

impl<Item, O, F> Observer<Item> for FilterObserver<O, F>
where
  O: Observer<Item>,
  F: FnMut(&Item) -> bool + Send,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.downstream.next(value)
    }
  }

  #[inline]
  fn error(self, err: RxError) { self.downstream.error(err) }

  #[inline]
  fn complete(self) { self.downstream.complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.set_upstream(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.downstream.is_disposed() }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn keeps_matching_values() {
    let recorder = Recorder::new();
    observable::from_iter([1, 2, 3])
      .filter(|v| v % 2 == 0)
      .subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![2]);
    assert_eq!(recorder.completed(), 1);
    assert!(recorder.errors().is_empty());
  }

  #[test]
  fn pass_error() {
    let recorder = Recorder::<i32>::new();
    let subject = PublishSubject::new();
    subject.observable().filter(|_| true).subscribe_observer(recorder.clone());
    subject.error(RxError::msg("late"));
    assert_eq!(recorder.errors(), vec![RxError::msg("late")]);
  }
}
