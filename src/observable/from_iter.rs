use std::iter::{self, Once};

use super::Observable;
use crate::observer::Observer;

/// Emits every item of `iter`, then completes.
///
/// Iteration stops early once the observer is disposed, so an infinite
/// iterator is fine behind `take`.
pub fn from_iter<I>(iter: I) -> FromIter<I::IntoIter>
where
  I: IntoIterator,
{
  FromIter(iter.into_iter())
}

/// Emits `value`, then completes.
pub fn of<Item>(value: Item) -> FromIter<Once<Item>> { FromIter(iter::once(value)) }

#[derive(Clone)]
pub struct FromIter<I>(I);

impl<I> Observable for FromIter<I>
where
  I: Iterator,
{
  type Item = I::Item;

  fn subscribe_with<O>(self, mut observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    for value in self.0 {
      if observer.is_disposed() {
        return;
      }
      observer.next(value);
    }
    if !observer.is_disposed() {
      observer.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn emits_all_then_completes() {
    let recorder = Recorder::new();
    observable::from_iter(vec!["a", "b"]).subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec!["a", "b"]);
    assert_eq!(recorder.completed(), 1);
  }

  #[test]
  fn infinite_iterator_behind_take() {
    let got = observable::from_iter(0..).take(4).as_blocking().to_vec().unwrap();
    assert_eq!(got, vec![0, 1, 2, 3]);
  }

  #[test]
  fn every_subscription_starts_over() {
    let source = observable::from_iter(1..=3);
    let recorder = Recorder::new();
    source.clone().subscribe_observer(recorder.clone());
    source.subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 3, 1, 2, 3]);
    assert_eq!(recorder.completed(), 2);
  }

  #[test]
  fn of_emits_one_value() {
    assert_eq!(observable::of(42).as_blocking().last(), Ok(42));
  }
}
