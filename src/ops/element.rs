//! Operators picking a single element: `first`, `last` and `element_at`.
//!
//! A source completing before the wanted element shows up is a contract
//! violation reported through `error`: [`RxError::NotEnoughEmissions`] for
//! `first`/`last`, [`RxError::OutOfRange`] for `element_at`.

use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

#[derive(Clone)]
pub struct FirstOp;

#[derive(Clone)]
pub struct LastOp;

#[derive(Clone)]
pub struct ElementAtOp(pub(crate) usize);

pub struct ElementAtObserver<O> {
  downstream: Option<O>,
  index: usize,
  missing: RxError,
}

impl<Item> Operator<Item> for FirstOp {
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    ElementAtObserver { downstream: Some(downstream), index: 0, missing: RxError::NotEnoughEmissions }
  }
}

impl<Item> Operator<Item> for ElementAtOp {
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    ElementAtObserver { downstream: Some(downstream), index: self.0, missing: RxError::OutOfRange }
  }
}

impl<Item, O> Observer<Item> for ElementAtObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if self.downstream.is_none() {
      return;
    }
    if self.index > 0 {
      self.index -= 1;
      return;
    }
    if let Some(mut downstream) = self.downstream.take() {
      downstream.next(value);
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
      downstream.error(self.missing);
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

pub struct LastObserver<O, Item> {
  downstream: O,
  last: Option<Item>,
}

impl<Item: Send + 'static> Operator<Item> for LastOp {
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    LastObserver { downstream, last: None }
  }
}

impl<Item, O> Observer<Item> for LastObserver<O, Item>
where
  O: Observer<Item>,
  Item: Send,
{
  fn next(&mut self, value: Item) { self.last = Some(value); }

  fn error(self, err: RxError) { self.downstream.error(err) }

  fn complete(self) {
    let Self { mut downstream, last } = self;
    match last {
      Some(value) => {
        downstream.next(value);
        downstream.complete();
      }
      None => downstream.error(RxError::NotEnoughEmissions),
    }
  }

  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.set_upstream(upstream) }

  fn is_disposed(&self) -> bool { self.downstream.is_disposed() }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn first_takes_the_head() {
    let recorder = Recorder::new();
    observable::from_iter([4, 5, 6]).first().subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![4]);
    assert_eq!(recorder.completed(), 1);
  }

  #[test]
  fn first_of_empty_is_an_error() {
    let recorder = Recorder::<i32>::new();
    observable::empty().first().subscribe_observer(recorder.clone());
    assert_eq!(recorder.errors(), vec![RxError::NotEnoughEmissions]);
    assert_eq!(recorder.completed(), 0);
  }

  #[test]
  fn last_waits_for_completion() {
    let recorder = Recorder::new();
    observable::from_iter([4, 5, 6]).last().subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![6]);

    let empty = Recorder::<i32>::new();
    observable::empty().last().subscribe_observer(empty.clone());
    assert_eq!(empty.errors(), vec![RxError::NotEnoughEmissions]);
  }

  #[test]
  fn element_at_index() {
    let recorder = Recorder::new();
    observable::from_iter(10..20).element_at(3).subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![13]);

    let short = Recorder::<i32>::new();
    observable::from_iter(0..2).element_at(5).subscribe_observer(short.clone());
    assert_eq!(short.errors(), vec![RxError::OutOfRange]);
  }
}
