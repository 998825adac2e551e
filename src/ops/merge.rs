use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{
  disposable::Disposable,
  error::RxError,
  observable::Observable,
  observer::{Observer, SharedObserver},
};

/// Interleaves the values of two sources.
///
/// Completes once both sources completed; the first error from either side
/// terminates the whole stream and disposes the other side.
#[derive(Clone)]
pub struct Merge<S1, S2> {
  pub(crate) first: S1,
  pub(crate) second: S2,
}

/// Interleaves the values of any number of sources of one type.
///
/// Use [`BoxedObservable`](crate::observable::BoxedObservable) to merge
/// pipelines of different shapes built at runtime.
#[derive(Clone)]
pub struct MergeAll<S>(pub(crate) Vec<S>);

/// The observer every merged source feeds. The downstream sits behind a lock,
/// so sources emitting from different threads are serialized.
pub struct MergeObserver<O> {
  downstream: SharedObserver<O>,
  active: Arc<AtomicUsize>,
}

impl<O> Clone for MergeObserver<O> {
  fn clone(&self) -> Self {
    Self { downstream: self.downstream.clone(), active: self.active.clone() }
  }
}

impl<O> MergeObserver<O> {
  fn new(downstream: O, sources: usize) -> Self {
    Self { downstream: SharedObserver::new(downstream), active: Arc::new(AtomicUsize::new(sources)) }
  }
}

impl<S1, S2> Observable for Merge<S1, S2>
where
  S1: Observable,
  S2: Observable<Item = S1::Item>,
  S1::Item: 'static,
{
  type Item = S1::Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    let merged = MergeObserver::new(observer, 2);
    self.first.subscribe_with(merged.clone());
    self.second.subscribe_with(merged);
  }
}

impl<S> Observable for MergeAll<S>
where
  S: Observable,
  S::Item: 'static,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    if self.0.is_empty() {
      observer.complete();
      return;
    }
    let merged = MergeObserver::new(observer, self.0.len());
    for source in self.0 {
      if merged.downstream.is_terminated() {
        break;
      }
      source.subscribe_with(merged.clone());
    }
  }
}

impl<Item, O> Observer<Item> for MergeObserver<O>
where
  O: Observer<Item>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.downstream.on_next(value) }

  fn error(self, err: RxError) { self.downstream.on_error::<Item>(err) }

  fn complete(self) {
    if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
      self.downstream.on_complete::<Item>();
    }
  }

  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.add_upstream::<Item>(upstream) }

  fn is_disposed(&self) -> bool { self.downstream.is_closed::<Item>() }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn completes_after_both_sides() {
    let recorder = Recorder::new();
    let a = PublishSubject::new();
    let b = PublishSubject::new();
    a.observable().merge(b.observable()).subscribe_observer(recorder.clone());

    a.next(1);
    b.next(2);
    a.complete();
    assert_eq!(recorder.completed(), 0);
    b.next(3);
    b.complete();
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.completed(), 1);
  }

  #[test]
  fn error_from_one_side_terminates_and_unsubscribes_the_other() {
    let recorder = Recorder::<i32>::new();
    let a = PublishSubject::new();
    let b = PublishSubject::new();
    a.observable().merge(b.observable()).subscribe_observer(recorder.clone());

    a.error(RxError::msg("left failed"));
    assert!(!b.has_observers());
    b.next(1);
    assert_eq!(recorder.errors(), vec![RxError::msg("left failed")]);
    assert!(recorder.values().is_empty());
  }

  #[test]
  fn merges_a_runtime_list_of_pipelines() {
    let recorder = Recorder::new();
    let sources: Vec<BoxedObservable<i32>> = vec![
      observable::from_iter([1, 2]).boxed(),
      observable::of(10).map(|v| v * 2).boxed(),
      observable::empty().boxed(),
    ];
    observable::merge_all(sources).subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 20]);
    assert_eq!(recorder.completed(), 1);
  }

  #[test]
  fn merge_across_threads_serializes_delivery() {
    let pool = ThreadPoolScheduler::new(2).unwrap();
    let sources: Vec<_> = (0..4)
      .map(|i| observable::from_iter(i * 100..i * 100 + 100).subscribe_on(pool.clone()))
      .collect();
    let got = observable::merge_all(sources).as_blocking().to_vec().unwrap();
    assert_eq!(got.len(), 400);
    let mut sorted = got.clone();
    sorted.sort();
    assert_eq!(sorted, (0..400).collect::<Vec<_>>());
  }
}
