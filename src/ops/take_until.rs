use std::marker::PhantomData;

use crate::{
  disposable::Disposable,
  error::RxError,
  observable::Observable,
  observer::{Observer, SharedObserver},
};

/// Mirrors `source` until `notifier` emits its first value, then completes.
///
/// A notifier that completes without emitting changes nothing; a notifier
/// error terminates the stream.
#[derive(Clone)]
pub struct TakeUntil<S, N> {
  pub(crate) source: S,
  pub(crate) notifier: N,
}

pub struct NotifierObserver<Item, O> {
  downstream: SharedObserver<O>,
  _item: PhantomData<fn() -> Item>,
}

impl<S, N> Observable for TakeUntil<S, N>
where
  S: Observable,
  N: Observable,
  S::Item: 'static,
  N::Item: 'static,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    let downstream = SharedObserver::new(observer);
    let signal: NotifierObserver<S::Item, O> =
      NotifierObserver { downstream: downstream.clone(), _item: PhantomData };
    self.notifier.subscribe_with(signal);
    if !downstream.is_terminated() {
      self.source.subscribe_with(downstream);
    }
  }
}

impl<Item, Signal, O> Observer<Signal> for NotifierObserver<Item, O>
where
  O: Observer<Item>,
{
  fn next(&mut self, _: Signal) { self.downstream.on_complete::<Item>() }

  fn error(self, err: RxError) { self.downstream.on_error::<Item>(err) }

  fn complete(self) {}

  fn set_upstream(&mut self, upstream: Disposable) {
    self.downstream.add_upstream::<Item>(upstream)
  }

  fn is_disposed(&self) -> bool { self.downstream.is_closed::<Item>() }
}

#[cfg(test)]
mod tests {
  use std::thread;

  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn stops_at_the_first_signal() {
    let recorder = Recorder::new();
    let source = PublishSubject::new();
    let stop = PublishSubject::<()>::new();
    source.observable().take_until(stop.observable()).subscribe_observer(recorder.clone());

    source.next(1);
    source.next(2);
    stop.next(());
    source.next(3);

    assert_eq!(recorder.values(), vec![1, 2]);
    assert_eq!(recorder.completed(), 1);
    assert!(!source.has_observers());
    assert!(!stop.has_observers());
  }

  #[test]
  fn silent_notifier_completion_is_ignored() {
    let recorder = Recorder::new();
    observable::from_iter([1, 2, 3])
      .take_until(observable::empty::<()>())
      .subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![1, 2, 3]);
    assert_eq!(recorder.completed(), 1);
  }

  #[test]
  fn immediate_signal_never_subscribes_the_source() {
    let recorder = Recorder::<i32>::new();
    let source = PublishSubject::new();
    source.observable().take_until(observable::of(())).subscribe_observer(recorder.clone());
    assert_eq!(recorder.completed(), 1);
    assert!(!source.has_observers());
  }

  #[test]
  fn signal_from_another_thread() {
    let recorder = Recorder::new();
    let source = PublishSubject::new();
    let stop = PublishSubject::<()>::new();
    source.observable().take_until(stop.observable()).subscribe_observer(recorder.clone());

    let c_source = source.clone();
    let writer = thread::spawn(move || (0..1000).for_each(|v| c_source.next(v)));
    stop.next(());
    writer.join().unwrap();

    // Whatever got through is a gapless prefix, and nothing follows completion.
    let got = recorder.values();
    assert_eq!(got, (0..got.len() as i32).collect::<Vec<_>>());
    assert_eq!(recorder.completed(), 1);
  }
}
