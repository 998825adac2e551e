use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  disposable::Disposable,
  error::RxError,
  observable::Observable,
  observer::{Observer, SharedObserver},
};

/// Emits `func(a, b)` with the latest value of each source whenever either
/// emits, once both have emitted at least once.
///
/// Completes when both sources completed, or as soon as one completes without
/// ever emitting. The first error from either side terminates.
#[derive(Clone)]
pub struct CombineLatest<S1, S2, F> {
  pub(crate) first: S1,
  pub(crate) second: S2,
  pub(crate) func: F,
}

struct CombineState<A, B, F> {
  first: Option<A>,
  second: Option<B>,
  first_done: bool,
  second_done: bool,
  func: F,
}

struct Combined<A, B, F, O> {
  state: Mutex<CombineState<A, B, F>>,
  downstream: SharedObserver<O>,
}

pub struct FirstObserver<A, B, F, O>(Arc<Combined<A, B, F, O>>);

pub struct SecondObserver<A, B, F, O>(Arc<Combined<A, B, F, O>>);

impl<S1, S2, F, Out> Observable for CombineLatest<S1, S2, F>
where
  S1: Observable,
  S2: Observable,
  S1::Item: Clone + Send + 'static,
  S2::Item: Clone + Send + 'static,
  F: FnMut(S1::Item, S2::Item) -> Out + Send + 'static,
  Out: 'static,
{
  type Item = Out;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Out> + 'static,
  {
    let combined = Arc::new(Combined {
      state: Mutex::new(CombineState {
        first: None,
        second: None,
        first_done: false,
        second_done: false,
        func: self.func,
      }),
      downstream: SharedObserver::new(observer),
    });
    self.first.subscribe_with(FirstObserver(combined.clone()));
    self.second.subscribe_with(SecondObserver(combined));
  }
}

impl<A, B, F, O, Out> Combined<A, B, F, O>
where
  A: Clone,
  B: Clone,
  F: FnMut(A, B) -> Out,
  O: Observer<Out>,
{
  /// Runs under the state lock so combined values leave in the order they
  /// were formed.
  fn emit(&self, update: impl FnOnce(&mut CombineState<A, B, F>)) {
    let mut state = self.state.lock();
    update(&mut state);
    let state = &mut *state;
    if let (Some(a), Some(b)) = (&state.first, &state.second) {
      let value = (state.func)(a.clone(), b.clone());
      self.downstream.on_next(value);
    }
  }

  fn side_completed(&self, first: bool) {
    let finished = {
      let mut state = self.state.lock();
      let (done, has_value) = if first {
        state.first_done = true;
        (state.second_done, state.first.is_some())
      } else {
        state.second_done = true;
        (state.first_done, state.second.is_some())
      };
      done || !has_value
    };
    if finished {
      self.downstream.on_complete::<Out>();
    }
  }
}

impl<A, B, F, O, Out> Observer<A> for FirstObserver<A, B, F, O>
where
  A: Clone + Send,
  B: Clone + Send,
  F: FnMut(A, B) -> Out + Send,
  O: Observer<Out>,
{
  fn next(&mut self, value: A) { self.0.emit(|s| s.first = Some(value)) }

  fn error(self, err: RxError) { self.0.downstream.on_error::<Out>(err) }

  fn complete(self) { self.0.side_completed(true) }

  fn set_upstream(&mut self, upstream: Disposable) {
    self.0.downstream.add_upstream::<Out>(upstream)
  }

  fn is_disposed(&self) -> bool { self.0.downstream.is_closed::<Out>() }
}

impl<A, B, F, O, Out> Observer<B> for SecondObserver<A, B, F, O>
where
  A: Clone + Send,
  B: Clone + Send,
  F: FnMut(A, B) -> Out + Send,
  O: Observer<Out>,
{
  fn next(&mut self, value: B) { self.0.emit(|s| s.second = Some(value)) }

  fn error(self, err: RxError) { self.0.downstream.on_error::<Out>(err) }

  fn complete(self) { self.0.side_completed(false) }

  fn set_upstream(&mut self, upstream: Disposable) {
    self.0.downstream.add_upstream::<Out>(upstream)
  }

  fn is_disposed(&self) -> bool { self.0.downstream.is_closed::<Out>() }
}
