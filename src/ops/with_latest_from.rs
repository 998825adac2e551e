use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  disposable::Disposable,
  error::RxError,
  observable::Observable,
  observer::{Observer, SharedObserver},
};

/// Pairs every value of `source` with the latest value of `other`.
///
/// Source values arriving before `other` emitted anything are dropped. Only
/// the source completing completes the stream; `other` completing just
/// freezes its latest value. The first error from either side terminates.
#[derive(Clone)]
pub struct WithLatestFrom<S, FS> {
  pub(crate) source: S,
  pub(crate) other: FS,
}

struct Latest<B, O> {
  value: Mutex<Option<B>>,
  downstream: SharedObserver<O>,
}

pub struct SourceObserver<B, O>(Arc<Latest<B, O>>);

pub struct OtherObserver<A, B, O> {
  latest: Arc<Latest<B, O>>,
  _source: std::marker::PhantomData<fn() -> A>,
}

impl<S, FS> Observable for WithLatestFrom<S, FS>
where
  S: Observable,
  FS: Observable,
  S::Item: Send + 'static,
  FS::Item: Clone + Send + 'static,
{
  type Item = (S::Item, FS::Item);

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    let latest =
      Arc::new(Latest { value: Mutex::new(None), downstream: SharedObserver::new(observer) });
    self
      .other
      .subscribe_with(OtherObserver { latest: latest.clone(), _source: std::marker::PhantomData });
    self.source.subscribe_with(SourceObserver(latest));
  }
}

impl<A, B, O> Observer<A> for SourceObserver<B, O>
where
  A: Send,
  B: Clone + Send,
  O: Observer<(A, B)>,
{
  fn next(&mut self, value: A) {
    let other = self.0.value.lock().clone();
    if let Some(other) = other {
      self.0.downstream.on_next((value, other));
    }
  }

  fn error(self, err: RxError) { self.0.downstream.on_error::<(A, B)>(err) }

  fn complete(self) { self.0.downstream.on_complete::<(A, B)>() }

  fn set_upstream(&mut self, upstream: Disposable) {
    self.0.downstream.add_upstream::<(A, B)>(upstream)
  }

  fn is_disposed(&self) -> bool { self.0.downstream.is_closed::<(A, B)>() }
}

impl<A, B, O> Observer<B> for OtherObserver<A, B, O>
where
  A: Send,
  B: Send,
  O: Observer<(A, B)>,
{
  fn next(&mut self, value: B) { *self.latest.value.lock() = Some(value) }

  fn error(self, err: RxError) { self.latest.downstream.on_error::<(A, B)>(err) }

  fn complete(self) {}

  fn set_upstream(&mut self, upstream: Disposable) {
    self.latest.downstream.add_upstream::<(A, B)>(upstream)
  }

  fn is_disposed(&self) -> bool { self.latest.downstream.is_closed::<(A, B)>() }
}
