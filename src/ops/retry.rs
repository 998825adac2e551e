//! Resubscribe to a source after it fails.
//!
//! A [`RetryPolicy`] decides, per error, whether to try again. `usize` is the
//! plain count policy: `retry(n)` subscribes up to `n + 1` times in total.
//! [`RetryConfig`] adds an error predicate and an unbounded mode.
//!
//! A source failing synchronously while being subscribed does not recurse:
//! the resubscription is handed back to the loop already subscribing, so the
//! stack depth stays flat however many attempts are made.

use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
  disposable::{CompositeDisposable, Disposable},
  error::RxError,
  observable::Observable,
  observer::{Observer, SharedObserver},
};

/// Decides whether a failed source is subscribed again.
pub trait RetryPolicy: Clone + Send + Sync + 'static {
  /// `attempt` counts the retries already made, starting at zero.
  fn should_retry(&self, err: &RxError, attempt: usize) -> bool;
}

impl RetryPolicy for usize {
  fn should_retry(&self, _err: &RxError, attempt: usize) -> bool { attempt < *self }
}

type ErrorFilter = Arc<dyn Fn(&RxError) -> bool + Send + Sync>;

/// A configurable retry policy.
///
/// ```
/// use rxplus::prelude::*;
///
/// let policy = RetryConfig::new()
///   .count(3)
///   .when(|err| err.is_stream());
/// # let _ = policy;
/// ```
#[derive(Clone, Default)]
pub struct RetryConfig {
  count: Option<usize>,
  filter: Option<ErrorFilter>,
}

impl RetryConfig {
  /// Retries forever until configured otherwise.
  pub fn new() -> Self { Self::default() }

  pub fn count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  /// Only retries errors matching `filter`; others pass downstream.
  pub fn when(mut self, filter: impl Fn(&RxError) -> bool + Send + Sync + 'static) -> Self {
    self.filter = Some(Arc::new(filter));
    self
  }
}

impl fmt::Debug for RetryConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RetryConfig")
      .field("count", &self.count)
      .field("filtered", &self.filter.is_some())
      .finish()
  }
}

impl RetryPolicy for RetryConfig {
  fn should_retry(&self, err: &RxError, attempt: usize) -> bool {
    self.count.map_or(true, |count| attempt < count)
      && self.filter.as_ref().map_or(true, |filter| filter(err))
  }
}

#[derive(Clone)]
pub struct Retry<S, P> {
  pub(crate) source: S,
  pub(crate) policy: P,
}

struct RetryState<S, P, O> {
  source: S,
  policy: P,
  downstream: SharedObserver<O>,
  attempts: AtomicUsize,
  inside_drain: AtomicBool,
  /// Lives as long as the whole subscription.
  outer: CompositeDisposable,
  /// Disposables of the current attempt only.
  attempt: Mutex<CompositeDisposable>,
}

pub struct RetryObserver<S, P, O>(Arc<RetryState<S, P, O>>);

impl<S, P> Observable for Retry<S, P>
where
  S: Observable + Clone + Send + Sync + 'static,
  S::Item: 'static,
  P: RetryPolicy,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    let outer = CompositeDisposable::new();
    let downstream = SharedObserver::new(observer);
    downstream.add_upstream::<S::Item>(outer.clone().into());
    let state = Arc::new(RetryState {
      source: self.source,
      policy: self.policy,
      downstream,
      attempts: AtomicUsize::new(0),
      inside_drain: AtomicBool::new(false),
      outer,
      attempt: Mutex::new(CompositeDisposable::new()),
    });
    drain(state);
  }
}

/// Subscribes attempt after attempt for as long as each one fails
/// synchronously and the policy allows another.
fn drain<S, P, O>(state: Arc<RetryState<S, P, O>>)
where
  S: Observable + Clone + Send + Sync + 'static,
  S::Item: 'static,
  P: RetryPolicy,
  O: Observer<S::Item> + 'static,
{
  loop {
    if state.outer.is_disposed() {
      return;
    }
    let attempt = CompositeDisposable::new();
    let previous = std::mem::replace(&mut *state.attempt.lock(), attempt.clone());
    state.outer.remove(&previous.clone().into());
    previous.dispose();
    state.outer.add(attempt.into());

    state.inside_drain.store(true, Ordering::SeqCst);
    state.source.clone().subscribe_with(RetryObserver(state.clone()));
    // Still set: no synchronous error asked for another round.
    if state.inside_drain.swap(false, Ordering::SeqCst) {
      return;
    }
  }
}

impl<S, P, O> Observer<S::Item> for RetryObserver<S, P, O>
where
  S: Observable + Clone + Send + Sync + 'static,
  S::Item: 'static,
  P: RetryPolicy,
  O: Observer<S::Item> + 'static,
{
  #[inline]
  fn next(&mut self, value: S::Item) { self.0.downstream.on_next(value) }

  fn error(self, err: RxError) {
    let state = self.0;
    let attempt = state.attempts.load(Ordering::Acquire);
    if !state.policy.should_retry(&err, attempt) {
      state.downstream.on_error::<S::Item>(err);
      return;
    }
    state.attempts.store(attempt + 1, Ordering::Release);
    debug!(attempt = attempt + 1, %err, "resubscribing after error");
    if !state.inside_drain.swap(false, Ordering::SeqCst) {
      drain(state);
    }
  }

  fn complete(self) { self.0.downstream.on_complete::<S::Item>() }

  fn set_upstream(&mut self, upstream: Disposable) { self.0.attempt.lock().add(upstream) }

  fn is_disposed(&self) -> bool { self.0.outer.is_disposed() }
}
