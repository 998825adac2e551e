//! Observable trait and sources
//!
//! An [`Observable`] is an immutable description of a stream. Nothing happens
//! until it is subscribed; every subscription is independent. All operators
//! and the `subscribe` family live on [`ObservableExt`], implemented for every
//! observable whose items can cross threads.
//!
//! ```
//! use rxplus::prelude::*;
//!
//! let tens = observable::from_iter(1..=6)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 10)
//!   .as_blocking()
//!   .to_vec()
//!   .unwrap();
//! assert_eq!(tens, vec![20, 40, 60]);
//! ```

use crate::{
  disposable::Disposable,
  error::RxError,
  observer::{default_error_handler, LambdaObserver, Observer, Subscriber},
  ops::{
    combine_latest::CombineLatest,
    delay::DelayOp,
    element::{ElementAtOp, FirstOp, LastOp},
    filter::FilterOp,
    into_future::{LastValueObserver, ObservableFuture},
    map::MapOp,
    merge::{Merge, MergeAll},
    observe_on::ObserveOnOp,
    retry::{Retry, RetryPolicy},
    scan::ScanOp,
    skip::SkipOp,
    subscribe_on::SubscribeOn,
    take::TakeOp,
    take_until::TakeUntil,
    take_while::TakeWhileOp,
    tap::TapOp,
    timeout::TimeoutOp,
    with_latest_from::WithLatestFrom,
    Lifted, Operator,
  },
  scheduler::{Duration, NonTrampoline, Scheduler},
};

mod blocking;
mod boxed;
mod connectable;
mod create;
mod defer;
mod from_iter;
mod interval;
mod trivial;

pub use blocking::BlockingObservable;
pub use boxed::{BoxedObservable, BoxedObservableClone, DynObservable, DynObservableClone};
pub use connectable::{ConnectableObservable, RefCount};
pub use create::{create, Create, Emitter};
pub use defer::{defer, Defer};
pub use from_iter::{from_iter, of, FromIter};
pub use interval::{interval, timer, Interval, Timer};
pub use trivial::{empty, never, throw_err, Empty, Never, ThrowErr};

/// Interleaves a runtime list of sources of the same type.
pub fn merge_all<S, I>(sources: I) -> MergeAll<S>
where
  I: IntoIterator<Item = S>,
  S: Observable,
{
  MergeAll(sources.into_iter().collect())
}

// ============================================================================
// Observable Trait
// ============================================================================

/// A stream of `Item`s ending in at most one error or completion.
pub trait Observable: Sized {
  type Item;

  /// Starts the stream, delivering its events to `observer`.
  ///
  /// The observer receives the producer's disposable through
  /// [`Observer::set_upstream`]; there is no return value.
  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static;
}

// ============================================================================
// Extension methods
// ============================================================================

/// Operators and subscribe helpers, available on every [`Observable`] whose
/// items are `Send + 'static`.
pub trait ObservableExt: Observable
where
  Self::Item: Send + 'static,
{
  /// Subscribes with a value handler. An error reaching this subscriber is
  /// logged and raised as a panic, see [`default_error_handler`].
  fn subscribe<N>(self, next: N) -> Disposable
  where
    N: FnMut(Self::Item) + Send + 'static,
  {
    self.subscribe_all(next, default_error_handler, || {})
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> Disposable
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(RxError) + Send + 'static,
  {
    self.subscribe_all(next, error, || {})
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Disposable
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(RxError) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe_observer(LambdaObserver::new(next, error, complete))
  }

  /// Subscribes `observer` behind a [`Subscriber`] and returns the handle
  /// that tears the whole chain down.
  fn subscribe_observer<O>(self, observer: O) -> Disposable
  where
    O: Observer<Self::Item> + 'static,
  {
    let subscriber = Subscriber::new(observer);
    let subscription = subscriber.subscription();
    self.subscribe_with(subscriber);
    subscription
  }

  /// Applies a user-defined [`Operator`].
  fn lift<Op>(self, op: Op) -> Lifted<Self, Op>
  where
    Op: Operator<Self::Item>,
  {
    Lifted::new(self, op)
  }

  /// Erases the type of this pipeline.
  fn boxed(self) -> BoxedObservable<Self::Item>
  where
    Self: Send + 'static,
  {
    BoxedObservable::new(self)
  }

  /// Erases the type of this pipeline, keeping it cloneable.
  fn boxed_clone(self) -> BoxedObservableClone<Self::Item>
  where
    Self: Clone + Send + Sync + 'static,
  {
    BoxedObservableClone::new(self)
  }

  fn map<B, F>(self, f: F) -> Lifted<Self, MapOp<F>>
  where
    F: FnMut(Self::Item) -> B + Send + 'static,
  {
    Lifted::new(self, MapOp(f))
  }

  fn filter<F>(self, predicate: F) -> Lifted<Self, FilterOp<F>>
  where
    F: FnMut(&Self::Item) -> bool + Send + 'static,
  {
    Lifted::new(self, FilterOp(predicate))
  }

  /// Calls `f` for every value before passing it on.
  fn tap<F>(self, f: F) -> Lifted<Self, TapOp<F>>
  where
    F: FnMut(&Self::Item) + Send + 'static,
  {
    Lifted::new(self, TapOp(f))
  }

  fn take(self, count: usize) -> Lifted<Self, TakeOp> { Lifted::new(self, TakeOp(count)) }

  /// Passes values while `predicate` holds and completes on the first value
  /// failing it.
  fn take_while<F>(self, predicate: F) -> Lifted<Self, TakeWhileOp<F>>
  where
    F: FnMut(&Self::Item) -> bool + Send + 'static,
  {
    Lifted::new(self, TakeWhileOp(predicate))
  }

  fn skip(self, count: usize) -> Lifted<Self, SkipOp> { Lifted::new(self, SkipOp(count)) }

  /// Emits every intermediate accumulation, starting from `seed`.
  fn scan<B, F>(self, seed: B, func: F) -> Lifted<Self, ScanOp<B, F>>
  where
    B: Clone + Send + 'static,
    F: FnMut(&B, Self::Item) -> B + Send + 'static,
  {
    Lifted::new(self, ScanOp { seed, func })
  }

  fn first(self) -> Lifted<Self, FirstOp> { Lifted::new(self, FirstOp) }

  fn last(self) -> Lifted<Self, LastOp> { Lifted::new(self, LastOp) }

  fn element_at(self, index: usize) -> Lifted<Self, ElementAtOp> {
    Lifted::new(self, ElementAtOp(index))
  }

  fn merge<S>(self, other: S) -> Merge<Self, S>
  where
    S: Observable<Item = Self::Item>,
  {
    Merge { first: self, second: other }
  }

  fn combine_latest<S, F, Out>(self, other: S, func: F) -> CombineLatest<Self, S, F>
  where
    S: Observable,
    F: FnMut(Self::Item, S::Item) -> Out + Send + 'static,
  {
    CombineLatest { first: self, second: other, func }
  }

  /// Pairs each value with the latest value of `other`, once `other` has one.
  fn with_latest_from<S>(self, other: S) -> WithLatestFrom<Self, S>
  where
    S: Observable,
    S::Item: Clone + Send + 'static,
  {
    WithLatestFrom { source: self, other }
  }

  /// Completes as soon as `notifier` emits.
  fn take_until<N>(self, notifier: N) -> TakeUntil<Self, N>
  where
    N: Observable,
    N::Item: 'static,
  {
    TakeUntil { source: self, notifier }
  }

  /// Shifts every event, errors included, by `delay` on `scheduler`.
  fn delay<Sch>(self, delay: Duration, scheduler: Sch) -> Lifted<Self, DelayOp<Sch>>
  where
    Sch: NonTrampoline,
  {
    Lifted::new(self, DelayOp { delay, scheduler })
  }

  /// Re-emits every event from a worker of `scheduler`, in order.
  fn observe_on<Sch>(self, scheduler: Sch) -> Lifted<Self, ObserveOnOp<Sch>>
  where
    Sch: Scheduler,
  {
    Lifted::new(self, ObserveOnOp(scheduler))
  }

  fn subscribe_on<Sch>(self, scheduler: Sch) -> SubscribeOn<Self, Sch>
  where
    Sch: Scheduler,
  {
    SubscribeOn { source: self, scheduler }
  }

  /// Errors with [`RxError::Timeout`] when no event arrives for `period`.
  fn timeout<Sch>(self, period: Duration, scheduler: Sch) -> Lifted<Self, TimeoutOp<Sch>>
  where
    Sch: Scheduler,
  {
    Lifted::new(self, TimeoutOp { period, scheduler })
  }

  /// Resubscribes up to `count` times after an error.
  fn retry(self, count: usize) -> Retry<Self, usize> { Retry { source: self, policy: count } }

  /// Resubscribes after an error as long as `policy` allows.
  fn retry_with<P>(self, policy: P) -> Retry<Self, P>
  where
    P: RetryPolicy,
  {
    Retry { source: self, policy }
  }

  /// Shares one subscription to this source among many subscribers, started
  /// by [`ConnectableObservable::connect`].
  fn publish(self) -> ConnectableObservable<Self>
  where
    Self::Item: Clone,
  {
    ConnectableObservable::new(self)
  }

  /// `publish().ref_count()`: connects on the first subscriber and
  /// disconnects when the last one leaves.
  fn share(self) -> RefCount<Self>
  where
    Self::Item: Clone,
  {
    self.publish().ref_count()
  }

  fn as_blocking(self) -> BlockingObservable<Self> { BlockingObservable::new(self) }

  /// A future resolving to the last value, or to
  /// [`RxError::NotEnoughEmissions`] if the stream completes empty. Dropping
  /// the future unsubscribes.
  fn into_future(self) -> ObservableFuture<Self::Item> {
    let (observer, receiver) = LastValueObserver::channel();
    let subscription = self.subscribe_observer(observer);
    ObservableFuture::new(receiver, subscription)
  }
}

impl<S> ObservableExt for S
where
  S: Observable,
  S::Item: Send + 'static,
{
}
