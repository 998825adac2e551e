//! Subjects: observables that are also the observer feeding them.
//!
//! A [`Subject`] broadcasts every event written to it to all current
//! subscribers. It is a cheap handle; clones share one broadcast state. The
//! first terminal event wins and is remembered, so a subscriber arriving
//! afterwards gets that terminal event right away.
//!
//! | Subject | Replays to a new subscriber |
//! |---------|-----------------------------|
//! | [`PublishSubject`] | Nothing |
//! | [`BehaviorSubject`] | The current value, until terminated |
//! | [`ReplaySubject`] | The buffered values, bounded by count and/or age |
//!
//! ```
//! use rxplus::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let subject = PublishSubject::<i32>::new();
//! let seen = Arc::new(Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! subject.observable().map(|v| v * 2).subscribe(move |v| c_seen.lock().unwrap().push(v));
//!
//! subject.next(1);
//! subject.next(2);
//! assert_eq!(*seen.lock().unwrap(), vec![2, 4]);
//! ```

use std::sync::Arc;

use crate::{
  disposable::Disposable,
  error::RxError,
  observable::Observable,
  observer::Observer,
  scheduler::Duration,
};

mod history;
mod serialized;
mod state;

pub use history::{History, Latest, NoHistory, Window};
pub use serialized::{SerializedObserver, SerializedSubject};
use state::SubjectState;

/// Broadcasts to its subscribers; `H` decides what late subscribers replay.
pub struct Subject<Item, H = NoHistory> {
  state: Arc<SubjectState<Item, H>>,
}

pub type PublishSubject<Item> = Subject<Item, NoHistory>;

pub type BehaviorSubject<Item> = Subject<Item, Latest<Item>>;

pub type ReplaySubject<Item> = Subject<Item, Window<Item>>;

impl<Item, H> Clone for Subject<Item, H> {
  fn clone(&self) -> Self { Self { state: self.state.clone() } }
}

impl<Item> PublishSubject<Item>
where
  Item: Clone + Send + 'static,
{
  pub fn new() -> Self { Self::with_history(NoHistory) }
}

impl<Item> Default for PublishSubject<Item>
where
  Item: Clone + Send + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item> BehaviorSubject<Item>
where
  Item: Clone + Send + 'static,
{
  pub fn new(value: Item) -> Self { Self::with_history(Latest(value)) }

  /// The current value: the seed, or the last value written.
  pub fn value(&self) -> Item { self.state.with_history(|latest| latest.0.clone()) }
}

impl<Item> ReplaySubject<Item>
where
  Item: Clone + Send + 'static,
{
  /// Replays every value ever written.
  pub fn new() -> Self { Self::with_limits(None, None) }

  /// Replays at most `capacity` values, none older than `max_age`.
  pub fn with_limits(capacity: Option<usize>, max_age: Option<Duration>) -> Self {
    Self::with_history(Window::new(capacity, max_age))
  }
}

impl<Item, H> Subject<Item, H>
where
  Item: Clone + Send + 'static,
  H: History<Item>,
{
  pub fn with_history(history: H) -> Self { Self { state: SubjectState::new(history) } }

  /// The writer side, for subscribing the subject to another observable.
  pub fn observer(&self) -> SubjectObserver<Item, H> { SubjectObserver(self.state.clone()) }

  /// The reader side.
  pub fn observable(&self) -> SubjectObservable<Item, H> {
    SubjectObservable(self.state.clone())
  }

  /// Disposing it drops every subscriber without a terminal event and
  /// unsubscribes the subject from its upstream. Later writes are ignored.
  pub fn disposable(&self) -> Disposable {
    let state = self.state.clone();
    Disposable::from_fn(move || state.dispose())
  }

  pub fn next(&self, value: Item) { self.state.next(value) }

  pub fn error(&self, err: RxError) { self.state.error(err) }

  pub fn complete(&self) { self.state.complete() }

  pub fn has_observers(&self) -> bool { self.observer_count() > 0 }

  pub fn observer_count(&self) -> usize { self.state.observer_count() }

  /// Whether the subject errored, completed or was disposed.
  pub fn is_terminated(&self) -> bool { !self.state.is_active() }
}

/// The writer side of a [`Subject`].
pub struct SubjectObserver<Item, H>(Arc<SubjectState<Item, H>>);

impl<Item, H> Clone for SubjectObserver<Item, H> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item, H> Observer<Item> for SubjectObserver<Item, H>
where
  Item: Clone + Send + 'static,
  H: History<Item>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(value) }

  fn error(self, err: RxError) { self.0.error(err) }

  fn complete(self) { self.0.complete() }

  fn set_upstream(&mut self, upstream: Disposable) { self.0.add_upstream(upstream) }

  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

/// The reader side of a [`Subject`].
pub struct SubjectObservable<Item, H>(Arc<SubjectState<Item, H>>);

impl<Item, H> Clone for SubjectObservable<Item, H> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item, H> Observable for SubjectObservable<Item, H>
where
  Item: Clone + Send + 'static,
  H: History<Item>,
{
  type Item = Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    self.0.subscribe(observer)
  }
}
