use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{Observable, ObservableExt};
use crate::{
  disposable::{CompositeDisposable, Disposable, RefCountDisposable},
  observer::Observer,
  subject::PublishSubject,
};

/// A source shared by every subscriber through one subject.
///
/// Subscribing only registers with the subject; nothing flows until
/// [`connect`](Self::connect) subscribes the source to it. Once a connection
/// terminates or is disposed, the next `connect` starts over with a fresh
/// subject, so subscribers that join afterwards see the new run.
pub struct ConnectableObservable<S: Observable> {
  source: S,
  state: Arc<Mutex<Connection<S::Item>>>,
}

struct Connection<Item> {
  subject: PublishSubject<Item>,
  handle: Option<CompositeDisposable>,
}

impl<S> Clone for ConnectableObservable<S>
where
  S: Observable + Clone,
{
  fn clone(&self) -> Self { Self { source: self.source.clone(), state: self.state.clone() } }
}

impl<S> ConnectableObservable<S>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
{
  pub fn new(source: S) -> Self {
    let connection = Connection { subject: PublishSubject::new(), handle: None };
    Self { source, state: Arc::new(Mutex::new(connection)) }
  }

  /// Subscribes the source to the shared subject, unless a connection is
  /// already running, in which case its handle is returned.
  pub fn connect(&self) -> Disposable
  where
    S: Clone,
  {
    let (subject, handle) = {
      let mut state = self.state.lock();
      if let Some(handle) = state.handle.as_ref() {
        if !handle.is_disposed() && !state.subject.is_terminated() {
          return handle.clone().into();
        }
      }
      Self::refresh(&mut state);
      let handle = CompositeDisposable::new();
      state.handle = Some(handle.clone());
      (state.subject.clone(), handle)
    };
    debug!("connecting shared source");
    // The source may emit synchronously, so the lock is released first.
    handle.add(self.source.clone().subscribe_observer(subject.observer()));
    handle.into()
  }

  /// Connects on the first subscriber and disposes the connection when the
  /// last subscriber unsubscribes.
  pub fn ref_count(self) -> RefCount<S> { RefCount { connectable: self, refs: Arc::default() } }

  fn refresh(state: &mut Connection<S::Item>) {
    if state.subject.is_terminated() {
      state.subject = PublishSubject::new();
    }
  }

  fn subject(&self) -> PublishSubject<S::Item> { self.state.lock().subject.clone() }
}

impl<S> Observable for ConnectableObservable<S>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    self.subject().observable().subscribe_with(observer)
  }
}

/// The observable returned by [`ConnectableObservable::ref_count`].
pub struct RefCount<S: Observable> {
  connectable: ConnectableObservable<S>,
  refs: Arc<Mutex<Option<RefCountDisposable>>>,
}

impl<S> Clone for RefCount<S>
where
  S: Observable + Clone,
{
  fn clone(&self) -> Self {
    Self { connectable: self.connectable.clone(), refs: self.refs.clone() }
  }
}

impl<S> Observable for RefCount<S>
where
  S: Observable + Clone,
  S::Item: Clone + Send + 'static,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, mut observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    let mut refs = self.refs.lock();
    let joined = refs.as_ref().map(|counter| counter.add_ref()).filter(|r| !r.is_disposed());
    match joined {
      Some(reference) => {
        drop(refs);
        observer.set_upstream(reference);
        self.connectable.subscribe_with(observer);
      }
      None => {
        let connection = CompositeDisposable::new();
        let counter = RefCountDisposable::new(connection.clone().into());
        *refs = Some(counter.clone());
        Self::refresh_subject(&self.connectable);
        drop(refs);
        // The counter's own reference belongs to this first subscriber.
        observer.set_upstream(Disposable::new(counter));
        self.connectable.clone().subscribe_with(observer);
        connection.add(self.connectable.connect());
      }
    }
  }
}

impl<S> RefCount<S>
where
  S: Observable + Clone,
  S::Item: Clone + Send + 'static,
{
  /// Number of subscribers currently sharing the connection.
  pub fn subscriber_count(&self) -> usize {
    self.refs.lock().as_ref().map_or(0, |counter| counter.ref_count())
  }

  fn refresh_subject(connectable: &ConnectableObservable<S>) {
    let mut state = connectable.state.lock();
    let stale = state.handle.as_ref().map_or(false, |h| h.is_disposed());
    if stale {
      state.subject = PublishSubject::new();
      state.handle = None;
    } else {
      ConnectableObservable::<S>::refresh(&mut state);
    }
  }
}
