use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Weak,
};

use parking_lot::Mutex;
use tracing::trace;

use super::history::History;
use crate::{
  disposable::{CompositeDisposable, Disposable},
  error::RxError,
  observer::{BoxedObserver, Observer, SharedObserver},
  scheduler::Instant,
};

type Entry<Item> = (usize, SharedObserver<BoxedObserver<Item>>);

enum Status<Item> {
  /// Registered observers. Writers clone the `Arc` and broadcast unlocked;
  /// subscribe and unsubscribe replace the list.
  Active(Arc<Vec<Entry<Item>>>),
  Errored(RxError),
  Completed,
  Disposed,
}

struct Inner<Item, H> {
  status: Status<Item>,
  history: H,
}

/// The broadcast state shared by a subject's writer and readers.
pub(crate) struct SubjectState<Item, H> {
  inner: Mutex<Inner<Item, H>>,
  /// Whatever the subject itself is subscribed to.
  upstream: CompositeDisposable,
  next_id: AtomicUsize,
}

impl<Item, H> SubjectState<Item, H>
where
  Item: Clone + Send + 'static,
  H: History<Item>,
{
  pub(crate) fn new(history: H) -> Arc<Self> {
    Arc::new(Self {
      inner: Mutex::new(Inner { status: Status::Active(Arc::default()), history }),
      upstream: CompositeDisposable::new(),
      next_id: AtomicUsize::new(0),
    })
  }

  pub(crate) fn subscribe<O>(self: &Arc<Self>, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    let mut guard = self.inner.lock();
    let inner = &mut *guard;
    let now = Instant::now();
    match &mut inner.status {
      Status::Active(observers) => {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = SharedObserver::new(BoxedObserver::new(observer));
        // Holding the entry keeps writers from reaching it before the replay
        // below is delivered.
        let mut slot = entry.lock();
        let mut list = Vec::with_capacity(observers.len() + 1);
        list.extend(observers.iter().cloned());
        list.push((id, entry.clone()));
        *observers = Arc::new(list);
        let replay = inner.history.replay(now, false);
        drop(guard);

        if let Some(observer) = slot.as_mut() {
          observer.set_upstream(self.removal(id));
          replay.into_iter().for_each(|v| observer.next(v));
        }
      }
      Status::Errored(err) => {
        let err = err.clone();
        let replay = inner.history.replay(now, true);
        drop(guard);
        let mut observer = observer;
        replay.into_iter().for_each(|v| observer.next(v));
        observer.error(err);
      }
      Status::Completed => {
        let replay = inner.history.replay(now, true);
        drop(guard);
        let mut observer = observer;
        replay.into_iter().for_each(|v| observer.next(v));
        observer.complete();
      }
      Status::Disposed => {}
    }
  }

  pub(crate) fn next(&self, value: Item) {
    let observers = {
      let mut guard = self.inner.lock();
      let inner = &mut *guard;
      match &inner.status {
        Status::Active(observers) => {
          inner.history.record(&value, Instant::now());
          observers.clone()
        }
        _ => return,
      }
    };
    if let Some(((_, last), rest)) = observers.split_last() {
      rest.iter().for_each(|(_, o)| o.on_next(value.clone()));
      last.on_next(value);
    }
  }

  pub(crate) fn error(&self, err: RxError) {
    let observers = match self.terminate(Status::Errored(err.clone())) {
      Some(observers) => observers,
      None => return,
    };
    trace!(observers = observers.len(), %err, "subject errored");
    observers.iter().for_each(|(_, o)| o.on_error::<Item>(err.clone()));
  }

  pub(crate) fn complete(&self) {
    let observers = match self.terminate(Status::Completed) {
      Some(observers) => observers,
      None => return,
    };
    trace!(observers = observers.len(), "subject completed");
    observers.iter().for_each(|(_, o)| o.on_complete::<Item>());
  }

  /// Drops every observer without a terminal event and unsubscribes the
  /// subject from its own upstream.
  pub(crate) fn dispose(&self) {
    if let Some(observers) = self.terminate(Status::Disposed) {
      trace!(observers = observers.len(), "subject disposed");
      drop(observers);
    }
    self.upstream.dispose();
  }

  pub(crate) fn add_upstream(&self, upstream: Disposable) { self.upstream.add(upstream) }

  pub(crate) fn observer_count(&self) -> usize {
    match &self.inner.lock().status {
      Status::Active(observers) => observers.len(),
      _ => 0,
    }
  }

  pub(crate) fn is_active(&self) -> bool { matches!(self.inner.lock().status, Status::Active(_)) }

  pub(crate) fn is_disposed(&self) -> bool {
    matches!(self.inner.lock().status, Status::Disposed)
  }

  pub(crate) fn with_history<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
    f(&mut self.inner.lock().history)
  }

  /// Moves an active subject to `status`, handing back its observers.
  fn terminate(&self, status: Status<Item>) -> Option<Arc<Vec<Entry<Item>>>> {
    let mut inner = self.inner.lock();
    if !matches!(inner.status, Status::Active(_)) {
      return None;
    }
    match std::mem::replace(&mut inner.status, status) {
      Status::Active(observers) => Some(observers),
      _ => None,
    }
  }

  fn remove(&self, id: usize) {
    let removed = {
      let mut inner = self.inner.lock();
      match &mut inner.status {
        Status::Active(observers) => {
          let Some(pos) = observers.iter().position(|(i, _)| *i == id) else { return };
          let mut list = Vec::with_capacity(observers.len() - 1);
          list.extend(observers.iter().filter(|(i, _)| *i != id).cloned());
          let removed = observers[pos].1.clone();
          *observers = Arc::new(list);
          removed
        }
        _ => return,
      }
    };
    drop(removed);
  }

  fn removal(self: &Arc<Self>, id: usize) -> Disposable {
    let state: Weak<Self> = Arc::downgrade(self);
    Disposable::from_fn(move || {
      if let Some(state) = state.upgrade() {
        state.remove(id);
      }
    })
  }
}
