use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::Observer;
use crate::{disposable::Disposable, error::RxError};

/// One observer reachable from several producers.
///
/// Every event is delivered under the lock, so concurrent producers are
/// serialized. The first terminal event takes the observer out; any event
/// after it is dropped. Re-entering the same `SharedObserver` from inside one
/// of its own callbacks would deadlock.
pub struct SharedObserver<O>(Arc<Mutex<Option<O>>>);

impl<O> Clone for SharedObserver<O> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<O> SharedObserver<O> {
  pub fn new(observer: O) -> Self { Self(Arc::new(Mutex::new(Some(observer)))) }

  /// Sends a value unless the observer already terminated.
  pub fn on_next<Item>(&self, value: Item)
  where
    O: Observer<Item>,
  {
    if let Some(observer) = self.0.lock().as_mut() {
      observer.next(value);
    }
  }

  pub fn on_error<Item>(&self, err: RxError)
  where
    O: Observer<Item>,
  {
    let observer = self.0.lock().take();
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  pub fn on_complete<Item>(&self)
  where
    O: Observer<Item>,
  {
    let observer = self.0.lock().take();
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  /// Passes `upstream` on, or disposes it if the observer is gone.
  pub fn add_upstream<Item>(&self, upstream: Disposable)
  where
    O: Observer<Item>,
  {
    let mut guard = self.0.lock();
    match guard.as_mut() {
      Some(observer) => observer.set_upstream(upstream),
      None => {
        drop(guard);
        upstream.dispose();
      }
    }
  }

  /// Whether the observer is gone or disposed.
  ///
  /// While another thread is delivering, the observer counts as alive.
  pub fn is_closed<Item>(&self) -> bool
  where
    O: Observer<Item>,
  {
    self
      .0
      .try_lock()
      .map_or(false, |guard| guard.as_ref().map_or(true, |o| o.is_disposed()))
  }

  pub fn is_terminated(&self) -> bool { self.0.lock().is_none() }

  /// Locks the slot. Events from other producers wait until the guard drops.
  pub(crate) fn lock(&self) -> MutexGuard<'_, Option<O>> { self.0.lock() }
}

impl<Item, O> Observer<Item> for SharedObserver<O>
where
  O: Observer<Item>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.on_next(value) }

  #[inline]
  fn error(self, err: RxError) { self.on_error::<Item>(err) }

  #[inline]
  fn complete(self) { self.on_complete::<Item>() }

  #[inline]
  fn set_upstream(&mut self, upstream: Disposable) { self.add_upstream::<Item>(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.is_closed::<Item>() }
}
