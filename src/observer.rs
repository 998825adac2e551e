//! Observer trait and implementations
//!
//! An [`Observer`] consumes the three kinds of events of a stream: values,
//! one error, or completion. The terminal methods take `self` by value, so on
//! the generic path no observer can receive anything after a terminal event.
//! Paths that share one observer between producers hold it in a
//! [`SharedObserver`], which takes it out on the terminal event.

use crate::{disposable::Disposable, error::RxError};

mod boxed;
mod lambda;
mod shared;
mod subscriber;

pub use boxed::{BoxedObserver, DynObserver};
pub use lambda::{default_error_handler, LambdaObserver};
pub use shared::SharedObserver;
pub use subscriber::Subscriber;

// ============================================================================
// Observer Trait
// ============================================================================

/// The consumer of a stream.
pub trait Observer<Item>: Send {
  /// Receive the next value
  fn next(&mut self, value: Item);

  /// Receive the error terminating the stream
  fn error(self, err: RxError);

  /// Receive the completion of the stream
  fn complete(self);

  /// Hands the observer a disposable of the producer feeding it.
  ///
  /// Operators forward it downstream until it reaches the [`Subscriber`] at
  /// the end of the chain, which owns the whole upstream tree.
  fn set_upstream(&mut self, upstream: Disposable);

  /// Whether values sent now would be ignored.
  ///
  /// Synchronous sources poll this to stop early.
  fn is_disposed(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod test_util {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;

  /// Records every event it receives.
  #[derive(Clone)]
  pub(crate) struct Recorder<Item> {
    pub(crate) log: Arc<Mutex<Record<Item>>>,
  }

  pub(crate) struct Record<Item> {
    pub(crate) values: Vec<Item>,
    pub(crate) errors: Vec<RxError>,
    pub(crate) completed: usize,
    pub(crate) upstreams: Vec<Disposable>,
  }

  impl<Item> Recorder<Item> {
    pub(crate) fn new() -> Self {
      Self {
        log: Arc::new(Mutex::new(Record {
          values: vec![],
          errors: vec![],
          completed: 0,
          upstreams: vec![],
        })),
      }
    }

    pub(crate) fn values(&self) -> Vec<Item>
    where
      Item: Clone,
    {
      self.log.lock().values.clone()
    }

    pub(crate) fn errors(&self) -> Vec<RxError> { self.log.lock().errors.clone() }

    pub(crate) fn completed(&self) -> usize { self.log.lock().completed }
  }

  impl<Item: Send> Observer<Item> for Recorder<Item> {
    fn next(&mut self, value: Item) { self.log.lock().values.push(value) }

    fn error(self, err: RxError) { self.log.lock().errors.push(err) }

    fn complete(self) { self.log.lock().completed += 1 }

    fn set_upstream(&mut self, upstream: Disposable) { self.log.lock().upstreams.push(upstream) }

    fn is_disposed(&self) -> bool { false }
  }
}
