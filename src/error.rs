//! Error kinds carried by the `error` channel of a stream.
//!
//! Two families share [`RxError`]: *stream errors* raised by producer or
//! operator logic ([`RxError::Stream`]), and *contract violations* detected by
//! the library itself (too few emissions, a full disposable container, a
//! missing run loop, a deadline). Both reach observers through the same
//! `error` call; nothing here is ever thrown past `subscribe`.

use std::{error::Error, fmt, sync::Arc};

use thiserror::Error;

/// The error type delivered to [`Observer::error`](crate::observer::Observer::error).
///
/// Cheap to clone: a subject broadcasting one error to many observers clones
/// the `Arc` behind [`RxError::Stream`].
#[derive(Debug, Clone, Error)]
pub enum RxError {
  /// A domain error raised by producer or operator code.
  #[error("{0}")]
  Stream(Arc<dyn Error + Send + Sync>),
  /// The source completed before emitting what `first`/`last` needed.
  #[error("sequence completed without enough emissions")]
  NotEnoughEmissions,
  /// `element_at` asked for an index the source never reached.
  #[error("requested element index is out of range")]
  OutOfRange,
  /// A fixed-size disposable container received more items than declared.
  #[error("more disposables than the container capacity")]
  MoreDisposablesThanExpected,
  /// Work was scheduled on a run loop (or worker thread) that is gone.
  #[error("no active loop to schedule on")]
  NoActiveLoop,
  /// No emission arrived within the configured period.
  #[error("timeout has been reached")]
  Timeout,
}

pub type RxResult<T> = Result<T, RxError>;

impl RxError {
  /// Wraps any error value as a stream error.
  pub fn stream<E>(err: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    RxError::Stream(Arc::new(err))
  }

  /// Builds a stream error from a plain message.
  pub fn msg(message: impl Into<String>) -> Self { Self::stream(Message(message.into())) }

  pub fn is_stream(&self) -> bool { matches!(self, RxError::Stream(_)) }

  /// Returns the wrapped stream error if it is of type `E`.
  pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
    match self {
      RxError::Stream(err) => err.downcast_ref::<E>(),
      _ => None,
    }
  }
}

impl PartialEq for RxError {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (RxError::Stream(a), RxError::Stream(b)) => {
        Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
      }
      (RxError::NotEnoughEmissions, RxError::NotEnoughEmissions)
      | (RxError::OutOfRange, RxError::OutOfRange)
      | (RxError::MoreDisposablesThanExpected, RxError::MoreDisposablesThanExpected)
      | (RxError::NoActiveLoop, RxError::NoActiveLoop)
      | (RxError::Timeout, RxError::Timeout) => true,
      _ => false,
    }
  }
}

impl From<std::io::Error> for RxError {
  fn from(err: std::io::Error) -> Self { RxError::stream(err) }
}

/// Error payload used by [`RxError::msg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(String);

impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Error for Message {}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("boom {0}")]
  struct Boom(u32);

  #[test]
  fn stream_error_display_and_downcast() {
    let err = RxError::stream(Boom(7));
    assert_eq!(err.to_string(), "boom 7");
    assert!(err.is_stream());
    assert_eq!(err.downcast_ref::<Boom>().map(|b| b.0), Some(7));
    assert!(RxError::Timeout.downcast_ref::<Boom>().is_none());
  }

  #[test]
  fn clones_compare_equal() {
    let err = RxError::msg("failed");
    assert_eq!(err.clone(), err);
    assert_eq!(RxError::msg("failed"), err);
    assert_ne!(RxError::OutOfRange, RxError::NotEnoughEmissions);
  }
}
