//! # rxplus: reactive streams for Rust
//!
//! Observables composed from lifted operators, scheduled on pluggable
//! workers, and torn down through one disposable tree per subscription.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxplus::prelude::*;
//!
//! let evens = observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .as_blocking()
//!   .to_vec();
//! assert_eq!(evens, Ok(vec![0, 4, 8, 12, 16]));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy producer, started by subscribing an observer |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Disposable`] | Handle to cancel a subscription and everything upstream |
//! | [`Scheduler`] | Factory of workers deciding where and when tasks run |
//! | [`Subject`] | Observer and observable at once, broadcasting to subscribers |
//!
//! Events follow the grammar `next* (error | complete)?`: after a terminal
//! event nothing more reaches an observer, and its subscription is disposed.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Disposable`]: disposable::Disposable
//! [`Scheduler`]: scheduler::Scheduler
//! [`Subject`]: subject::Subject

pub mod disposable;
pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;

pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
