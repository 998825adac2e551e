//! Operators.
//!
//! Most operators are [`Operator`]s: at subscribe time they wrap the
//! downstream observer in their own observer and hand that upstream. A chain
//! `source.map(f).filter(p)` therefore nests statically into
//! `Lifted<Lifted<S, MapOp<F>>, FilterOp<P>>` and costs no allocation.
//!
//! Operators that subscribe more than once or to more than one source
//! ([`merge`], [`combine_latest`], [`with_latest_from`], [`take_until`],
//! [`retry`], [`subscribe_on`]) are observables of their own.

use crate::{observable::Observable, observer::Observer};

pub mod combine_latest;
pub mod delay;
pub mod element;
pub mod filter;
pub mod into_future;
pub mod map;
pub mod merge;
pub mod observe_on;
pub mod retry;
pub mod scan;
pub mod skip;
pub mod subscribe_on;
pub mod take;
pub mod take_until;
pub mod take_while;
pub mod tap;
pub mod timeout;
pub mod with_latest_from;

/// Transforms a downstream observer of `Out` into an upstream observer of
/// `In`.
pub trait Operator<In>: Sized {
  type Out;

  fn lift<O>(self, downstream: O) -> impl Observer<In> + 'static
  where
    O: Observer<Self::Out> + 'static;
}

/// The observable produced by [`lift`](crate::observable::ObservableExt::lift).
#[derive(Clone)]
pub struct Lifted<S, Op> {
  pub(crate) source: S,
  pub(crate) op: Op,
}

impl<S, Op> Lifted<S, Op> {
  pub fn new(source: S, op: Op) -> Self { Self { source, op } }
}

impl<S, Op> Observable for Lifted<S, Op>
where
  S: Observable,
  Op: Operator<S::Item>,
{
  type Item = Op::Out;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    self.source.subscribe_with(self.op.lift(observer))
  }
}
