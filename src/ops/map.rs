use super::Operator;
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// Applies a function to every value.
#[derive(Clone)]
pub struct MapOp<F>(pub(crate) F);

pub struct MapObserver<O, F> {
  downstream: O,
  func: F,
}

impl<In, Out, F> Operator<In> for MapOp<F>
where
  F: FnMut(In) -> Out + Send + 'static,
{
  type Out = Out;

  fn lift<O>(self, downstream: O) -> impl Observer<In> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    MapObserver { downstream, func: self.0 }
  }
}

impl<In, Out, O, F> Observer<In> for MapObserver<O, F>
where
  O: Observer<Out>,
  F: FnMut(In) -> Out + Send,
{
  #[inline]
  fn next(&mut self, value: In) { self.downstream.next((self.func)(value)) }

  #[inline]
  fn error(self, err: RxError) { self.downstream.error(err) }

  #[inline]
  fn complete(self) { self.downstream.complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Disposable) { self.downstream.set_upstream(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.downstream.is_disposed() }
}
