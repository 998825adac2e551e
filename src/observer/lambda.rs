use tracing::error;

use super::Observer;
use crate::{disposable::Disposable, error::RxError};

/// An observer built from closures, as used by `subscribe` and friends.
pub struct LambdaObserver<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> LambdaObserver<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { Self { next, error, complete } }
}

impl<Item, N, E, C> Observer<Item> for LambdaObserver<N, E, C>
where
  N: FnMut(Item) + Send,
  E: FnOnce(RxError) + Send,
  C: FnOnce() + Send,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: RxError) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  fn set_upstream(&mut self, _upstream: Disposable) {}

  fn is_disposed(&self) -> bool { false }
}

/// Error handler of subscribers that did not provide one: logs the error and
/// raises it as a panic on the thread delivering it.
pub fn default_error_handler(err: RxError) {
  error!(%err, "unhandled error in stream");
  panic!("unhandled error in stream: {err}");
}
