use super::Observable;
use crate::observer::Observer;

/// Builds the source only when subscribed, once per subscription.
pub fn defer<F, S>(factory: F) -> Defer<F>
where
  F: FnOnce() -> S,
  S: Observable,
{
  Defer(factory)
}

#[derive(Clone)]
pub struct Defer<F>(F);

impl<F, S> Observable for Defer<F>
where
  F: FnOnce() -> S,
  S: Observable,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    (self.0)().subscribe_with(observer)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use crate::prelude::*;

  #[test]
  fn factory_runs_per_subscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c_calls = calls.clone();
    let source = observable::defer(move || {
      let n = c_calls.fetch_add(1, Ordering::SeqCst);
      observable::of(n)
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(source.clone().as_blocking().last(), Ok(0));
    assert_eq!(source.as_blocking().last(), Ok(1));
  }
}
