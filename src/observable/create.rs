use std::marker::PhantomData;

use super::Observable;
use crate::{
  disposable::Disposable,
  error::{RxError, RxResult},
  observer::{BoxedObserver, Observer, SharedObserver},
};

/// An observable driven by a closure.
///
/// `subscribe` runs the closure with an [`Emitter`] for the new subscriber.
/// An `Err` returned by the closure is delivered as the stream's error,
/// unless the stream already terminated.
///
/// ```
/// use rxplus::prelude::*;
///
/// let numbers = observable::create(|mut emitter: Emitter<i32>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
///   Ok(())
/// });
/// assert_eq!(numbers.as_blocking().to_vec(), Ok(vec![1, 2]));
/// ```
pub fn create<F, Item>(subscribe: F) -> Create<F, Item>
where
  F: FnOnce(Emitter<Item>) -> RxResult<()>,
{
  Create { subscribe, _item: PhantomData }
}

pub struct Create<F, Item> {
  subscribe: F,
  _item: PhantomData<fn() -> Item>,
}

impl<F: Clone, Item> Clone for Create<F, Item> {
  fn clone(&self) -> Self { Self { subscribe: self.subscribe.clone(), _item: PhantomData } }
}

impl<F, Item> Observable for Create<F, Item>
where
  F: FnOnce(Emitter<Item>) -> RxResult<()>,
  Item: 'static,
{
  type Item = Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    let emitter = Emitter(SharedObserver::new(BoxedObserver::new(observer)));
    if let Err(err) = (self.subscribe)(emitter.clone()) {
      emitter.0.on_error::<Item>(err);
    }
  }
}

/// The producer side handed to a [`create`] closure.
///
/// Cheap to clone and safe to move to other threads; emissions from several
/// clones are serialized. Everything after the first `error` or `complete` is
/// ignored.
pub struct Emitter<Item>(SharedObserver<BoxedObserver<Item>>);

impl<Item> Clone for Emitter<Item> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item> Emitter<Item> {
  pub fn next(&mut self, value: Item) { self.0.on_next(value) }

  pub fn error(&mut self, err: RxError) { self.0.on_error::<Item>(err) }

  pub fn complete(&mut self) { self.0.on_complete::<Item>() }

  /// Whether the subscriber is gone. Long-running producers should stop once
  /// this turns true.
  pub fn is_disposed(&self) -> bool { self.0.is_closed::<Item>() }

  /// Registers a resource to release when the subscription ends.
  pub fn add_teardown(&self, teardown: Disposable) { self.0.add_upstream::<Item>(teardown) }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn returned_error_terminates_the_stream() {
    let recorder = Recorder::new();
    observable::create(|mut emitter: Emitter<i32>| {
      emitter.next(1);
      Err(RxError::msg("broken producer"))
    })
    .subscribe_observer(recorder.clone());
    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(recorder.errors(), vec![RxError::msg("broken producer")]);
  }

  #[test]
  fn returned_error_after_complete_is_ignored() {
    let recorder = Recorder::<i32>::new();
    observable::create(|mut emitter: Emitter<i32>| {
      emitter.complete();
      Err(RxError::Timeout)
    })
    .subscribe_observer(recorder.clone());
    assert_eq!(recorder.completed(), 1);
    assert!(recorder.errors().is_empty());
  }

  #[test]
  fn teardown_runs_on_unsubscribe() {
    let torn_down = Arc::new(AtomicBool::new(false));
    let c_torn_down = torn_down.clone();
    let subscription = observable::create(move |emitter: Emitter<i32>| {
      emitter.add_teardown(Disposable::from_fn(move || c_torn_down.store(true, Ordering::SeqCst)));
      Ok(())
    })
    .subscribe(|_| {});
    assert!(!torn_down.load(Ordering::SeqCst));
    subscription.dispose();
    assert!(torn_down.load(Ordering::SeqCst));
  }

  #[test]
  fn emitter_sees_disposal() {
    let subscription = Arc::new(parking_lot::Mutex::new(None::<Disposable>));
    let c_subscription = subscription.clone();
    let emitted = observable::create(move |mut emitter: Emitter<i32>| {
      let mut emitted = 0;
      while !emitter.is_disposed() && emitted < 100 {
        emitter.next(emitted);
        emitted += 1;
        if emitted == 3 {
          if let Some(s) = c_subscription.lock().as_ref() {
            s.dispose()
          }
        }
      }
      Ok(())
    });
    let recorder = Recorder::new();
    let handle = Subscriber::new(recorder.clone());
    *subscription.lock() = Some(handle.subscription());
    emitted.subscribe_with(handle);
    assert_eq!(recorder.values(), vec![0, 1, 2]);
  }
}
