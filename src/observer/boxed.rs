use super::Observer;
use crate::{disposable::Disposable, error::RxError};

/// Object-safe mirror of [`Observer`].
///
/// `Observer` consumes `self` on terminal events, which a vtable cannot
/// express for unsized types; the `Box<Self>` receivers here can.
pub trait DynObserver<Item>: Send {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: RxError);
  fn box_complete(self: Box<Self>);
  fn box_set_upstream(&mut self, upstream: Disposable);
  fn box_is_disposed(&self) -> bool;
}

impl<T, Item> DynObserver<Item> for T
where
  T: Observer<Item>,
{
  fn box_next(&mut self, value: Item) { self.next(value) }
  fn box_error(self: Box<Self>, err: RxError) { (*self).error(err) }
  fn box_complete(self: Box<Self>) { (*self).complete() }
  fn box_set_upstream(&mut self, upstream: Disposable) { self.set_upstream(upstream) }
  fn box_is_disposed(&self) -> bool { self.is_disposed() }
}

/// A type-erased observer.
///
/// Costs one allocation and one indirect call per event, and stops the type
/// of an operator chain from growing when pipelines are stored or collected
/// at runtime.
pub struct BoxedObserver<Item>(Box<dyn DynObserver<Item>>);

impl<Item> BoxedObserver<Item> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item> + 'static,
  {
    Self(Box::new(observer))
  }
}

impl<Item> Observer<Item> for BoxedObserver<Item> {
  #[inline]
  fn next(&mut self, value: Item) { self.0.box_next(value) }

  #[inline]
  fn error(self, err: RxError) { self.0.box_error(err) }

  #[inline]
  fn complete(self) { self.0.box_complete() }

  #[inline]
  fn set_upstream(&mut self, upstream: Disposable) { self.0.box_set_upstream(upstream) }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.box_is_disposed() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::observer::test_util::Recorder;

  #[test]
  fn forwards_every_event() {
    let recorder = Recorder::new();
    let mut boxed = BoxedObserver::new(recorder.clone());
    boxed.set_upstream(Disposable::empty());
    boxed.next(1);
    boxed.next(2);
    assert!(!boxed.is_disposed());
    boxed.complete();
    assert_eq!(recorder.values(), vec![1, 2]);
    assert_eq!(recorder.completed(), 1);
    assert_eq!(recorder.log.lock().upstreams.len(), 1);
  }

  #[test]
  fn heterogeneous_observers_in_one_vec() {
    let a = Recorder::new();
    let b = Recorder::new();
    let mut all: Vec<BoxedObserver<i32>> =
      vec![BoxedObserver::new(a.clone()), BoxedObserver::new(b.clone())];
    all.iter_mut().for_each(|o| o.next(7));
    all.into_iter().for_each(|o| o.error(RxError::Timeout));
    assert_eq!(a.values(), vec![7]);
    assert_eq!(b.errors(), vec![RxError::Timeout]);
  }
}
