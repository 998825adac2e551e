//! Type-erased observables.
//!
//! Every operator nests its source into its own type, which is what makes a
//! chain free of allocation but also what stops differently shaped pipelines
//! from living in one `Vec` or one struct field. Boxing erases that type at
//! the cost of one allocation per pipeline plus one per subscription.

use super::Observable;
use crate::observer::{BoxedObserver, Observer};

/// Object-safe mirror of [`Observable`].
pub trait DynObservable<Item>: Send {
  fn box_subscribe(self: Box<Self>, observer: BoxedObserver<Item>);
}

impl<S> DynObservable<S::Item> for S
where
  S: Observable + Send,
  S::Item: 'static,
{
  fn box_subscribe(self: Box<Self>, observer: BoxedObserver<S::Item>) {
    (*self).subscribe_with(observer)
  }
}

/// [`DynObservable`] that can also clone itself.
pub trait DynObservableClone<Item>: DynObservable<Item> + Sync {
  fn box_clone(&self) -> Box<dyn DynObservableClone<Item>>;
}

impl<S> DynObservableClone<S::Item> for S
where
  S: Observable + Clone + Send + Sync + 'static,
  S::Item: 'static,
{
  fn box_clone(&self) -> Box<dyn DynObservableClone<S::Item>> { Box::new(self.clone()) }
}

/// A pipeline of any shape producing `Item`s.
pub struct BoxedObservable<Item>(Box<dyn DynObservable<Item>>);

impl<Item: 'static> BoxedObservable<Item> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item> + Send + 'static,
  {
    Self(Box::new(source))
  }
}

impl<Item: 'static> Observable for BoxedObservable<Item> {
  type Item = Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    self.0.box_subscribe(BoxedObserver::new(observer))
  }
}

/// A cloneable [`BoxedObservable`], usable where a source is subscribed
/// more than once, such as behind `retry` or `publish`.
pub struct BoxedObservableClone<Item>(Box<dyn DynObservableClone<Item>>);

impl<Item: 'static> BoxedObservableClone<Item> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item> + Clone + Send + Sync + 'static,
  {
    Self(Box::new(source))
  }
}

impl<Item> Clone for BoxedObservableClone<Item> {
  fn clone(&self) -> Self { Self(self.0.box_clone()) }
}

impl<Item: 'static> Observable for BoxedObservableClone<Item> {
  type Item = Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    self.0.box_subscribe(BoxedObserver::new(observer))
  }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  struct Pipelines {
    sources: Vec<BoxedObservable<u32>>,
  }

  #[test]
  fn differently_shaped_pipelines_in_one_field() {
    let pipelines = Pipelines {
      sources: vec![
        observable::from_iter([1, 2, 3]).filter(|v| v % 2 == 1).boxed(),
        observable::of(5).map(|v| v + 1).boxed(),
      ],
    };
    let recorder = Recorder::new();
    for source in pipelines.sources {
      source.subscribe_observer(recorder.clone());
    }
    assert_eq!(recorder.values(), vec![1, 3, 6]);
    assert_eq!(recorder.completed(), 2);
  }

  #[test]
  fn cloneable_box_resubscribes() {
    let source = observable::from_iter(["x", "y"]).boxed_clone();
    let first = source.clone().as_blocking().to_vec().unwrap();
    let second = source.as_blocking().to_vec().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec!["x", "y"]);
  }

  #[test]
  fn unsubscribe_through_the_box() {
    let subject = PublishSubject::<i32>::new();
    let subscription = subject.observable().boxed().subscribe(|_| {});
    assert!(subject.has_observers());
    subscription.dispose();
    assert!(!subject.has_observers());
  }
}
