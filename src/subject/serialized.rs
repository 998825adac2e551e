use std::sync::Arc;

use parking_lot::Mutex;

use super::{History, NoHistory, PublishSubject, Subject, SubjectObservable};
use crate::{disposable::Disposable, error::RxError, observer::Observer};

/// A [`Subject`] whose writes are serialized.
///
/// A plain subject may be written from several threads at once, and then two
/// subscribers can see two concurrent values in different orders. Here every
/// write holds one writer lock for the whole broadcast, so all subscribers see
/// one total order. A subscriber writing back into the same subject from its
/// callback deadlocks.
pub struct SerializedSubject<Item, H = NoHistory> {
  subject: Subject<Item, H>,
  writer: Arc<Mutex<()>>,
}

impl<Item, H> Clone for SerializedSubject<Item, H> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone(), writer: self.writer.clone() } }
}

impl<Item> SerializedSubject<Item, NoHistory>
where
  Item: Clone + Send + 'static,
{
  pub fn new() -> Self { Self::from_subject(PublishSubject::new()) }
}

impl<Item> Default for SerializedSubject<Item, NoHistory>
where
  Item: Clone + Send + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item, H> SerializedSubject<Item, H>
where
  Item: Clone + Send + 'static,
  H: History<Item>,
{
  /// Serializes the writes of `subject`. Writes made through other clones of
  /// `subject` bypass the lock.
  pub fn from_subject(subject: Subject<Item, H>) -> Self {
    Self { subject, writer: Arc::new(Mutex::new(())) }
  }

  pub fn next(&self, value: Item) {
    let _writer = self.writer.lock();
    self.subject.next(value);
  }

  pub fn error(&self, err: RxError) {
    let _writer = self.writer.lock();
    self.subject.error(err);
  }

  pub fn complete(&self) {
    let _writer = self.writer.lock();
    self.subject.complete();
  }

  pub fn observer(&self) -> SerializedObserver<Item, H> { SerializedObserver(self.clone()) }

  pub fn observable(&self) -> SubjectObservable<Item, H> { self.subject.observable() }

  pub fn disposable(&self) -> Disposable { self.subject.disposable() }

  pub fn has_observers(&self) -> bool { self.subject.has_observers() }

  pub fn observer_count(&self) -> usize { self.subject.observer_count() }

  pub fn is_terminated(&self) -> bool { self.subject.is_terminated() }
}

/// The writer side of a [`SerializedSubject`].
pub struct SerializedObserver<Item, H>(SerializedSubject<Item, H>);

impl<Item, H> Observer<Item> for SerializedObserver<Item, H>
where
  Item: Clone + Send + 'static,
  H: History<Item>,
{
  fn next(&mut self, value: Item) { self.0.next(value) }

  fn error(self, err: RxError) { self.0.error(err) }

  fn complete(self) { self.0.complete() }

  fn set_upstream(&mut self, upstream: Disposable) { self.0.subject.state.add_upstream(upstream) }

  fn is_disposed(&self) -> bool { self.0.subject.state.is_disposed() }
}
