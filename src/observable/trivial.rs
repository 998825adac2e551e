use std::marker::PhantomData;

use super::Observable;
use crate::{error::RxError, observer::Observer};

/// Completes right away without emitting.
pub fn empty<Item>() -> Empty<Item> { Empty(PhantomData) }

/// Never emits and never terminates.
pub fn never<Item>() -> Never<Item> { Never(PhantomData) }

/// Errors right away with `err`.
pub fn throw_err<Item>(err: RxError) -> ThrowErr<Item> { ThrowErr { err, _item: PhantomData } }

pub struct Empty<Item>(PhantomData<fn() -> Item>);

pub struct Never<Item>(PhantomData<fn() -> Item>);

pub struct ThrowErr<Item> {
  err: RxError,
  _item: PhantomData<fn() -> Item>,
}

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Self(PhantomData) }
}

impl<Item> Clone for Never<Item> {
  fn clone(&self) -> Self { Self(PhantomData) }
}

impl<Item> Clone for ThrowErr<Item> {
  fn clone(&self) -> Self { Self { err: self.err.clone(), _item: PhantomData } }
}

impl<Item> Observable for Empty<Item> {
  type Item = Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    observer.complete()
  }
}

impl<Item> Observable for Never<Item> {
  type Item = Item;

  fn subscribe_with<O>(self, _observer: O)
  where
    O: Observer<Item> + 'static,
  {
  }
}

impl<Item> Observable for ThrowErr<Item> {
  type Item = Item;

  fn subscribe_with<O>(self, observer: O)
  where
    O: Observer<Item> + 'static,
  {
    observer.error(self.err)
  }
}
