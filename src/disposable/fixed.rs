use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{Disposable, DisposableLike};
use crate::error::{RxError, RxResult};

/// A group of at most `N` disposables, stored inline.
///
/// Used where the number of resources is known up front. Pushing more than
/// `N` is a programming error reported as
/// [`RxError::MoreDisposablesThanExpected`].
pub struct FixedDisposables<const N: usize> {
  disposed: AtomicBool,
  items: Mutex<SmallVec<[Disposable; N]>>,
}

impl<const N: usize> FixedDisposables<N> {
  pub fn new() -> Self {
    Self { disposed: AtomicBool::new(false), items: Mutex::new(SmallVec::new()) }
  }

  pub fn push(&self, item: Disposable) -> RxResult<()> {
    let mut items = self.items.lock();
    if self.is_disposed() {
      drop(items);
      item.dispose();
      return Ok(());
    }
    if items.len() == N {
      return Err(RxError::MoreDisposablesThanExpected);
    }
    items.push(item);
    Ok(())
  }

  pub fn len(&self) -> usize { self.items.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<const N: usize> Default for FixedDisposables<N> {
  fn default() -> Self { Self::new() }
}

impl<const N: usize> DisposableLike for FixedDisposables<N> {
  fn dispose(&self) {
    let items = {
      let mut items = self.items.lock();
      if self.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      std::mem::take(&mut *items)
    };
    items.iter().for_each(Disposable::dispose);
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
