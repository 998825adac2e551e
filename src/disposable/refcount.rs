use std::sync::{
  atomic::{AtomicBool, AtomicUsize, Ordering},
  Arc,
};

use super::{Disposable, DisposableLike};

/// Disposes its target once every reference has been released.
///
/// The count starts at one. Each [`add_ref`](Self::add_ref) takes another
/// reference and each `dispose` on this handle releases one, so after `N`
/// calls to `add_ref` it takes `N + 1` releases before the target goes.
#[derive(Clone)]
pub struct RefCountDisposable(Arc<RefCountInner>);

struct RefCountInner {
  refs: AtomicUsize,
  target: Disposable,
}

impl RefCountDisposable {
  pub fn new(target: Disposable) -> Self {
    Self(Arc::new(RefCountInner { refs: AtomicUsize::new(1), target }))
  }

  /// Takes one more reference.
  ///
  /// The returned handle releases that reference on its first dispose. Once
  /// the target is gone an empty handle is returned instead.
  pub fn add_ref(&self) -> Disposable {
    let mut refs = self.0.refs.load(Ordering::Acquire);
    loop {
      if refs == 0 {
        return Disposable::empty();
      }
      match self
        .0
        .refs
        .compare_exchange_weak(refs, refs + 1, Ordering::AcqRel, Ordering::Acquire)
      {
        Ok(_) => break,
        Err(actual) => refs = actual,
      }
    }
    Disposable::new(RefHandle { owner: self.0.clone(), released: AtomicBool::new(false) })
  }

  /// Number of references still held.
  pub fn ref_count(&self) -> usize { self.0.refs.load(Ordering::Acquire) }
}

impl RefCountInner {
  fn release(&self) {
    let mut refs = self.refs.load(Ordering::Acquire);
    loop {
      if refs == 0 {
        return;
      }
      match self
        .refs
        .compare_exchange_weak(refs, refs - 1, Ordering::AcqRel, Ordering::Acquire)
      {
        Ok(_) => break,
        Err(actual) => refs = actual,
      }
    }
    if refs == 1 {
      self.target.dispose();
    }
  }
}

impl DisposableLike for RefCountDisposable {
  #[inline]
  fn dispose(&self) { self.0.release() }

  fn is_disposed(&self) -> bool {
    self.0.refs.load(Ordering::Acquire) == 0 || self.0.target.is_disposed()
  }
}

struct RefHandle {
  owner: Arc<RefCountInner>,
  released: AtomicBool,
}

impl DisposableLike for RefHandle {
  fn dispose(&self) {
    if !self.released.swap(true, Ordering::AcqRel) {
      self.owner.release();
    }
  }

  fn is_disposed(&self) -> bool {
    self.released.load(Ordering::Acquire) || self.owner.target.is_disposed()
  }
}
