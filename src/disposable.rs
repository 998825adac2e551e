//! Disposable ownership tree.
//!
//! Every subscription owns a [`Disposable`] node. Disposing a node runs its
//! teardown exactly once and disposes every child; a child added to a node
//! that is already disposed is disposed on the spot instead of being stored.
//!
//! | Type | Role |
//! |------|------|
//! | [`CompositeDisposable`] | Node with children and an optional teardown |
//! | [`CallbackDisposable`] | Leaf that runs a closure once |
//! | [`RefCountDisposable`] | Disposes its target when the last reference goes |
//! | [`FixedDisposables`] | Fixed-capacity group, errors when overfilled |
//! | [`DisposableGuard`] | Disposes on drop |

use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

mod callback;
mod composite;
mod fixed;
mod refcount;

pub use callback::CallbackDisposable;
pub use composite::CompositeDisposable;
pub use fixed::FixedDisposables;
pub use refcount::RefCountDisposable;

/// Anything that can be disposed.
///
/// `dispose` must be idempotent and callable from any thread.
pub trait DisposableLike: Send + Sync {
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

/// A cloneable, type-erased handle to a node of the disposable tree.
///
/// Clones share the node: disposing one clone disposes them all. The empty
/// handle behaves as an already-disposed node.
#[derive(Clone, Default)]
pub struct Disposable(Option<Arc<dyn DisposableLike>>);

impl Disposable {
  /// A handle to nothing. It reports itself as disposed.
  pub fn empty() -> Self { Self(None) }

  pub fn new(inner: impl DisposableLike + 'static) -> Self { Self(Some(Arc::new(inner))) }

  pub fn from_arc(inner: Arc<dyn DisposableLike>) -> Self { Self(Some(inner)) }

  /// A leaf that runs `teardown` on first dispose.
  pub fn from_fn(teardown: impl FnOnce() + Send + 'static) -> Self {
    Self::new(CallbackDisposable::new(teardown))
  }

  #[inline]
  pub fn dispose(&self) {
    if let Some(inner) = &self.0 {
      inner.dispose();
    }
  }

  #[inline]
  pub fn is_disposed(&self) -> bool { self.0.as_ref().map_or(true, |inner| inner.is_disposed()) }

  /// Whether both handles point at the same node.
  pub fn ptr_eq(&self, other: &Disposable) -> bool {
    match (&self.0, &other.0) {
      (Some(a), Some(b)) => same_node(a, b),
      _ => false,
    }
  }

  /// Wraps the handle so the node is disposed when the guard drops.
  pub fn into_guard(self) -> DisposableGuard { DisposableGuard(self) }

  pub(crate) fn points_to(&self, node: *const ()) -> bool {
    self.0.as_ref().map_or(false, |inner| Arc::as_ptr(inner) as *const () == node)
  }
}

fn same_node(a: &Arc<dyn DisposableLike>, b: &Arc<dyn DisposableLike>) -> bool {
  Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

impl DisposableLike for Disposable {
  #[inline]
  fn dispose(&self) { Disposable::dispose(self) }

  #[inline]
  fn is_disposed(&self) -> bool { Disposable::is_disposed(self) }
}

impl Debug for Disposable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Disposable")
      .field("is_disposed", &self.is_disposed())
      .finish()
  }
}

/// Disposes the wrapped node when dropped.
#[must_use = "dropping the guard disposes the subscription immediately"]
pub struct DisposableGuard(Disposable);

impl DisposableGuard {
  pub fn new(disposable: Disposable) -> Self { Self(disposable) }

  pub fn disposable(&self) -> &Disposable { &self.0 }

  /// Gives up the guard without disposing.
  pub fn release(mut self) -> Disposable { std::mem::take(&mut self.0) }
}

impl Drop for DisposableGuard {
  fn drop(&mut self) { self.0.dispose(); }
}
