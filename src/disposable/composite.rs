use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::{Disposable, DisposableLike};

/// Children are compacted once the list grows past this many entries.
const COMPACT_THRESHOLD: usize = 8;

type Teardown = Box<dyn FnOnce() + Send>;

/// A node of the disposable tree owning an ordered list of children.
///
/// The disposed flag only flips while the children lock is held, so an `add`
/// racing a `dispose` either lands before the dispose or finds the node
/// disposed and disposes the child. Children are disposed after the lock is
/// released, so a child may touch this node while it is being disposed.
#[derive(Clone, Default)]
pub struct CompositeDisposable(Arc<CompositeInner>);

#[derive(Default)]
struct CompositeInner {
  disposed: AtomicBool,
  children: Mutex<SmallVec<[Disposable; 2]>>,
  teardown: Mutex<Option<Teardown>>,
}

impl CompositeDisposable {
  pub fn new() -> Self { Self::default() }

  /// A node that runs `teardown` before disposing its children.
  pub fn with_teardown(teardown: impl FnOnce() + Send + 'static) -> Self {
    let this = Self::default();
    *this.0.teardown.lock() = Some(Box::new(teardown));
    this
  }

  /// Adds a child.
  ///
  /// Empty, already disposed or self children are ignored. When this node is
  /// already disposed the child is disposed immediately.
  pub fn add(&self, child: Disposable) {
    if child.is_disposed() || child.points_to(self.node()) {
      return;
    }
    let mut children = self.0.children.lock();
    if self.0.is_disposed() {
      drop(children);
      child.dispose();
      return;
    }
    if children.len() >= COMPACT_THRESHOLD {
      children.retain(|c| !c.is_disposed());
    }
    children.push(child);
  }

  /// Detaches `child` without disposing it.
  pub fn remove(&self, child: &Disposable) { self.0.children.lock().retain(|c| !c.ptr_eq(child)) }

  /// Disposes and drops all children but keeps this node active.
  pub fn clear(&self) {
    let children = std::mem::take(&mut *self.0.children.lock());
    children.iter().for_each(Disposable::dispose);
  }

  pub fn len(&self) -> usize { self.0.children.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  #[inline]
  pub fn dispose(&self) { self.0.dispose() }

  #[inline]
  pub fn is_disposed(&self) -> bool { self.0.is_disposed() }

  fn node(&self) -> *const () { Arc::as_ptr(&self.0) as *const () }
}

impl DisposableLike for CompositeInner {
  fn dispose(&self) {
    let children = {
      let mut children = self.children.lock();
      if self.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      std::mem::take(&mut *children)
    };

    let teardown = self.teardown.lock().take();
    if let Some(teardown) = teardown {
      teardown();
    }
    children.iter().for_each(Disposable::dispose);
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

impl DisposableLike for CompositeDisposable {
  #[inline]
  fn dispose(&self) { self.0.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

impl From<CompositeDisposable> for Disposable {
  fn from(composite: CompositeDisposable) -> Self { Disposable::from_arc(composite.0) }
}

impl Debug for CompositeDisposable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompositeDisposable")
      .field("is_disposed", &self.is_disposed())
      .field("len", &self.len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;

  fn counted(hits: &Arc<AtomicUsize>) -> Disposable {
    let hits = hits.clone();
    Disposable::from_fn(move || {
      hits.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[test]
  fn dispose_is_idempotent() {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    let node = CompositeDisposable::with_teardown(move || {
      c_hits.fetch_add(10, Ordering::SeqCst);
    });
    node.add(counted(&hits));
    node.add(counted(&hits));

    node.dispose();
    node.dispose();
    assert!(node.is_disposed());
    assert_eq!(hits.load(Ordering::SeqCst), 12);
  }

  #[test]
  fn orphan_is_disposed_on_add() {
    let hits = Arc::new(AtomicUsize::new(0));
    let node = CompositeDisposable::new();
    node.dispose();

    let child = counted(&hits);
    node.add(child.clone());
    assert!(child.is_disposed());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(node.len(), 0);
  }

  #[test]
  fn ignores_self_empty_and_disposed_children() {
    let node = CompositeDisposable::new();
    node.add(node.clone().into());
    node.add(Disposable::empty());
    let done = Disposable::from_fn(|| {});
    done.dispose();
    node.add(done);
    assert_eq!(node.len(), 0);
    assert!(!node.is_disposed());
  }

  #[test]
  fn remove_detaches_without_dispose() {
    let hits = Arc::new(AtomicUsize::new(0));
    let node = CompositeDisposable::new();
    let child = counted(&hits);
    node.add(child.clone());
    node.remove(&child);
    node.dispose();
    assert!(!child.is_disposed());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn clear_keeps_node_active() {
    let hits = Arc::new(AtomicUsize::new(0));
    let node = CompositeDisposable::new();
    node.add(counted(&hits));
    node.clear();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!node.is_disposed());
    node.add(counted(&hits));
    assert_eq!(node.len(), 1);
  }

  #[test]
  fn nested_nodes_dispose_down_the_tree() {
    let hits = Arc::new(AtomicUsize::new(0));
    let root = CompositeDisposable::new();
    let inner = CompositeDisposable::new();
    inner.add(counted(&hits));
    root.add(inner.clone().into());
    root.dispose();
    assert!(inner.is_disposed());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn child_may_touch_the_node_while_it_is_disposed() {
    let hits = Arc::new(AtomicUsize::new(0));
    let node = CompositeDisposable::new();
    let late = counted(&hits);
    let (c_node, c_late) = (node.clone(), late.clone());
    node.add(Disposable::from_fn(move || {
      assert!(c_node.is_disposed());
      c_node.add(c_late);
    }));
    node.dispose();
    assert!(late.is_disposed());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(node.len(), 0);
  }

  #[test]
  fn concurrent_add_and_dispose_never_leak() {
    for _ in 0..50 {
      let hits = Arc::new(AtomicUsize::new(0));
      let node = CompositeDisposable::new();
      let adders: Vec<_> = (0..4)
        .map(|_| {
          let node = node.clone();
          let hits = hits.clone();
          std::thread::spawn(move || {
            for _ in 0..25 {
              node.add(counted(&hits));
            }
          })
        })
        .collect();
      node.dispose();
      adders.into_iter().for_each(|h| h.join().unwrap());
      assert_eq!(hits.load(Ordering::SeqCst), 100);
    }
  }
}
