use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::DisposableLike;

type Teardown = Box<dyn FnOnce() + Send>;

/// A leaf disposable running a closure on the first `dispose`.
pub struct CallbackDisposable {
  disposed: AtomicBool,
  teardown: Mutex<Option<Teardown>>,
}

impl CallbackDisposable {
  pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
    Self {
      disposed: AtomicBool::new(false),
      teardown: Mutex::new(Some(Box::new(teardown))),
    }
  }
}

impl DisposableLike for CallbackDisposable {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    // Take it out first, the teardown may touch other disposables.
    let teardown = self.teardown.lock().take();
    if let Some(teardown) = teardown {
      teardown();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
