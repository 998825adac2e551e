use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
  thread::JoinHandle,
};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error};

use super::{
  queue::{run_job, TimedQueue},
  Instant, Job, NonTrampoline, Scheduler, Worker, WorkerStrategy,
};
use crate::{
  disposable::Disposable,
  error::{RxError, RxResult},
};

static THREAD_ID: AtomicUsize = AtomicUsize::new(0);

/// Gives every worker its own thread.
///
/// The thread starts with the first scheduled task. It exits when the
/// worker's disposable is disposed (dropping whatever is still queued), or
/// once every handle to the worker is gone and the queue has drained.
#[derive(Clone, Debug)]
pub struct NewThreadScheduler {
  name: Arc<str>,
}

impl NewThreadScheduler {
  pub fn new() -> Self { Self::named("rxplus-worker") }

  /// Threads are named `<prefix>-<n>`.
  pub fn named(prefix: impl Into<Arc<str>>) -> Self { Self { name: prefix.into() } }
}

impl Default for NewThreadScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for NewThreadScheduler {
  fn create_worker(&self) -> Worker {
    let name = format!("{}-{}", self.name, THREAD_ID.fetch_add(1, Ordering::Relaxed));
    Worker::new(NewThreadStrategy { event_loop: EventLoop::new(name), owner: true })
  }
}

impl NonTrampoline for NewThreadScheduler {}

/// Queue and wake-up signal shared between a worker thread and its handles.
pub(crate) struct EventLoop {
  name: String,
  state: Mutex<LoopState>,
  wakeup: Condvar,
}

#[derive(Default)]
struct LoopState {
  queue: TimedQueue,
  started: bool,
  /// Drop queued work and exit.
  disposed: bool,
  /// Exit once the queue is empty.
  shutdown: bool,
}

impl EventLoop {
  pub(crate) fn new(name: String) -> Arc<Self> {
    Arc::new(Self { name, state: Mutex::new(LoopState::default()), wakeup: Condvar::new() })
  }

  /// Spawns the thread draining this loop.
  pub(crate) fn spawn(self: &Arc<Self>) -> RxResult<JoinHandle<()>> {
    let this = self.clone();
    std::thread::Builder::new()
      .name(self.name.clone())
      .spawn(move || this.run())
      .map_err(|err| {
        error!(thread = %self.name, %err, "failed to spawn worker thread");
        RxError::from(err)
      })
  }

  pub(crate) fn push(self: &Arc<Self>, at: Instant, job: Job, lazy_start: bool) -> RxResult<()> {
    let mut state = self.state.lock();
    if state.disposed {
      return Ok(());
    }
    if state.shutdown && !lazy_start {
      return Err(RxError::NoActiveLoop);
    }
    state.queue.push(at, job);
    let swept = state.queue.sweep();
    if lazy_start && !state.started {
      state.started = true;
      drop(state);
      drop(swept);
      // The loop owns itself while running, the handle is not needed.
      self.spawn().map(drop).map_err(|err| {
        self.dispose();
        err
      })
    } else {
      drop(state);
      drop(swept);
      self.wakeup.notify_one();
      Ok(())
    }
  }

  pub(crate) fn dispose(&self) {
    let leftover = {
      let mut state = self.state.lock();
      state.disposed = true;
      std::mem::take(&mut state.queue)
    };
    self.wakeup.notify_all();
    drop(leftover);
  }

  pub(crate) fn shutdown(&self) {
    self.state.lock().shutdown = true;
    self.wakeup.notify_all();
  }

  pub(crate) fn is_disposed(&self) -> bool { self.state.lock().disposed }

  fn run(&self) {
    debug!(thread = %self.name, "worker thread started");
    let mut state = self.state.lock();
    loop {
      if state.disposed {
        break;
      }
      let Some(at) = state.queue.peek_time() else {
        if state.shutdown {
          break;
        }
        self.wakeup.wait(&mut state);
        continue;
      };
      if at > Instant::now() {
        self.wakeup.wait_until(&mut state, at);
        continue;
      }
      let Some((at, job)) = state.queue.pop() else { continue };
      // Run and drop the job unlocked: dropping it may release the last
      // handle of this very loop.
      let requeue = MutexGuard::unlocked(&mut state, move || run_job(at, job));
      if let Some((at, job)) = requeue {
        if state.disposed {
          MutexGuard::unlocked(&mut state, move || drop(job));
        } else {
          state.queue.push(at, job);
        }
      }
    }
    let leftover = std::mem::take(&mut state.queue);
    drop(state);
    drop(leftover);
    debug!(thread = %self.name, "worker thread stopped");
  }
}

struct NewThreadStrategy {
  event_loop: Arc<EventLoop>,
  owner: bool,
}

impl WorkerStrategy for NewThreadStrategy {
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()> {
    self.event_loop.push(at, job, self.owner)
  }

  fn disposable(&self) -> Option<Disposable> {
    let event_loop = self.event_loop.clone();
    Some(Disposable::from_fn(move || event_loop.dispose()))
  }
}

impl Drop for NewThreadStrategy {
  fn drop(&mut self) {
    if self.owner {
      self.event_loop.shutdown();
    }
  }
}
