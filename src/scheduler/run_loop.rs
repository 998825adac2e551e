use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::{
  queue::{run_job, TimedQueue},
  Instant, Job, NonTrampoline, Scheduler, Worker, WorkerStrategy,
};
use crate::error::{RxError, RxResult};

/// A queue drained by the host.
///
/// Nothing runs until the owner calls [`dispatch`](Self::dispatch) or
/// [`dispatch_if_ready`](Self::dispatch_if_ready), which makes it the bridge to
/// an existing event loop (a UI main thread, a game tick). Workers keep only a
/// weak reference: once every loop handle is dropped, or after
/// [`dispose`](Self::dispose), scheduling fails with [`RxError::NoActiveLoop`].
#[derive(Clone, Default)]
pub struct RunLoopScheduler(Arc<RunLoop>);

#[derive(Default)]
struct RunLoop {
  state: Mutex<RunLoopState>,
  ready: Condvar,
}

#[derive(Default)]
struct RunLoopState {
  queue: TimedQueue,
  disposed: bool,
}

impl RunLoopScheduler {
  pub fn new() -> Self { Self::default() }

  /// Whether no live task is queued. Tasks of disposed subscriptions are
  /// dropped here.
  pub fn is_empty(&self) -> bool {
    let dead = self.0.state.lock().queue.purge();
    drop(dead);
    self.0.state.lock().queue.is_empty()
  }

  /// Whether the head of the queue is due now.
  pub fn is_any_ready(&self) -> bool {
    self
      .0
      .state
      .lock()
      .queue
      .peek_time()
      .map_or(false, |at| at <= Instant::now())
  }

  /// Runs one due task if there is one, without blocking.
  pub fn dispatch_if_ready(&self) -> bool {
    let next = self.0.state.lock().queue.pop_ready(Instant::now());
    match next {
      Some((at, job)) => {
        self.run(at, job);
        true
      }
      None => false,
    }
  }

  /// Blocks until a task is due, then runs it.
  ///
  /// Returns `false` without running anything once the loop is disposed.
  pub fn dispatch(&self) -> bool {
    let mut state = self.0.state.lock();
    loop {
      if state.disposed {
        return false;
      }
      match state.queue.peek_time() {
        None => {
          self.0.ready.wait(&mut state);
        }
        Some(at) if at > Instant::now() => {
          self.0.ready.wait_until(&mut state, at);
        }
        Some(_) => break,
      }
    }
    let Some((at, job)) = state.queue.pop() else { return false };
    drop(state);
    self.run(at, job);
    true
  }

  /// Stops the loop and drops everything still queued.
  pub fn dispose(&self) {
    let leftover = {
      let mut state = self.0.state.lock();
      state.disposed = true;
      std::mem::take(&mut state.queue)
    };
    self.0.ready.notify_all();
    debug!(dropped = leftover.len(), "run loop disposed");
  }

  fn run(&self, at: Instant, job: Job) {
    if let Some((at, job)) = run_job(at, job) {
      let mut state = self.0.state.lock();
      if !state.disposed {
        state.queue.push(at, job);
      }
    }
  }
}

struct RunLoopStrategy(Weak<RunLoop>);

impl WorkerStrategy for RunLoopStrategy {
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()> {
    let run_loop = self.0.upgrade().ok_or(RxError::NoActiveLoop)?;
    let mut state = run_loop.state.lock();
    if state.disposed {
      return Err(RxError::NoActiveLoop);
    }
    state.queue.push(at, job);
    let swept = state.queue.sweep();
    drop(state);
    drop(swept);
    run_loop.ready.notify_one();
    Ok(())
  }
}

impl Scheduler for RunLoopScheduler {
  fn create_worker(&self) -> Worker { Worker::new(RunLoopStrategy(Arc::downgrade(&self.0))) }
}

impl NonTrampoline for RunLoopScheduler {}
