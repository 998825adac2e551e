use std::cell::{Cell, RefCell};

use super::{
  queue::{run_job, sleep_until, TimedQueue},
  Instant, Job, Scheduler, Worker, WorkerStrategy,
};
use crate::error::RxResult;

thread_local! {
  static QUEUE: RefCell<TimedQueue> = RefCell::new(TimedQueue::default());
  static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Queues tasks on the current thread.
///
/// The first schedule on a thread owns the thread's queue and drains it before
/// returning. Tasks scheduled while draining, from any nesting depth, are
/// queued and run by that same loop, so recursion depth stays constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrampolineScheduler;

impl TrampolineScheduler {
  /// Whether the current thread is draining its trampoline queue.
  pub fn is_draining() -> bool { DRAINING.with(Cell::get) }
}

struct TrampolineStrategy;

/// Releases ownership of the queue, also when a task panics.
struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) {
    if std::thread::panicking() {
      let leftover = QUEUE.with(|q| std::mem::take(&mut *q.borrow_mut()));
      drop(leftover);
    }
    DRAINING.with(|d| d.set(false));
  }
}

impl WorkerStrategy for TrampolineStrategy {
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()> {
    QUEUE.with(|q| q.borrow_mut().push(at, job));
    if DRAINING.with(|d| d.replace(true)) {
      return Ok(());
    }

    let _guard = DrainGuard;
    loop {
      // Never hold the borrow while a task runs, it may schedule more work.
      let Some((at, job)) = QUEUE.with(|q| q.borrow_mut().pop()) else {
        break;
      };
      if job.is_cancelled() {
        continue;
      }
      sleep_until(at);
      if let Some((at, job)) = run_job(at, job) {
        QUEUE.with(|q| q.borrow_mut().push(at, job));
      }
    }
    Ok(())
  }
}

impl Scheduler for TrampolineScheduler {
  fn create_worker(&self) -> Worker { Worker::new(TrampolineStrategy) }
}
