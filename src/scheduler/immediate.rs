use super::{
  queue::{run_job, sleep_until},
  Instant, Job, NonTrampoline, Scheduler, Worker, WorkerStrategy,
};
use crate::error::RxResult;

/// Runs every task inline, on the thread that schedules it.
///
/// A task scheduled for a later instant blocks the caller until then. A task
/// asking to run again keeps the caller busy until it finishes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

struct ImmediateStrategy;

impl WorkerStrategy for ImmediateStrategy {
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()> {
    let mut next = Some((at, job));
    while let Some((at, job)) = next {
      if job.is_cancelled() {
        break;
      }
      sleep_until(at);
      next = run_job(at, job);
    }
    Ok(())
  }
}

impl Scheduler for ImmediateScheduler {
  fn create_worker(&self) -> Worker { Worker::new(ImmediateStrategy) }
}

impl NonTrampoline for ImmediateScheduler {}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;
  use crate::scheduler::{Duration, Schedulable, TaskState};

  #[test]
  fn runs_before_returning() {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    let worker = ImmediateScheduler.create_worker();
    worker
      .schedule(Schedulable::new(move || {
        if c_hits.fetch_add(1, Ordering::SeqCst) < 2 {
          TaskState::Sleeping(Duration::from_millis(1))
        } else {
          TaskState::Finished
        }
      }))
      .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn waits_for_the_requested_instant() {
    let worker = ImmediateScheduler.create_worker();
    let start = Instant::now();
    worker.schedule_after(Duration::from_millis(20), Schedulable::once(|| {})).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(20));
  }
}
