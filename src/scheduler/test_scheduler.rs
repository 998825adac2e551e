//! Virtual-time scheduler for deterministic tests of time-based operators.
//!
//! Time only moves when the test says so:
//!
//! ```rust
//! use rxplus::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let scheduler = TestScheduler::new();
//! let got = Arc::new(Mutex::new(vec![]));
//! let c_got = got.clone();
//!
//! observable::of(42)
//!   .delay(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(move |v| c_got.lock().unwrap().push(v));
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(got.lock().unwrap().is_empty());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(*got.lock().unwrap(), vec![42]);
//! ```
//!
//! Clones share one clock and one queue, and every worker created from them
//! feeds that queue.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{
  queue::{run_job, TimedQueue},
  Duration, Instant, Job, NonTrampoline, Scheduler, Worker, WorkerStrategy,
};
use crate::error::RxResult;

#[derive(Clone)]
pub struct TestScheduler(Arc<TestClock>);

struct TestClock {
  origin: Instant,
  state: Mutex<ClockState>,
}

#[derive(Default)]
struct ClockState {
  elapsed: Duration,
  queue: TimedQueue,
}

impl TestScheduler {
  pub fn new() -> Self {
    Self(Arc::new(TestClock { origin: Instant::now(), state: Mutex::new(ClockState::default()) }))
  }

  /// Virtual time elapsed since creation.
  pub fn elapsed(&self) -> Duration { self.0.state.lock().elapsed }

  pub fn now(&self) -> Instant { self.0.now() }

  /// Number of queued tasks still able to run. Tasks of disposed
  /// subscriptions are dropped here.
  pub fn pending_count(&self) -> usize {
    let dead = self.0.state.lock().queue.purge();
    drop(dead);
    self.0.state.lock().queue.len()
  }

  /// Moves the clock forward by `delta`, running every task that falls due on
  /// the way, in time order.
  pub fn advance_by(&self, delta: Duration) { self.advance_to(self.now() + delta) }

  /// Moves the clock to `target`, running every task due up to it.
  pub fn advance_to(&self, target: Instant) {
    while self.run_next(Some(target)) {}
    let mut state = self.0.state.lock();
    let target = target.saturating_duration_since(self.0.origin);
    if target > state.elapsed {
      state.elapsed = target;
    }
  }

  /// Runs tasks until the queue is empty, jumping the clock to each one.
  ///
  /// Never returns while a periodic task keeps rescheduling itself.
  pub fn flush(&self) { while self.run_next(None) {} }

  fn run_next(&self, limit: Option<Instant>) -> bool {
    let next = {
      let mut state = self.0.state.lock();
      let next = match limit {
        Some(limit) => state.queue.pop_ready(limit),
        None => state.queue.pop(),
      };
      if let Some((at, _)) = &next {
        let at = at.saturating_duration_since(self.0.origin);
        if at > state.elapsed {
          state.elapsed = at;
        }
      }
      next
    };
    match next {
      Some((at, job)) => {
        if let Some((at, job)) = run_job(at, job) {
          self.0.state.lock().queue.push(at, job);
        }
        true
      }
      None => false,
    }
  }
}

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl TestClock {
  fn now(&self) -> Instant { self.origin + self.state.lock().elapsed }
}

struct TestStrategy(Arc<TestClock>);

impl WorkerStrategy for TestStrategy {
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()> {
    let swept = {
      let mut state = self.0.state.lock();
      state.queue.push(at, job);
      state.queue.sweep()
    };
    drop(swept);
    Ok(())
  }

  fn now(&self) -> Instant { self.0.now() }
}

impl Scheduler for TestScheduler {
  fn create_worker(&self) -> Worker { Worker::new(TestStrategy(self.0.clone())) }
}

impl NonTrampoline for TestScheduler {}

#[cfg(test)]
mod tests {
  use std::sync::Mutex as StdMutex;

  use super::*;
  use crate::scheduler::{Schedulable, TaskState};

  #[test]
  fn runs_in_time_order_when_advanced() {
    let scheduler = TestScheduler::new();
    let worker = scheduler.create_worker();
    let log = Arc::new(StdMutex::new(vec![]));
    for at in [5u64, 1, 3] {
      let log = log.clone();
      worker
        .schedule_after(
          Duration::from_secs(at),
          Schedulable::once(move || log.lock().unwrap().push(at)),
        )
        .unwrap();
    }
    scheduler.advance_by(Duration::from_secs(2));
    assert_eq!(*log.lock().unwrap(), vec![1]);
    scheduler.advance_by(Duration::from_secs(3));
    assert_eq!(*log.lock().unwrap(), vec![1, 3, 5]);
    assert_eq!(scheduler.elapsed(), Duration::from_secs(5));
  }

  #[test]
  fn tasks_observe_virtual_now() {
    let scheduler = TestScheduler::new();
    let worker = scheduler.create_worker();
    let seen = Arc::new(StdMutex::new(vec![]));
    let c_seen = seen.clone();
    let c_scheduler = scheduler.clone();
    let mut runs = 0;
    worker
      .schedule_after(
        Duration::from_millis(10),
        Schedulable::new(move || {
          c_seen.lock().unwrap().push(c_scheduler.elapsed());
          runs += 1;
          if runs < 3 { TaskState::Sleeping(Duration::from_millis(10)) } else { TaskState::Finished }
        }),
      )
      .unwrap();
    scheduler.flush();
    assert_eq!(
      *seen.lock().unwrap(),
      vec![Duration::from_millis(10), Duration::from_millis(20), Duration::from_millis(30)]
    );
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn disposed_subscriptions_leave_nothing_pending() {
    use crate::observable::{self, ObservableExt};

    let scheduler = TestScheduler::new();
    for _ in 0..1000 {
      observable::of(1).timeout(Duration::from_secs(3600), scheduler.clone()).subscribe(|_| {});
      observable::never::<i32>()
        .timeout(Duration::from_secs(3600), scheduler.clone())
        .subscribe(|_| {})
        .dispose();
    }
    assert_eq!(scheduler.pending_count(), 0);
    assert!(scheduler.0.state.lock().queue.heap_len() < 128);
  }
}
