use std::sync::Arc;

use parking_lot::Mutex;

use super::Operator;
use crate::{
  disposable::Disposable,
  error::RxError,
  observer::{Observer, SharedObserver},
  scheduler::{guarded_worker, Duration, Instant, Schedulable, Scheduler, TaskState, Worker},
};

/// Fails with [`RxError::Timeout`] when no value arrives within `period` of
/// subscribing or of the previous value.
///
/// The pipeline races a self-rescheduling check on the scheduler. Whichever
/// terminates first wins, and the terminal event disposes the other.
#[derive(Clone)]
pub struct TimeoutOp<Sch> {
  pub(crate) period: Duration,
  pub(crate) scheduler: Sch,
}

pub struct TimeoutObserver<O> {
  downstream: SharedObserver<O>,
  clock: Option<(Worker, Arc<Mutex<Instant>>)>,
}

impl<Item, Sch> Operator<Item> for TimeoutOp<Sch>
where
  Item: Send + 'static,
  Sch: Scheduler,
{
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    let downstream = SharedObserver::new(downstream);
    let (worker, guard) = match guarded_worker(&self.scheduler) {
      Ok(worker) => worker,
      Err(err) => {
        downstream.on_error::<Item>(err);
        return TimeoutObserver { downstream, clock: None };
      }
    };
    downstream.add_upstream::<Item>(guard);

    let period = self.period;
    let start = worker.now();
    let last_seen = Arc::new(Mutex::new(start));
    let c_last_seen = last_seen.clone();
    let c_downstream = downstream.clone();
    let mut due = start + period;
    let check = Schedulable::new(move || {
      let deadline = *c_last_seen.lock() + period;
      if deadline <= due {
        c_downstream.on_error::<Item>(RxError::Timeout);
        TaskState::Finished
      } else {
        let wait = deadline - due;
        due = deadline;
        TaskState::Sleeping(wait)
      }
    });
    if let Err(err) = worker.schedule_at(start + period, check) {
      downstream.on_error::<Item>(err);
    }
    TimeoutObserver { downstream, clock: Some((worker, last_seen)) }
  }
}

impl<Item, O> Observer<Item> for TimeoutObserver<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) {
    if let Some((worker, last_seen)) = &self.clock {
      *last_seen.lock() = worker.now();
    }
    self.downstream.on_next(value);
  }

  fn error(self, err: RxError) { self.downstream.on_error::<Item>(err) }

  fn complete(self) { self.downstream.on_complete::<Item>() }

  fn set_upstream(&mut self, upstream: Disposable) {
    self.downstream.add_upstream::<Item>(upstream)
  }

  fn is_disposed(&self) -> bool { self.downstream.is_closed::<Item>() }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn silent_source_times_out() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::<i32>::new();
    let subject = PublishSubject::new();
    subject
      .observable()
      .timeout(Duration::from_millis(100), scheduler.clone())
      .subscribe_observer(recorder.clone());

    scheduler.advance_by(Duration::from_millis(99));
    assert!(recorder.errors().is_empty());
    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(recorder.errors(), vec![RxError::Timeout]);
    assert!(!subject.has_observers());
  }

  #[test]
  fn each_value_restarts_the_period() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::new();
    let subject = PublishSubject::new();
    subject
      .observable()
      .timeout(Duration::from_millis(100), scheduler.clone())
      .subscribe_observer(recorder.clone());

    scheduler.advance_by(Duration::from_millis(80));
    subject.next(1);
    scheduler.advance_by(Duration::from_millis(80));
    subject.next(2);
    scheduler.advance_by(Duration::from_millis(99));
    assert!(recorder.errors().is_empty());
    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(recorder.values(), vec![1, 2]);
    assert_eq!(recorder.errors(), vec![RxError::Timeout]);
  }

  #[test]
  fn completion_cancels_the_check() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::new();
    observable::from_iter([1, 2])
      .timeout(Duration::from_millis(10), scheduler.clone())
      .subscribe_observer(recorder.clone());
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(recorder.completed(), 1);
    assert!(recorder.errors().is_empty());
    assert_eq!(scheduler.pending_count(), 0);
  }
}
