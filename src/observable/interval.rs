use super::Observable;
use crate::{
  observer::{Observer, SharedObserver},
  scheduler::{guarded_worker, Duration, Schedulable, Scheduler, TaskState},
};

/// Emits `0, 1, 2, ...` every `period`, starting one period after subscribe.
///
/// Ticks are scheduled at fixed time points, so a slow tick does not shift the
/// ones after it.
pub fn interval<Sch: Scheduler>(period: Duration, scheduler: Sch) -> Interval<Sch> {
  Interval { period, scheduler }
}

/// Emits `0` after `delay`, then completes.
pub fn timer<Sch: Scheduler>(delay: Duration, scheduler: Sch) -> Timer<Sch> {
  Timer { delay, scheduler }
}

#[derive(Clone)]
pub struct Interval<Sch> {
  period: Duration,
  scheduler: Sch,
}

#[derive(Clone)]
pub struct Timer<Sch> {
  delay: Duration,
  scheduler: Sch,
}

impl<Sch: Scheduler> Observable for Interval<Sch> {
  type Item = usize;

  fn subscribe_with<O>(self, mut observer: O)
  where
    O: Observer<usize> + 'static,
  {
    let (worker, guard) = match guarded_worker(&self.scheduler) {
      Ok(worker) => worker,
      Err(err) => return observer.error(err),
    };
    observer.set_upstream(guard);
    let observer = SharedObserver::new(observer);
    let tick_observer = observer.clone();
    let period = self.period;
    let mut tick = 0;
    let task = Schedulable::new(move || {
      if tick_observer.is_closed::<usize>() {
        return TaskState::Finished;
      }
      tick_observer.on_next(tick);
      tick += 1;
      TaskState::Sleeping(period)
    });
    if let Err(err) = worker.schedule_after(period, task) {
      observer.on_error::<usize>(err);
    }
  }
}

impl<Sch: Scheduler> Observable for Timer<Sch> {
  type Item = usize;

  fn subscribe_with<O>(self, mut observer: O)
  where
    O: Observer<usize> + 'static,
  {
    let (worker, guard) = match guarded_worker(&self.scheduler) {
      Ok(worker) => worker,
      Err(err) => return observer.error(err),
    };
    observer.set_upstream(guard);
    let observer = SharedObserver::new(observer);
    let fire = observer.clone();
    let task = Schedulable::once(move || {
      fire.on_next(0);
      fire.on_complete::<usize>();
    });
    if let Err(err) = worker.schedule_after(self.delay, task) {
      observer.on_error::<usize>(err);
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::{observer::test_util::Recorder, prelude::*};

  #[test]
  fn ticks_on_virtual_time() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::new();
    let subscription = observable::interval(Duration::from_secs(1), scheduler.clone())
      .subscribe_observer(recorder.clone());

    scheduler.advance_by(Duration::from_millis(999));
    assert!(recorder.values().is_empty());
    scheduler.advance_by(Duration::from_millis(2001));
    assert_eq!(recorder.values(), vec![0, 1, 2]);

    subscription.dispose();
    scheduler.advance_by(Duration::from_secs(10));
    assert_eq!(recorder.values(), vec![0, 1, 2]);
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn interval_on_a_thread_behind_take() {
    let got = observable::interval(Duration::from_millis(5), NewThreadScheduler::new())
      .take(3)
      .as_blocking()
      .to_vec()
      .unwrap();
    assert_eq!(got, vec![0, 1, 2]);
  }

  #[test]
  fn timer_fires_once() {
    let scheduler = TestScheduler::new();
    let recorder = Recorder::new();
    observable::timer(Duration::from_millis(50), scheduler.clone())
      .subscribe_observer(recorder.clone());
    scheduler.advance_by(Duration::from_millis(49));
    assert_eq!(recorder.completed(), 0);
    scheduler.flush();
    assert_eq!(recorder.values(), vec![0]);
    assert_eq!(recorder.completed(), 1);
  }
}
