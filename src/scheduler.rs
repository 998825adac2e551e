//! Schedulers and workers.
//!
//! A [`Scheduler`] is a factory of [`Worker`]s. A worker is a serial queue of
//! [`Schedulable`] tasks ordered by requested [`Instant`], FIFO among equal
//! instants. The strategy behind a worker decides *where* tasks run:
//!
//! | Scheduler | Where tasks run |
//! |-----------|-----------------|
//! | [`ImmediateScheduler`] | Inline on the calling thread |
//! | [`TrampolineScheduler`] | A per-thread queue drained by the outermost caller |
//! | [`NewThreadScheduler`] | One dedicated thread per worker |
//! | [`ThreadPoolScheduler`] | A fixed set of threads shared round-robin |
//! | [`RunLoopScheduler`] | Whatever thread calls `dispatch` |
//! | [`TestScheduler`] | Virtual time advanced by the test |
//!
//! A task returns a [`TaskState`] telling the worker whether to run it again.
//! `Sleeping(d)` re-queues it at *previous time point + d*, not at `now + d`,
//! so periodic work does not drift.

use std::sync::Arc;

use tracing::trace;

use crate::{
  disposable::{CompositeDisposable, Disposable, FixedDisposables},
  error::RxResult,
};

mod immediate;
mod new_thread;
pub(crate) mod queue;
mod run_loop;
mod test_scheduler;
mod thread_pool;
mod trampoline;

pub use immediate::ImmediateScheduler;
pub use new_thread::NewThreadScheduler;
pub use run_loop::RunLoopScheduler;
pub use std::time::{Duration, Instant};
pub use test_scheduler::TestScheduler;
pub use thread_pool::{ThreadPoolBuilder, ThreadPoolScheduler};
pub use trampoline::TrampolineScheduler;

/// What a task wants after one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  /// Done, drop it.
  Finished,
  /// Run again at the same time point, after tasks already queued for it.
  Yield,
  /// Run again `Duration` after the time point it was scheduled for.
  Sleeping(Duration),
}

/// A unit of work owned by a worker queue.
pub struct Schedulable(Box<dyn FnMut() -> TaskState + Send>);

impl Schedulable {
  pub fn new(task: impl FnMut() -> TaskState + Send + 'static) -> Self { Self(Box::new(task)) }

  /// A task that runs once.
  pub fn once(task: impl FnOnce() + Send + 'static) -> Self {
    let mut task = Some(task);
    Self::new(move || {
      if let Some(task) = task.take() {
        task();
      }
      TaskState::Finished
    })
  }

  #[inline]
  pub fn run(&mut self) -> TaskState { (self.0)() }
}

/// A [`Schedulable`] paired with the guard of the worker that queued it.
pub struct Job {
  task: Schedulable,
  guard: Option<Disposable>,
}

impl Job {
  pub fn new(task: Schedulable, guard: Option<Disposable>) -> Self { Self { task, guard } }

  /// Whether the guard was disposed; such a job must not run again.
  pub fn is_cancelled(&self) -> bool { self.guard.as_ref().map_or(false, |g| g.is_disposed()) }

  /// Runs the task unless its guard is disposed.
  ///
  /// The check happens right before every invocation, including re-runs of a
  /// self-rescheduling task.
  pub fn run(&mut self) -> TaskState {
    if self.is_cancelled() {
      trace!("skip a task whose subscription is disposed");
      return TaskState::Finished;
    }
    self.task.run()
  }
}

/// The queueing policy behind a [`Worker`].
pub trait WorkerStrategy: Send + Sync {
  /// Queues `job` to run at `at`.
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()>;

  fn now(&self) -> Instant { Instant::now() }

  /// A handle to the worker's own lifetime, for strategies owning a thread.
  fn disposable(&self) -> Option<Disposable> { None }
}

/// A serial task queue created by a [`Scheduler`].
#[derive(Clone)]
pub struct Worker {
  strategy: Arc<dyn WorkerStrategy>,
  guard: Option<Disposable>,
}

impl Worker {
  pub fn new(strategy: impl WorkerStrategy + 'static) -> Self {
    Self { strategy: Arc::new(strategy), guard: None }
  }

  /// Ties every task scheduled through the returned worker to `guard`: once it
  /// is disposed, queued tasks are dropped without running.
  pub fn bind(self, guard: Disposable) -> Self { Self { guard: Some(guard), ..self } }

  #[inline]
  pub fn now(&self) -> Instant { self.strategy.now() }

  pub fn disposable(&self) -> Option<Disposable> { self.strategy.disposable() }

  pub fn schedule(&self, task: Schedulable) -> RxResult<()> { self.schedule_at(self.now(), task) }

  pub fn schedule_after(&self, delay: Duration, task: Schedulable) -> RxResult<()> {
    self.schedule_at(self.now() + delay, task)
  }

  pub fn schedule_at(&self, at: Instant, task: Schedulable) -> RxResult<()> {
    self.strategy.defer_at(at, Job::new(task, self.guard.clone()))
  }
}

/// A factory of workers.
pub trait Scheduler: Clone + Send + Sync + 'static {
  fn create_worker(&self) -> Worker;
}

/// Schedulers whose workers may run a task later than the current call stack
/// unwinds.
///
/// Operators that hold values across time, such as `delay`, require this
/// bound, so handing them a [`TrampolineScheduler`] is rejected at compile
/// time.
pub trait NonTrampoline: Scheduler {}

/// Creates a worker of `scheduler` bound to a fresh guard.
///
/// Disposing the returned handle drops the worker's queued tasks and, for
/// thread-owning strategies, releases the thread.
pub(crate) fn guarded_worker(scheduler: &impl Scheduler) -> RxResult<(Worker, Disposable)> {
  let worker = scheduler.create_worker();
  let guard = CompositeDisposable::new();
  let parts = FixedDisposables::<2>::new();
  parts.push(guard.clone().into())?;
  if let Some(lifetime) = worker.disposable() {
    parts.push(lifetime)?;
  }
  Ok((worker.bind(guard.into()), Disposable::new(parts)))
}
