use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
  thread::JoinHandle,
};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{new_thread::EventLoop, Instant, Job, NonTrampoline, Scheduler, Worker, WorkerStrategy};
use crate::error::{RxError, RxResult};

static COMPUTATION: Lazy<ThreadPoolScheduler> = Lazy::new(|| {
  ThreadPoolScheduler::builder()
    .name_prefix("rxplus-computation")
    .build()
    .expect("failed to start the computation thread pool")
});

/// A fixed set of persistent threads.
///
/// Each `create_worker` call hands out the next thread round-robin; tasks of
/// one worker therefore always run serially on the same thread. Workers keep
/// the pool alive; once the last pool handle and the last worker are gone,
/// queued work is discarded and the threads are joined.
#[derive(Clone)]
pub struct ThreadPoolScheduler(Arc<PoolInner>);

struct PoolInner {
  loops: Vec<Arc<EventLoop>>,
  handles: Mutex<Vec<JoinHandle<()>>>,
  next: AtomicUsize,
}

/// Configuration for a [`ThreadPoolScheduler`].
#[derive(Clone, Debug)]
pub struct ThreadPoolBuilder {
  threads: usize,
  name_prefix: String,
}

impl Default for ThreadPoolBuilder {
  fn default() -> Self { Self { threads: num_cpus::get(), name_prefix: "rxplus-pool".into() } }
}

impl ThreadPoolBuilder {
  /// Number of threads, at least one. Defaults to the number of logical CPUs.
  pub fn threads(mut self, threads: usize) -> Self {
    self.threads = threads.max(1);
    self
  }

  pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.name_prefix = prefix.into();
    self
  }

  pub fn build(self) -> RxResult<ThreadPoolScheduler> {
    let loops: Vec<_> = (0..self.threads)
      .map(|i| EventLoop::new(format!("{}-{i}", self.name_prefix)))
      .collect();
    let mut handles = Vec::with_capacity(loops.len());
    for event_loop in &loops {
      match event_loop.spawn() {
        Ok(handle) => handles.push(handle),
        Err(err) => {
          loops.iter().for_each(|l| l.dispose());
          return Err(err);
        }
      }
    }
    debug!(threads = loops.len(), prefix = %self.name_prefix, "thread pool started");
    Ok(ThreadPoolScheduler(Arc::new(PoolInner {
      loops,
      handles: Mutex::new(handles),
      next: AtomicUsize::new(0),
    })))
  }
}

impl ThreadPoolScheduler {
  pub fn builder() -> ThreadPoolBuilder { ThreadPoolBuilder::default() }

  pub fn new(threads: usize) -> RxResult<Self> { Self::builder().threads(threads).build() }

  /// The process-wide pool, created on first use with one thread per CPU.
  pub fn computation() -> Self { COMPUTATION.clone() }

  pub fn thread_count(&self) -> usize { self.0.loops.len() }
}

impl Scheduler for ThreadPoolScheduler {
  fn create_worker(&self) -> Worker {
    let idx = self.0.next.fetch_add(1, Ordering::Relaxed) % self.0.loops.len();
    Worker::new(PoolStrategy { pool: self.0.clone(), idx })
  }
}

struct PoolStrategy {
  pool: Arc<PoolInner>,
  idx: usize,
}

impl WorkerStrategy for PoolStrategy {
  fn defer_at(&self, at: Instant, job: Job) -> RxResult<()> {
    let event_loop = &self.pool.loops[self.idx];
    if event_loop.is_disposed() {
      return Err(RxError::NoActiveLoop);
    }
    event_loop.push(at, job, false)
  }
}

impl NonTrampoline for ThreadPoolScheduler {}

impl Drop for PoolInner {
  fn drop(&mut self) {
    self.loops.iter().for_each(|l| l.dispose());
    let current = std::thread::current().id();
    for handle in self.handles.get_mut().drain(..) {
      // The last pool handle may be dropped by one of the pool's own tasks.
      if handle.thread().id() == current {
        continue;
      }
      if handle.join().is_err() {
        warn!("a pool thread panicked");
      }
    }
    debug!("thread pool joined");
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashSet, sync::mpsc};

  use super::*;
  use crate::scheduler::{Duration, Schedulable};

  #[test]
  fn workers_are_assigned_round_robin() {
    let pool = ThreadPoolScheduler::new(2).unwrap();
    let (tx, rx) = mpsc::channel();
    for _ in 0..4 {
      let tx = tx.clone();
      pool
        .create_worker()
        .schedule(Schedulable::once(move || tx.send(std::thread::current().id()).unwrap()))
        .unwrap();
    }
    let ids: HashSet<_> =
      (0..4).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&std::thread::current().id()));
  }

  #[test]
  fn one_worker_runs_serially_in_order() {
    let pool = ThreadPoolScheduler::builder().threads(3).build().unwrap();
    let worker = pool.create_worker();
    let (tx, rx) = mpsc::channel();
    for i in 0..10 {
      let tx = tx.clone();
      worker.schedule(Schedulable::once(move || tx.send(i).unwrap())).unwrap();
    }
    let got: Vec<_> = (0..10).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
    assert_eq!(got, (0..10).collect::<Vec<_>>());
  }

  #[test]
  fn workers_keep_the_pool_alive() {
    let pool = ThreadPoolScheduler::new(2).unwrap();
    let worker = pool.create_worker();
    drop(pool);
    let (tx, rx) = mpsc::channel();
    worker.schedule(Schedulable::once(move || tx.send(()).unwrap())).unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    drop(worker);
  }

  #[test]
  fn computation_pool_is_shared() {
    let a = ThreadPoolScheduler::computation();
    let b = ThreadPoolScheduler::computation();
    assert_eq!(a.thread_count(), num_cpus::get());
    assert!(Arc::ptr_eq(&a.0, &b.0));
  }
}
