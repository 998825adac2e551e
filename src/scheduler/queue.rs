use std::{cmp::Ordering, collections::BinaryHeap};

use super::{Instant, Job, TaskState};

/// Queue size under which [`TimedQueue::sweep`] does nothing.
const SWEEP_MIN: usize = 64;

/// A time-ordered job queue: earliest instant first, FIFO among equals.
///
/// Jobs whose guard is disposed stop counting at once and are removed by
/// [`sweep`](Self::sweep) or [`purge`](Self::purge). Both hand the removed jobs
/// back so the caller can drop them after releasing its lock: dropping a job
/// may tear down a worker that locks this same queue.
#[derive(Default)]
pub(crate) struct TimedQueue {
  heap: BinaryHeap<Entry>,
  next_id: u64,
  sweep_at: usize,
}

struct Entry {
  at: Instant,
  id: u64,
  job: Job,
}

impl PartialEq for Entry {
  fn eq(&self, other: &Self) -> bool { self.at == other.at && self.id == other.id }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Entry {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by id
    other.at.cmp(&self.at).then_with(|| other.id.cmp(&self.id))
  }
}

impl TimedQueue {
  pub(crate) fn push(&mut self, at: Instant, job: Job) {
    let id = self.next_id;
    self.next_id += 1;
    self.heap.push(Entry { at, id, job });
  }

  pub(crate) fn pop(&mut self) -> Option<(Instant, Job)> {
    self.heap.pop().map(|e| (e.at, e.job))
  }

  /// Pops the head only if it is due at `now`.
  pub(crate) fn pop_ready(&mut self, now: Instant) -> Option<(Instant, Job)> {
    match self.peek_time() {
      Some(at) if at <= now => self.pop(),
      _ => None,
    }
  }

  pub(crate) fn peek_time(&self) -> Option<Instant> { self.heap.peek().map(|e| e.at) }

  /// Number of jobs still able to run.
  pub(crate) fn len(&self) -> usize { self.heap.iter().filter(|e| !e.job.is_cancelled()).count() }

  pub(crate) fn is_empty(&self) -> bool { self.heap.iter().all(|e| e.job.is_cancelled()) }

  #[cfg(test)]
  pub(crate) fn heap_len(&self) -> usize { self.heap.len() }

  /// Removes every cancelled job.
  #[must_use]
  pub(crate) fn purge(&mut self) -> Vec<Job> {
    let (live, dead): (Vec<_>, Vec<_>) =
      std::mem::take(&mut self.heap).into_vec().into_iter().partition(|e| !e.job.is_cancelled());
    self.heap = live.into();
    self.sweep_at = (self.heap.len() * 2).max(SWEEP_MIN);
    dead.into_iter().map(|e| e.job).collect()
  }

  /// Like [`purge`](Self::purge), but only once the queue has doubled since
  /// the last purge, so pushing stays amortized O(log n).
  #[must_use]
  pub(crate) fn sweep(&mut self) -> Vec<Job> {
    if self.heap.len() < self.sweep_at.max(SWEEP_MIN) {
      return Vec::new();
    }
    self.purge()
  }
}

/// Runs `job` once and tells where it goes next, if anywhere.
pub(crate) fn run_job(at: Instant, mut job: Job) -> Option<(Instant, Job)> {
  match job.run() {
    TaskState::Finished => None,
    TaskState::Yield => Some((at, job)),
    TaskState::Sleeping(d) => Some((at + d, job)),
  }
}

/// Blocks the current thread until `at`.
pub(crate) fn sleep_until(at: Instant) {
  let now = Instant::now();
  if at > now {
    std::thread::sleep(at - now);
  }
}
