//! Integration tests for rxplus
//!
//! Operator chains across schedulers, subjects and the disposable tree.

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  thread,
};

use rxplus::prelude::*;

/// Values, errors and completions seen by one subscription.
struct Seen<T> {
  values: Vec<T>,
  errors: Vec<RxError>,
  completed: usize,
}

fn record<S>(source: S) -> (Arc<Mutex<Seen<S::Item>>>, Disposable)
where
  S: Observable,
  S::Item: Send + 'static,
{
  let seen = Arc::new(Mutex::new(Seen { values: vec![], errors: vec![], completed: 0 }));
  let (n, e, c) = (seen.clone(), seen.clone(), seen.clone());
  let subscription = source.subscribe_all(
    move |v| n.lock().unwrap().values.push(v),
    move |err| e.lock().unwrap().errors.push(err),
    move || c.lock().unwrap().completed += 1,
  );
  (seen, subscription)
}

#[rxplus_macro::test]
fn filter_keeps_even_values() {
  let (seen, _) = record(observable::from_iter([1, 2, 3]).filter(|v| v % 2 == 0));
  let seen = seen.lock().unwrap();
  assert_eq!(seen.values, vec![2]);
  assert_eq!(seen.completed, 1);
  assert!(seen.errors.is_empty());
}

#[rxplus_macro::test]
fn chain_of_operators() {
  let got = observable::from_iter(1..=20)
    .filter(|x| x % 2 == 0)
    .map(|x| x * x)
    .scan(0, |acc, v| acc + v)
    .take_while(|x| *x < 100)
    .skip(2)
    .as_blocking()
    .to_vec();
  // Running sums of even squares: 4, 20, 56, 120, ...
  assert_eq!(got, Ok(vec![56]));
}

#[rxplus_macro::test]
fn delay_runs_on_another_thread() {
  let caller = thread::current().id();
  let start = Instant::now();
  let got = observable::of(1)
    .delay(Duration::from_secs(1), NewThreadScheduler::new())
    .map(|v| (v, thread::current().id()))
    .as_blocking()
    .to_vec()
    .unwrap();

  assert!(start.elapsed() >= Duration::from_secs(1));
  assert_eq!(got.len(), 1);
  assert_eq!(got[0].0, 1);
  assert_ne!(got[0].1, caller);
}

#[rxplus_macro::test]
fn subject_subscribers_see_the_same_sequence() {
  let subject = PublishSubject::new();
  let (a, _) = record(subject.observable());
  let (b, _) = record(subject.observable());
  subject.next(1);
  subject.next(2);
  subject.next(3);
  subject.complete();

  assert_eq!(a.lock().unwrap().values, vec![1, 2, 3]);
  assert_eq!(b.lock().unwrap().values, vec![1, 2, 3]);
  assert_eq!(a.lock().unwrap().completed, 1);
  assert_eq!(b.lock().unwrap().completed, 1);
}

#[rxplus_macro::test]
fn late_subscriber_of_a_completed_subject() {
  let subject = PublishSubject::<i32>::new();
  subject.next(1);
  subject.complete();
  let (late, _) = record(subject.observable());
  let late = late.lock().unwrap();
  assert!(late.values.is_empty());
  assert_eq!(late.completed, 1);
}

#[rxplus_macro::test]
fn retry_resubscribes_then_gives_up() {
  let attempts = Arc::new(AtomicUsize::new(0));
  let c_attempts = attempts.clone();
  let source = observable::create(move |mut emitter: Emitter<i32>| {
    c_attempts.fetch_add(1, Ordering::SeqCst);
    (1..=3).for_each(|v| emitter.next(v));
    emitter.error(RxError::msg("boom"));
    Ok(())
  });

  let (seen, _) = record(source.retry(2));
  let seen = seen.lock().unwrap();
  assert_eq!(seen.values, vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
  assert_eq!(seen.errors, vec![RxError::msg("boom")]);
  assert_eq!(seen.completed, 0);
  assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[rxplus_macro::test]
fn retry_policy_filters_errors() {
  let source = observable::throw_err::<i32>(RxError::Timeout);
  let policy = RetryConfig::new().count(5).when(|err| err.is_stream());
  let (seen, _) = record(source.retry_with(policy));
  assert_eq!(seen.lock().unwrap().errors, vec![RxError::Timeout]);
}

#[rxplus_macro::test]
fn worker_runs_tasks_by_due_time() {
  let scheduler = TestScheduler::new();
  let worker = scheduler.create_worker();
  let order = Arc::new(Mutex::new(vec![]));
  for at in [5u64, 1, 3] {
    let order = order.clone();
    let task = Schedulable::once(move || order.lock().unwrap().push(at));
    worker.schedule_after(Duration::from_secs(at), task).unwrap();
  }
  scheduler.advance_by(Duration::from_secs(10));
  assert_eq!(*order.lock().unwrap(), vec![1, 3, 5]);
}

#[rxplus_macro::test]
fn thread_pool_worker_keeps_order() {
  let pool = ThreadPoolScheduler::new(2).unwrap();
  let got = observable::from_iter(0..50).observe_on(pool).as_blocking().to_vec();
  assert_eq!(got, Ok((0..50).collect::<Vec<_>>()));
}

#[rxplus_macro::test]
fn refcount_needs_every_reference_released() {
  let hits = Arc::new(AtomicUsize::new(0));
  let c_hits = hits.clone();
  let target = Disposable::from_fn(move || {
    c_hits.fetch_add(1, Ordering::SeqCst);
  });
  let counter = RefCountDisposable::new(target.clone());
  let refs: Vec<_> = (0..3).map(|_| counter.add_ref()).collect();

  let handle = Disposable::new(counter);
  handle.dispose();
  refs[0].dispose();
  refs[1].dispose();
  assert!(!target.is_disposed());
  refs[2].dispose();
  assert!(target.is_disposed());
  assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[rxplus_macro::test]
fn orphan_added_to_disposed_node_is_disposed() {
  let node = CompositeDisposable::new();
  node.dispose();
  node.dispose();
  let child = Disposable::from_fn(|| {});
  node.add(child.clone());
  assert!(child.is_disposed());
  assert!(node.is_disposed());
}

#[rxplus_macro::test]
fn unsubscribe_stops_an_interval() {
  let scheduler = TestScheduler::new();
  let ticks = observable::interval(Duration::from_secs(1), scheduler.clone());
  let (seen, subscription) = record(ticks);
  scheduler.advance_by(Duration::from_secs(3));
  subscription.dispose();
  scheduler.advance_by(Duration::from_secs(3));
  assert_eq!(seen.lock().unwrap().values, vec![0, 1, 2]);
  assert_eq!(scheduler.pending_count(), 0);
}

#[rxplus_macro::test]
fn timeout_fires_on_silence() {
  let scheduler = TestScheduler::new();
  let silent = observable::never::<i32>().timeout(Duration::from_secs(2), scheduler.clone());
  let (seen, _) = record(silent);
  scheduler.advance_by(Duration::from_secs(1));
  assert!(seen.lock().unwrap().errors.is_empty());
  scheduler.advance_by(Duration::from_secs(2));
  assert_eq!(seen.lock().unwrap().errors, vec![RxError::Timeout]);
}

#[rxplus_macro::test]
fn merge_and_combine_latest() {
  let a = PublishSubject::new();
  let b = PublishSubject::new();
  let (merged, _) = record(a.observable().merge(b.observable()));
  let (combined, _) = record(a.observable().combine_latest(b.observable(), |x, y| x * 10 + y));
  a.next(1);
  b.next(2);
  a.next(3);
  a.complete();
  assert_eq!(merged.lock().unwrap().completed, 0);
  b.complete();

  assert_eq!(merged.lock().unwrap().values, vec![1, 2, 3]);
  assert_eq!(merged.lock().unwrap().completed, 1);
  assert_eq!(combined.lock().unwrap().values, vec![12, 32]);
  assert_eq!(combined.lock().unwrap().completed, 1);
}

#[rxplus_macro::test]
fn boxed_observables_share_one_type() {
  let sources: Vec<BoxedObservable<i32>> = vec![
    observable::from_iter([1, 2]).boxed(),
    observable::of(3).map(|v| v * 10).boxed(),
    observable::empty().boxed(),
  ];
  let got = observable::merge_all(sources).as_blocking().to_vec();
  assert_eq!(got, Ok(vec![1, 2, 30]));
}

#[rxplus_macro::test]
fn run_loop_dispatches_on_the_calling_thread() {
  let run_loop = RunLoopScheduler::new();
  let (seen, _) = record(
    observable::from_iter([1, 2])
      .observe_on(run_loop.clone())
      .map(|v| (v, thread::current().id())),
  );
  assert!(seen.lock().unwrap().values.is_empty());
  while run_loop.dispatch_if_ready() {}
  let seen = seen.lock().unwrap();
  let here = thread::current().id();
  assert_eq!(seen.values, vec![(1, here), (2, here)]);
  assert_eq!(seen.completed, 1);
}

#[rxplus_macro::test]
async fn last_value_as_a_future() {
  let last = observable::from_iter(1..=4)
    .subscribe_on(ThreadPoolScheduler::computation())
    .into_future()
    .await;
  assert_eq!(last, Ok(4));
}
