use std::sync::Arc;

use futures::executor::block_on;
use parking_lot::{Condvar, Mutex};

use super::{Observable, ObservableExt};
use crate::error::RxResult;

/// Blocking consumption of an observable, for tests, `main` functions and
/// bridges to synchronous code.
///
/// Every method parks the calling thread until the stream terminates. Blocking
/// the thread that is supposed to deliver the events, such as the thread
/// draining a [`TrampolineScheduler`](crate::scheduler::TrampolineScheduler)
/// queue or dispatching a
/// [`RunLoopScheduler`](crate::scheduler::RunLoopScheduler), never returns.
pub struct BlockingObservable<S>(S);

impl<S> BlockingObservable<S>
where
  S: Observable,
  S::Item: Send + 'static,
{
  pub(crate) fn new(source: S) -> Self { Self(source) }

  /// Runs `next` for every value and returns once the stream terminates,
  /// with the stream's error if it failed.
  pub fn subscribe<N>(self, next: N) -> RxResult<()>
  where
    N: FnMut(S::Item) + Send + 'static,
  {
    let done = Arc::new((Mutex::new(None::<RxResult<()>>), Condvar::new()));
    let on_error = done.clone();
    let on_complete = done.clone();
    let _guard = self
      .0
      .subscribe_all(
        next,
        move |err| finish(&on_error, Err(err)),
        move || finish(&on_complete, Ok(())),
      )
      .into_guard();
    let (outcome, finished) = &*done;
    let mut outcome = outcome.lock();
    loop {
      if let Some(result) = outcome.take() {
        return result;
      }
      finished.wait(&mut outcome);
    }
  }

  /// Every value, in order.
  pub fn to_vec(self) -> RxResult<Vec<S::Item>> {
    let values = Arc::new(Mutex::new(vec![]));
    let sink = values.clone();
    self.subscribe(move |v| sink.lock().push(v))?;
    let mut values = values.lock();
    Ok(std::mem::take(&mut *values))
  }

  /// The last value; [`RxError::NotEnoughEmissions`](crate::error::RxError::NotEnoughEmissions)
  /// if there is none.
  pub fn last(self) -> RxResult<S::Item> { block_on(self.0.into_future()) }

  /// The first value; the source is unsubscribed right after it.
  pub fn first(self) -> RxResult<S::Item> { block_on(self.0.first().into_future()) }
}

fn finish(done: &(Mutex<Option<RxResult<()>>>, Condvar), result: RxResult<()>) {
  *done.0.lock() = Some(result);
  done.1.notify_all();
}
