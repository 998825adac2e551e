use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{guarded_worker, Schedulable, Scheduler},
};

/// Subscribes to the source from a worker of the given scheduler.
///
/// Everything the source does while subscribing, including emitting
/// synchronously, then happens on that worker.
#[derive(Clone)]
pub struct SubscribeOn<S, Sch> {
  pub(crate) source: S,
  pub(crate) scheduler: Sch,
}

impl<S, Sch> Observable for SubscribeOn<S, Sch>
where
  S: Observable + Send + 'static,
  Sch: Scheduler,
{
  type Item = S::Item;

  fn subscribe_with<O>(self, mut observer: O)
  where
    O: Observer<Self::Item> + 'static,
  {
    let (worker, guard) = match guarded_worker(&self.scheduler) {
      Ok(worker) => worker,
      Err(err) => return observer.error(err),
    };
    observer.set_upstream(guard);

    let slot = Arc::new(Mutex::new(Some((self.source, observer))));
    let task_slot = slot.clone();
    let scheduled = worker.schedule(Schedulable::once(move || {
      let pending = task_slot.lock().take();
      if let Some((source, observer)) = pending {
        source.subscribe_with(observer);
      }
    }));
    if let Err(err) = scheduled {
      let pending = slot.lock().take();
      if let Some((_, observer)) = pending {
        observer.error(err);
      }
    }
  }
}
