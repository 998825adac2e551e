use super::Operator;
use crate::{
  disposable::Disposable,
  error::RxError,
  observer::{Observer, SharedObserver},
  scheduler::{guarded_worker, Duration, Schedulable, Scheduler, Worker},
};

/// Re-emits every event from a worker of the given scheduler.
#[derive(Clone)]
pub struct ObserveOnOp<Sch>(pub(crate) Sch);

/// Forwards events through a worker, `delay` after they arrive.
///
/// Errors queue behind the values before them like every other event.
///
/// The worker is bound to the subscription: once it is disposed, events still
/// queued are dropped.
pub struct ScheduledObserver<O> {
  worker: Option<Worker>,
  downstream: SharedObserver<O>,
  delay: Duration,
}

impl<O> ScheduledObserver<O> {
  pub(crate) fn new<Item>(mut downstream: O, scheduler: &impl Scheduler, delay: Duration) -> Self
  where
    O: Observer<Item>,
  {
    match guarded_worker(scheduler) {
      Ok((worker, guard)) => {
        downstream.set_upstream(guard);
        Self { worker: Some(worker), downstream: SharedObserver::new(downstream), delay }
      }
      Err(err) => {
        let downstream = SharedObserver::new(downstream);
        downstream.on_error::<Item>(err);
        Self { worker: None, downstream, delay }
      }
    }
  }

  fn schedule<Item>(&self, task: impl FnOnce(SharedObserver<O>) + Send + 'static)
  where
    O: Observer<Item> + 'static,
  {
    let Some(worker) = self.worker.as_ref() else { return };
    let downstream = self.downstream.clone();
    let scheduled =
      worker.schedule_after(self.delay, Schedulable::once(move || task(downstream)));
    if let Err(err) = scheduled {
      self.downstream.on_error::<Item>(err);
    }
  }
}

impl<Item, Sch> Operator<Item> for ObserveOnOp<Sch>
where
  Item: Send + 'static,
  Sch: Scheduler,
{
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    ScheduledObserver::new::<Item>(downstream, &self.0, Duration::ZERO)
  }
}

impl<Item, O> Observer<Item> for ScheduledObserver<O>
where
  Item: Send + 'static,
  O: Observer<Item> + 'static,
{
  fn next(&mut self, value: Item) { self.schedule::<Item>(move |d| d.on_next(value)) }

  fn error(self, err: RxError) { self.schedule::<Item>(move |d| d.on_error::<Item>(err)) }

  fn complete(self) { self.schedule::<Item>(|d| d.on_complete::<Item>()) }

  fn set_upstream(&mut self, upstream: Disposable) {
    self.downstream.add_upstream::<Item>(upstream)
  }

  fn is_disposed(&self) -> bool { self.downstream.is_closed::<Item>() }
}
