use super::{observe_on::ScheduledObserver, Operator};
use crate::{
  observer::Observer,
  scheduler::{Duration, NonTrampoline},
};

/// Shifts every event forward in time, errors included, keeping their order.
///
/// Only schedulers able to run work after the current call stack unwinds are
/// accepted:
///
/// ```compile_fail
/// use rxplus::prelude::*;
///
/// observable::of(1)
///   .delay(Duration::from_secs(1), TrampolineScheduler)
///   .subscribe(|_| {});
/// ```
#[derive(Clone)]
pub struct DelayOp<Sch> {
  pub(crate) delay: Duration,
  pub(crate) scheduler: Sch,
}

impl<Item, Sch> Operator<Item> for DelayOp<Sch>
where
  Item: Send + 'static,
  Sch: NonTrampoline,
{
  type Out = Item;

  fn lift<O>(self, downstream: O) -> impl Observer<Item> + 'static
  where
    O: Observer<Self::Out> + 'static,
  {
    ScheduledObserver::new::<Item>(downstream, &self.scheduler, self.delay)
  }
}
