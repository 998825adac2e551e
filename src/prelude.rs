//! Everything needed to build and subscribe streams.
//!
//! ```
//! use rxplus::prelude::*;
//! ```

pub use crate::{
  disposable::{CompositeDisposable, Disposable, DisposableGuard, RefCountDisposable},
  error::{RxError, RxResult},
  observable::{
    self, BoxedObservable, BoxedObservableClone, ConnectableObservable, Emitter, Observable,
    ObservableExt,
  },
  observer::{BoxedObserver, Observer, SharedObserver, Subscriber},
  ops::{
    retry::{RetryConfig, RetryPolicy},
    Operator,
  },
  scheduler::{
    Duration, ImmediateScheduler, Instant, NewThreadScheduler, NonTrampoline, RunLoopScheduler,
    Schedulable, Scheduler, TaskState, TestScheduler, ThreadPoolScheduler, TrampolineScheduler,
    Worker,
  },
  subject::{BehaviorSubject, PublishSubject, ReplaySubject, SerializedSubject, Subject},
};
