use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use futures::channel::oneshot;
use pin_project_lite::pin_project;

use crate::{
  disposable::{Disposable, DisposableGuard},
  error::{RxError, RxResult},
  observer::Observer,
};

pin_project! {
  /// Resolves to the last value of a stream once it completes.
  ///
  /// An empty stream resolves to [`RxError::NotEnoughEmissions`], a failed
  /// one to its error. Dropping the future disposes the subscription.
  pub struct ObservableFuture<Item> {
    #[pin]
    receiver: oneshot::Receiver<RxResult<Item>>,
    guard: DisposableGuard,
  }
}

impl<Item> ObservableFuture<Item> {
  pub(crate) fn new(receiver: oneshot::Receiver<RxResult<Item>>, subscription: Disposable) -> Self {
    Self { receiver, guard: subscription.into_guard() }
  }
}

impl<Item> Future for ObservableFuture<Item> {
  type Output = RxResult<Item>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.project();
    match this.receiver.poll(cx) {
      Poll::Ready(Ok(result)) => Poll::Ready(result),
      // The subscription went away without a terminal event.
      Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(RxError::NotEnoughEmissions)),
      Poll::Pending => Poll::Pending,
    }
  }
}

/// Keeps the latest value and hands it over on completion.
pub struct LastValueObserver<Item> {
  last: Option<Item>,
  sender: oneshot::Sender<RxResult<Item>>,
}

impl<Item> LastValueObserver<Item> {
  pub(crate) fn channel() -> (Self, oneshot::Receiver<RxResult<Item>>) {
    let (sender, receiver) = oneshot::channel();
    (Self { last: None, sender }, receiver)
  }
}

impl<Item: Send> Observer<Item> for LastValueObserver<Item> {
  fn next(&mut self, value: Item) { self.last = Some(value); }

  fn error(self, err: RxError) { let _ = self.sender.send(Err(err)); }

  fn complete(self) {
    let _ = self.sender.send(self.last.ok_or(RxError::NotEnoughEmissions));
  }

  fn set_upstream(&mut self, _upstream: Disposable) {}

  fn is_disposed(&self) -> bool { self.sender.is_canceled() }
}
