//! What a subject remembers for subscribers that join late.

use std::collections::VecDeque;

use crate::scheduler::{Duration, Instant};

/// Values a subject keeps and replays to every new subscriber.
pub trait History<Item>: Send + 'static {
  /// Remembers a value just broadcast.
  fn record(&mut self, value: &Item, now: Instant);

  /// The values to replay to a subscriber joining now.
  ///
  /// `terminated` tells whether the subject already errored or completed.
  fn replay(&mut self, now: Instant, terminated: bool) -> Vec<Item>;
}

/// Remembers nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHistory;

impl<Item> History<Item> for NoHistory {
  #[inline]
  fn record(&mut self, _: &Item, _: Instant) {}

  #[inline]
  fn replay(&mut self, _: Instant, _: bool) -> Vec<Item> { Vec::new() }
}

/// The current value, replayed until the subject terminates.
#[derive(Clone, Debug)]
pub struct Latest<Item>(pub(crate) Item);

impl<Item: Clone + Send + 'static> History<Item> for Latest<Item> {
  fn record(&mut self, value: &Item, _: Instant) { self.0 = value.clone(); }

  fn replay(&mut self, _: Instant, terminated: bool) -> Vec<Item> {
    if terminated { Vec::new() } else { vec![self.0.clone()] }
  }
}

/// The most recent values, bounded by count and/or age.
#[derive(Clone, Debug)]
pub struct Window<Item> {
  capacity: Option<usize>,
  max_age: Option<Duration>,
  buffer: VecDeque<(Instant, Item)>,
}

impl<Item> Window<Item> {
  pub fn new(capacity: Option<usize>, max_age: Option<Duration>) -> Self {
    Self { capacity, max_age, buffer: VecDeque::new() }
  }

  fn evict(&mut self, now: Instant) {
    if let Some(capacity) = self.capacity {
      while self.buffer.len() > capacity {
        self.buffer.pop_front();
      }
    }
    if let Some(max_age) = self.max_age {
      let expired = |at: &Instant| now.saturating_duration_since(*at) > max_age;
      while self.buffer.front().map_or(false, |(at, _)| expired(at)) {
        self.buffer.pop_front();
      }
    }
  }
}

impl<Item: Clone + Send + 'static> History<Item> for Window<Item> {
  fn record(&mut self, value: &Item, now: Instant) {
    self.buffer.push_back((now, value.clone()));
    self.evict(now);
  }

  fn replay(&mut self, now: Instant, _: bool) -> Vec<Item> {
    self.evict(now);
    self.buffer.iter().map(|(_, v)| v.clone()).collect()
  }
}
