use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use super::Shared;

/// Cumulative counters for one executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub cumulative_requested: u64,
    pub cumulative_executed: u64,
}

impl Metrics {
    /// Submissions that have not completed yet.
    #[must_use]
    pub const fn in_flight(&self) -> u64 {
        self.cumulative_requested
            .saturating_sub(self.cumulative_executed)
    }
}

/// Per-subscriber channels fed on every counter change.
#[derive(Default)]
pub(super) struct MetricsHub {
    next_id: u64,
    subscribers: Vec<(u64, mpsc::UnboundedSender<Metrics>)>,
}

impl MetricsHub {
    /// Registers a subscriber and queues `current` as its first value.
    pub(super) fn subscribe(&mut self, current: Metrics) -> (u64, mpsc::UnboundedReceiver<Metrics>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        if sender.send(current).is_ok() {
            self.subscribers.push((id, sender));
        }
        (id, receiver)
    }

    pub(super) fn publish(&mut self, metrics: Metrics) {
        self.subscribers
            .retain(|(_, sender)| sender.send(metrics).is_ok());
    }

    pub(super) fn unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(existing, _)| *existing != id);
    }

    pub(super) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

/// Live metrics feed for one subscriber.
///
/// Yields the counters as they were at subscription time, then one value per
/// change. Ends once the executor is gone. Dropping the stream unsubscribes.
pub struct MetricsStream {
    id: u64,
    receiver: mpsc::UnboundedReceiver<Metrics>,
    owner: Weak<Shared>,
}

impl MetricsStream {
    pub(super) const fn new(
        id: u64,
        receiver: mpsc::UnboundedReceiver<Metrics>,
        owner: Weak<Shared>,
    ) -> Self {
        Self {
            id,
            receiver,
            owner,
        }
    }

    /// Waits for the next value; `None` once the executor has been dropped.
    pub async fn next_update(&mut self) -> Option<Metrics> {
        self.receiver.recv().await
    }

    /// Returns an already queued value without waiting.
    pub fn try_next_update(&mut self) -> Option<Metrics> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for MetricsStream {
    type Item = Metrics;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for MetricsStream {
    fn drop(&mut self) {
        if let Some(shared) = self.owner.upgrade() {
            shared.lock_state().metrics_hub.unsubscribe(self.id);
        }
    }
}
