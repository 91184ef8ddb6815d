// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_core::Envelope;
use tokio::sync::broadcast;
use tracing::trace;

use crate::traits::EventPublisher;

const DEFAULT_CAPACITY: usize = 1024;

/// Publishes committed envelopes on a `tokio` broadcast channel.
///
/// Receivers falling more than `capacity` envelopes behind miss the oldest ones and are told so
/// with a lagged error.
#[derive(Clone, Debug)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Envelope>,
}

impl BroadcastPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, envelope: &Envelope) {
        if self.tx.send(envelope.clone()).is_err() {
            trace!(
                "no subscribers for {} event on {}",
                envelope.kind(),
                envelope.stream_id
            );
        }
    }
}
