// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces for loading, appending and publishing events.
use std::error::Error;

use counsel_core::{Envelope, StreamId, StreamKind};

/// Result of an append with an expected version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// All envelopes were written, the stream is now at `version`.
    Appended { version: u64 },

    /// Another writer got there first, nothing was written.
    Conflict { actual: u64 },
}

/// Append-only log of envelopes, one ordered stream per entity instance.
pub trait EventStore {
    type Error: Error;

    /// Load all envelopes of a stream in version order.
    ///
    /// Unknown streams are empty.
    fn load(&self, stream: &StreamId) -> impl Future<Output = Result<Vec<Envelope>, Self::Error>>;

    /// Append envelopes to a stream if its current version equals `expected_version`.
    ///
    /// Appends are atomic, either every envelope is written or none is. Envelopes must carry
    /// the given stream id and consecutive versions following `expected_version`.
    fn append(
        &self,
        stream: &StreamId,
        expected_version: u64,
        envelopes: Vec<Envelope>,
    ) -> impl Future<Output = Result<AppendOutcome, Self::Error>>;

    /// Identifiers of all non-empty streams of one kind.
    fn stream_ids(&self, kind: StreamKind)
    -> impl Future<Output = Result<Vec<StreamId>, Self::Error>>;
}

/// Fire-and-forget delivery of committed envelopes to subscribers.
pub trait EventPublisher {
    fn publish(&self, envelope: &Envelope);
}
