// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory event store.
use std::collections::BTreeMap;
use std::sync::Arc;

use counsel_core::{Envelope, StreamId, StreamKind};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::traits::{AppendOutcome, EventStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("envelope for stream {actual} appended to stream {expected}")]
    StreamMismatch {
        expected: StreamId,
        actual: StreamId,
    },

    #[error("envelope with version {actual} appended to {stream}, expected version {expected}")]
    NonContiguousVersion {
        stream: StreamId,
        expected: u64,
        actual: u64,
    },
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    streams: BTreeMap<StreamId, Vec<Envelope>>,
}

/// Event store keeping all streams in memory.
///
/// Cloning the store yields another handle to the same streams.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version of a stream, `0` if nothing was appended yet.
    pub async fn version(&self, stream: &StreamId) -> u64 {
        let inner = self.inner.read().await;
        inner
            .streams
            .get(stream)
            .map_or(0, |envelopes| envelopes.len() as u64)
    }
}

impl EventStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn load(&self, stream: &StreamId) -> Result<Vec<Envelope>, Self::Error> {
        let inner = self.inner.read().await;
        Ok(inner.streams.get(stream).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        stream: &StreamId,
        expected_version: u64,
        envelopes: Vec<Envelope>,
    ) -> Result<AppendOutcome, Self::Error> {
        // Malformed batches are rejected before the stream is touched.
        for (offset, envelope) in envelopes.iter().enumerate() {
            if &envelope.stream_id != stream {
                return Err(MemoryStoreError::StreamMismatch {
                    expected: *stream,
                    actual: envelope.stream_id,
                });
            }

            let version = expected_version + offset as u64 + 1;
            if envelope.version != version {
                return Err(MemoryStoreError::NonContiguousVersion {
                    stream: *stream,
                    expected: version,
                    actual: envelope.version,
                });
            }
        }

        let mut inner = self.inner.write().await;
        let log = inner.streams.entry(*stream).or_default();

        let actual = log.len() as u64;
        if actual != expected_version {
            return Ok(AppendOutcome::Conflict { actual });
        }

        log.extend(envelopes);
        Ok(AppendOutcome::Appended {
            version: log.len() as u64,
        })
    }

    async fn stream_ids(&self, kind: StreamKind) -> Result<Vec<StreamId>, Self::Error> {
        let inner = self.inner.read().await;
        Ok(inner
            .streams
            .iter()
            .filter(|(id, envelopes)| id.kind() == kind && !envelopes.is_empty())
            .map(|(id, _)| *id)
            .collect())
    }
}
