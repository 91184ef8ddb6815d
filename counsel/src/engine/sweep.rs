// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use counsel_auth::assignment::{AssignmentState, ExpiredRecord, expire};
use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::{CaseId, Envelope, StreamId, StreamKind, Timestamp};
use counsel_store::{EventPublisher, EventStore};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::engine::Engine;
use crate::error::EngineError;

/// What one expiry sweep removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    /// Number of expired records picked up by the sweep.
    pub expired: usize,

    /// Removal events appended across all cases.
    pub envelopes: Vec<Envelope>,

    /// Cases whose assignments changed while the sweep ran, left for the next sweep.
    pub skipped: Vec<CaseId>,
}

struct Candidate {
    expiry: Timestamp,
    case_id: CaseId,
    record: ExpiredRecord,
}

impl<S, D, A, P, K> Engine<S, D, A, P, K>
where
    S: EventStore,
    D: IdentityDirectory,
    A: CaseAuthority,
    P: EventPublisher,
    K: Clock,
{
    /// Remove assignments whose expiry date has passed.
    ///
    /// Picks the oldest expired records across all cases, at most
    /// [`Config::expiry_batch_size`](crate::Config::expiry_batch_size) of them, and removes them
    /// on behalf of the configured system user. Records removed in the meantime are skipped, so
    /// the sweep can safely run again after a failure. A case written to concurrently is
    /// reported in [`SweepReport::skipped`] and does not stop the other cases.
    pub async fn expiry_sweep(&self) -> Result<SweepReport, EngineError<S, D, A>> {
        let now = self.now();
        let stream_ids = self
            .store()
            .stream_ids(StreamKind::Assignment)
            .await
            .map_err(EngineError::Store)?;

        let mut candidates = Vec::new();
        let mut states = BTreeMap::new();
        for stream in stream_ids {
            let StreamId::Assignment(case_id) = stream else {
                continue;
            };

            let (y, version) = self.load::<AssignmentState>(&stream).await?;
            let expired = y.expired_records(now);
            if expired.is_empty() {
                continue;
            }

            candidates.extend(expired.into_iter().map(|(expiry, record)| Candidate {
                expiry,
                case_id,
                record,
            }));
            states.insert(case_id, (y, version));
        }

        candidates.sort_by_key(|c| (c.expiry, c.case_id, c.record));
        candidates.truncate(self.config().expiry_batch_size);

        let mut batches: BTreeMap<CaseId, Vec<ExpiredRecord>> = BTreeMap::new();
        for candidate in &candidates {
            batches
                .entry(candidate.case_id)
                .or_default()
                .push(candidate.record);
        }

        let mut report = SweepReport {
            expired: candidates.len(),
            ..SweepReport::default()
        };
        let removed_by = self.config().system_user_id;

        for (case_id, records) in batches {
            let Some((y, version)) = states.remove(&case_id) else {
                continue;
            };

            let (_, events) = expire(y, case_id, &records, removed_by, now);
            debug!(
                "expire {} records on case {}, {} removals",
                records.len(),
                case_id,
                events.len()
            );
            let stream = StreamId::Assignment(case_id);
            match self.commit(stream, version, events, now).await {
                Ok(envelopes) => report.envelopes.extend(envelopes),
                Err(EngineError::VersionConflict { .. }) => {
                    warn!("skip {} after version conflict", stream);
                    report.skipped.push(case_id);
                }
                Err(err) => return Err(err),
            }
        }

        if report.expired > 0 {
            info!(
                "expiry sweep removed {} assignments",
                report.envelopes.len()
            );
        }

        Ok(report)
    }
}
