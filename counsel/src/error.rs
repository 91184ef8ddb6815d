// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::{InputError, StreamId};
use counsel_store::EventStore;
use thiserror::Error;

/// Faults which abort a command, nothing is appended when one is returned.
#[derive(Debug, Error)]
pub enum EngineError<S, D, A>
where
    S: EventStore,
    D: IdentityDirectory,
    A: CaseAuthority,
{
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("event store error: {0}")]
    Store(S::Error),

    #[error("stream {stream} moved from version {expected} to {actual} while handling command")]
    VersionConflict {
        stream: StreamId,
        expected: u64,
        actual: u64,
    },

    #[error("identity directory error: {0}")]
    Directory(D::Error),

    #[error("case authority error: {0}")]
    Authority(A::Error),
}
