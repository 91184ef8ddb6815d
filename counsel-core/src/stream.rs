// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ids::{CaseId, DefenceClientId, DefendantId};

/// Identifier of an event stream, each entity instance owns exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum StreamId {
    /// Representation association of a defendant.
    Association(DefendantId),

    /// Secondary access grants on a defence client.
    Grant(DefenceClientId),

    /// Advocate and organisation assignments on a case.
    Assignment(CaseId),

    /// Case and offence link of a defendant.
    Link(DefendantId),

    /// Reverse lookup from a defence client to its defendant.
    DefenceClient(DefenceClientId),
}

/// Stream type, used to enumerate all streams of one entity type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    Association,
    Grant,
    Assignment,
    Link,
    DefenceClient,
}

impl StreamId {
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamId::Association(_) => StreamKind::Association,
            StreamId::Grant(_) => StreamKind::Grant,
            StreamId::Assignment(_) => StreamKind::Assignment,
            StreamId::Link(_) => StreamKind::Link,
            StreamId::DefenceClient(_) => StreamKind::DefenceClient,
        }
    }
}

impl Display for StreamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamId::Association(id) => write!(f, "association/{id}"),
            StreamId::Grant(id) => write!(f, "grant/{id}"),
            StreamId::Assignment(id) => write!(f, "assignment/{id}"),
            StreamId::Link(id) => write!(f, "link/{id}"),
            StreamId::DefenceClient(id) => write!(f, "defence-client/{id}"),
        }
    }
}
