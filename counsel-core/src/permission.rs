// SPDX-License-Identifier: MIT OR Apache-2.0

//! Permission facts, the atomic unit of the authorization log.
//!
//! A permission fact states that a source (user or organisation) may perform an action on an
//! object belonging to a target defendant. Facts are never mutated. Revoking a permission emits
//! the same fact again with status `Deleted`, the currently held permissions are derived by
//! folding facts in order (see [`PermissionLedger`]).
use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{DefendantId, PermissionId, SourceId};

/// Namespace for deriving permission ids, the same inputs always yield the same id.
const PERMISSION_NAMESPACE: Uuid = Uuid::from_bytes([
    0x8f, 0x2b, 0x54, 0x0e, 0x61, 0x3c, 0x4d, 0x07, 0x9a, 0x1e, 0x5c, 0x72, 0xd4, 0x30, 0xb6, 0x19,
]);

/// Object a permission applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionObject {
    /// The defence client record of a defendant.
    DefenceClientRecord,

    /// Documents uploaded for a defendant.
    DefendantDocuments,
}

/// Action a permission allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PermissionAction {
    View,
    Upload,
}

/// Whether a fact adds or deletes a permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionStatus {
    Added,
    Deleted,
}

impl Display for PermissionObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PermissionObject::DefenceClientRecord => "defence_client_record",
            PermissionObject::DefendantDocuments => "defendant_documents",
        };

        write!(f, "{}", s)
    }
}

impl Display for PermissionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PermissionAction::View => "view",
            PermissionAction::Upload => "upload",
        };

        write!(f, "{}", s)
    }
}

/// How much access a grantee receives, decided from their group membership at grant time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// View and upload documents, view the defence client record.
    Full,

    /// View the defence client record only.
    Restricted,
}

/// Immutable (target, source, object, action, status) tuple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFact {
    pub id: PermissionId,
    pub target: DefendantId,
    pub source: SourceId,
    pub object: PermissionObject,
    pub action: PermissionAction,
    pub status: PermissionStatus,
}

impl PermissionFact {
    /// Create a fact with status `Added`.
    pub fn added(
        target: DefendantId,
        source: SourceId,
        object: PermissionObject,
        action: PermissionAction,
    ) -> Self {
        Self {
            id: permission_id(&target, &source, object, action),
            target,
            source,
            object,
            action,
            status: PermissionStatus::Added,
        }
    }

    /// The same fact with status `Deleted`.
    pub fn inverted(&self) -> Self {
        Self {
            status: PermissionStatus::Deleted,
            ..self.clone()
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self.status, PermissionStatus::Added)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.status, PermissionStatus::Deleted)
    }

    fn key(&self) -> PermissionKey {
        (self.target, self.source, self.object, self.action)
    }
}

fn permission_id(
    target: &DefendantId,
    source: &SourceId,
    object: PermissionObject,
    action: PermissionAction,
) -> PermissionId {
    let mut buffer = Vec::with_capacity(64);
    buffer.extend_from_slice(target.as_bytes());
    buffer.push(if source.is_user() { 0 } else { 1 });
    buffer.extend_from_slice(source.as_uuid().as_bytes());
    buffer.extend_from_slice(object.to_string().as_bytes());
    buffer.extend_from_slice(action.to_string().as_bytes());
    PermissionId::from_uuid(Uuid::new_v5(&PERMISSION_NAMESPACE, &buffer))
}

/// Full permission set for the organisation representing a defendant.
pub fn for_association(target: DefendantId, source: SourceId) -> Vec<PermissionFact> {
    vec![
        PermissionFact::added(
            target,
            source,
            PermissionObject::DefendantDocuments,
            PermissionAction::View,
        ),
        PermissionFact::added(
            target,
            source,
            PermissionObject::DefendantDocuments,
            PermissionAction::Upload,
        ),
        PermissionFact::added(
            target,
            source,
            PermissionObject::DefenceClientRecord,
            PermissionAction::View,
        ),
    ]
}

/// Permission set for a secondary access grant.
///
/// Fully classified grantees receive the same three facts an associated organisation holds,
/// everyone else may only view the defence client record.
pub fn for_grant(
    target: DefendantId,
    source: SourceId,
    classification: Classification,
) -> Vec<PermissionFact> {
    match classification {
        Classification::Full => for_association(target, source),
        Classification::Restricted => vec![PermissionFact::added(
            target,
            source,
            PermissionObject::DefenceClientRecord,
            PermissionAction::View,
        )],
    }
}

/// Turn every fact into its `Deleted` counterpart.
pub fn invert(facts: &[PermissionFact]) -> Vec<PermissionFact> {
    facts.iter().map(PermissionFact::inverted).collect()
}

type PermissionKey = (DefendantId, SourceId, PermissionObject, PermissionAction);

/// Derives currently held permissions from an ordered sequence of facts.
///
/// The most recent fact per (target, source, object, action) tuple wins.
#[derive(Clone, Debug, Default)]
pub struct PermissionLedger {
    latest: BTreeMap<PermissionKey, PermissionFact>,
}

impl PermissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record facts in the order they were emitted.
    pub fn record<'a>(&mut self, facts: impl IntoIterator<Item = &'a PermissionFact>) {
        for fact in facts {
            self.latest.insert(fact.key(), fact.clone());
        }
    }

    /// All permissions which are currently in effect.
    pub fn current(&self) -> Vec<&PermissionFact> {
        self.latest.values().filter(|fact| fact.is_added()).collect()
    }

    /// Return `true` if the given source currently holds the permission.
    pub fn allows(
        &self,
        target: DefendantId,
        source: SourceId,
        object: PermissionObject,
        action: PermissionAction,
    ) -> bool {
        self.latest
            .get(&(target, source, object, action))
            .is_some_and(PermissionFact::is_added)
    }
}
