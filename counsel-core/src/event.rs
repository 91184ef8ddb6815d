// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events, the wire contract other systems depend on.
//!
//! Events are the only permitted mutation of an entity. Each event names the entity it belongs
//! to, the [`Envelope`] adds version and UTC timestamp when it is recorded. Serialised events
//! carry their kind in a `kind` field next to camel-cased fields, for example
//! `{"kind":"OrganisationAssociated","defendantId":...}`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::case::{AssignmentRole, Offence, RepresentationType, Representing};
use crate::ids::{CaseId, DefenceClientId, DefendantId, HearingId, OrganisationId, UserId};
use crate::permission::PermissionFact;
use crate::person::{Organisation, PersonDetails};
use crate::stream::StreamId;

/// A recorded event with its position in the owning stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub stream_id: StreamId,

    /// Position in the stream, starting at 1.
    pub version: u64,

    pub recorded_at: DateTime<Utc>,

    pub event: Event,
}

impl Envelope {
    pub fn kind(&self) -> &'static str {
        self.event.kind()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Association(AssociationEvent),
    Grant(GrantEvent),
    Assignment(AssignmentEvent),
    Link(LinkEvent),
}

impl Event {
    /// Kind tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Association(event) => event.kind(),
            Event::Grant(event) => event.kind(),
            Event::Assignment(event) => event.kind(),
            Event::Link(event) => event.kind(),
        }
    }

    /// Stream of the entity owning this event.
    pub fn stream_id(&self) -> StreamId {
        match self {
            Event::Association(event) => StreamId::Association(event.defendant_id()),
            Event::Grant(event) => StreamId::Grant(event.defence_client_id()),
            Event::Assignment(event) => StreamId::Assignment(event.case_id()),
            Event::Link(event) => event.stream_id(),
        }
    }

    /// Return `true` if this event records a rejected command.
    pub fn is_failure(&self) -> bool {
        match self {
            Event::Association(event) => event.is_failure(),
            Event::Grant(event) => event.is_failure(),
            Event::Assignment(event) => event.is_failure(),
            Event::Link(event) => event.is_failure(),
        }
    }

    pub fn as_association(&self) -> Option<&AssociationEvent> {
        match self {
            Event::Association(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_grant(&self) -> Option<&GrantEvent> {
        match self {
            Event::Grant(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&AssignmentEvent> {
        match self {
            Event::Assignment(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkEvent> {
        match self {
            Event::Link(event) => Some(event),
            _ => None,
        }
    }
}

impl From<AssociationEvent> for Event {
    fn from(event: AssociationEvent) -> Self {
        Event::Association(event)
    }
}

impl From<GrantEvent> for Event {
    fn from(event: GrantEvent) -> Self {
        Event::Grant(event)
    }
}

impl From<AssignmentEvent> for Event {
    fn from(event: AssignmentEvent) -> Self {
        Event::Assignment(event)
    }
}

impl From<LinkEvent> for Event {
    fn from(event: LinkEvent) -> Self {
        Event::Link(event)
    }
}

/// Events of a defendant's representation association.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum AssociationEvent {
    OrganisationAssociated {
        defendant_id: DefendantId,
        organisation_id: OrganisationId,
        organisation_name: String,
        representation_type: RepresentationType,
        laa_contract_number: Option<String>,
        associated_by: UserId,
        start_date: DateTime<Utc>,
        permissions: Vec<PermissionFact>,
    },
    OrganisationDisassociated {
        defendant_id: DefendantId,
        organisation_id: OrganisationId,
        disassociated_by: UserId,
        end_date: DateTime<Utc>,
        permissions: Vec<PermissionFact>,
    },
    AssociationFailed {
        defendant_id: DefendantId,
        organisation_id: OrganisationId,
        reason: String,
    },
    DisassociationFailed {
        defendant_id: DefendantId,
        organisation_id: OrganisationId,
        reason: String,
    },
    DefendantDefenceAssociationLockedForLaa {
        defendant_id: DefendantId,
        laa_contract_number: String,
    },
    DefendantDefenceAssociationUnlockedForLaa {
        defendant_id: DefendantId,
    },
}

impl AssociationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AssociationEvent::OrganisationAssociated { .. } => "OrganisationAssociated",
            AssociationEvent::OrganisationDisassociated { .. } => "OrganisationDisassociated",
            AssociationEvent::AssociationFailed { .. } => "AssociationFailed",
            AssociationEvent::DisassociationFailed { .. } => "DisassociationFailed",
            AssociationEvent::DefendantDefenceAssociationLockedForLaa { .. } => {
                "DefendantDefenceAssociationLockedForLaa"
            }
            AssociationEvent::DefendantDefenceAssociationUnlockedForLaa { .. } => {
                "DefendantDefenceAssociationUnlockedForLaa"
            }
        }
    }

    pub fn defendant_id(&self) -> DefendantId {
        match self {
            AssociationEvent::OrganisationAssociated { defendant_id, .. }
            | AssociationEvent::OrganisationDisassociated { defendant_id, .. }
            | AssociationEvent::AssociationFailed { defendant_id, .. }
            | AssociationEvent::DisassociationFailed { defendant_id, .. }
            | AssociationEvent::DefendantDefenceAssociationLockedForLaa { defendant_id, .. }
            | AssociationEvent::DefendantDefenceAssociationUnlockedForLaa { defendant_id } => {
                *defendant_id
            }
        }
    }

    /// Return `true` if this event records a rejected command.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AssociationEvent::AssociationFailed { .. }
                | AssociationEvent::DisassociationFailed { .. }
        )
    }
}

/// Events of the secondary access grants on a defence client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(clippy::large_enum_variant)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum GrantEvent {
    AccessGranted {
        defence_client_id: DefenceClientId,
        defendant_id: DefendantId,
        grantee: PersonDetails,
        grantee_organisation: Option<Organisation>,
        granter: PersonDetails,
        granter_organisation: Option<Organisation>,
        permissions: Vec<PermissionFact>,
    },
    AccessGrantRemoved {
        defence_client_id: DefenceClientId,
        grantee_user_id: UserId,
        removed_by: UserId,
        permissions: Vec<PermissionFact>,
    },
    UserNotFound {
        defence_client_id: DefenceClientId,
        email: String,
        reason: String,
    },
    GrantAccessFailed {
        defence_client_id: DefenceClientId,
        grantee_user_id: Option<UserId>,
        granter_user_id: UserId,
        reason: String,
    },
    AccessGrantRemovalFailed {
        defence_client_id: DefenceClientId,
        grantee_user_id: UserId,
        requester_user_id: UserId,
        reason: String,
    },
    AssigneeForDefenceIsProsecutingCase {
        defence_client_id: DefenceClientId,
        user_id: UserId,
        email: String,
        case_id: CaseId,
    },
}

impl GrantEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GrantEvent::AccessGranted { .. } => "AccessGranted",
            GrantEvent::AccessGrantRemoved { .. } => "AccessGrantRemoved",
            GrantEvent::UserNotFound { .. } => "UserNotFound",
            GrantEvent::GrantAccessFailed { .. } => "GrantAccessFailed",
            GrantEvent::AccessGrantRemovalFailed { .. } => "AccessGrantRemovalFailed",
            GrantEvent::AssigneeForDefenceIsProsecutingCase { .. } => {
                "AssigneeForDefenceIsProsecutingCase"
            }
        }
    }

    pub fn defence_client_id(&self) -> DefenceClientId {
        match self {
            GrantEvent::AccessGranted {
                defence_client_id, ..
            }
            | GrantEvent::AccessGrantRemoved {
                defence_client_id, ..
            }
            | GrantEvent::UserNotFound {
                defence_client_id, ..
            }
            | GrantEvent::GrantAccessFailed {
                defence_client_id, ..
            }
            | GrantEvent::AccessGrantRemovalFailed {
                defence_client_id, ..
            }
            | GrantEvent::AssigneeForDefenceIsProsecutingCase {
                defence_client_id, ..
            } => *defence_client_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            GrantEvent::UserNotFound { .. }
                | GrantEvent::GrantAccessFailed { .. }
                | GrantEvent::AccessGrantRemovalFailed { .. }
        )
    }
}

/// Events of the advocate and organisation assignments on a case.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum AssignmentEvent {
    CaseAssignedToAdvocate {
        case_id: CaseId,
        hearing_id: Option<HearingId>,
        assignee: PersonDetails,
        assignee_organisation: Organisation,
        assignee_groups: Vec<String>,
        assignor_user_id: UserId,
        assignor_organisation_id: Option<OrganisationId>,
        representing: Representing,
        role: AssignmentRole,
        assigned_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
    },
    CaseAssignedToOrganisation {
        case_id: CaseId,
        organisation_id: OrganisationId,
        organisation_name: String,
        assignor_user_id: UserId,
        representing: Representing,
        role: AssignmentRole,
        assigned_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
    },
    CaseAssignmentToAdvocateRemoved {
        case_id: CaseId,
        assignee_user_id: UserId,
        organisation_id: OrganisationId,
        removed_by: UserId,
        removed_date: DateTime<Utc>,
    },
    /// The misspelt kind tag is part of the published contract.
    #[serde(rename = "CaseAssigmentToOrganisationRemoved")]
    CaseAssignmentToOrganisationRemoved {
        case_id: CaseId,
        organisation_id: OrganisationId,
        removed_by: UserId,
        removed_date: DateTime<Utc>,
    },
    AssigneeNotFound {
        case_id: CaseId,
        email: String,
        reason: String,
    },
    AssigneeNotInAllowedGroups {
        case_id: CaseId,
        assignee_user_id: UserId,
        reason: String,
    },
    UserAlreadyAssigned {
        case_id: CaseId,
        assignee_user_id: UserId,
        reason: String,
    },
    UserNotAssigned {
        case_id: CaseId,
        assignee_user_id: UserId,
        reason: String,
    },
    AssigneeForProsecutionIsDefendingCase {
        case_id: CaseId,
        assignee_user_id: UserId,
        reason: String,
    },
    CaseAssignmentsByHearingListingFailed {
        case_id: CaseId,
        hearing_id: HearingId,
        assignee_email: String,
        reason: String,
    },
}

impl AssignmentEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AssignmentEvent::CaseAssignedToAdvocate { .. } => "CaseAssignedToAdvocate",
            AssignmentEvent::CaseAssignedToOrganisation { .. } => "CaseAssignedToOrganisation",
            AssignmentEvent::CaseAssignmentToAdvocateRemoved { .. } => {
                "CaseAssignmentToAdvocateRemoved"
            }
            AssignmentEvent::CaseAssignmentToOrganisationRemoved { .. } => {
                "CaseAssigmentToOrganisationRemoved"
            }
            AssignmentEvent::AssigneeNotFound { .. } => "AssigneeNotFound",
            AssignmentEvent::AssigneeNotInAllowedGroups { .. } => "AssigneeNotInAllowedGroups",
            AssignmentEvent::UserAlreadyAssigned { .. } => "UserAlreadyAssigned",
            AssignmentEvent::UserNotAssigned { .. } => "UserNotAssigned",
            AssignmentEvent::AssigneeForProsecutionIsDefendingCase { .. } => {
                "AssigneeForProsecutionIsDefendingCase"
            }
            AssignmentEvent::CaseAssignmentsByHearingListingFailed { .. } => {
                "CaseAssignmentsByHearingListingFailed"
            }
        }
    }

    pub fn case_id(&self) -> CaseId {
        match self {
            AssignmentEvent::CaseAssignedToAdvocate { case_id, .. }
            | AssignmentEvent::CaseAssignedToOrganisation { case_id, .. }
            | AssignmentEvent::CaseAssignmentToAdvocateRemoved { case_id, .. }
            | AssignmentEvent::CaseAssignmentToOrganisationRemoved { case_id, .. }
            | AssignmentEvent::AssigneeNotFound { case_id, .. }
            | AssignmentEvent::AssigneeNotInAllowedGroups { case_id, .. }
            | AssignmentEvent::UserAlreadyAssigned { case_id, .. }
            | AssignmentEvent::UserNotAssigned { case_id, .. }
            | AssignmentEvent::AssigneeForProsecutionIsDefendingCase { case_id, .. }
            | AssignmentEvent::CaseAssignmentsByHearingListingFailed { case_id, .. } => *case_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AssignmentEvent::AssigneeNotFound { .. }
                | AssignmentEvent::AssigneeNotInAllowedGroups { .. }
                | AssignmentEvent::UserAlreadyAssigned { .. }
                | AssignmentEvent::UserNotAssigned { .. }
                | AssignmentEvent::AssigneeForProsecutionIsDefendingCase { .. }
                | AssignmentEvent::CaseAssignmentsByHearingListingFailed { .. }
        )
    }

    /// Reason string of a failure event.
    pub fn reason(&self) -> Option<&str> {
        match self {
            AssignmentEvent::AssigneeNotFound { reason, .. }
            | AssignmentEvent::AssigneeNotInAllowedGroups { reason, .. }
            | AssignmentEvent::UserAlreadyAssigned { reason, .. }
            | AssignmentEvent::UserNotAssigned { reason, .. }
            | AssignmentEvent::AssigneeForProsecutionIsDefendingCase { reason, .. }
            | AssignmentEvent::CaseAssignmentsByHearingListingFailed { reason, .. } => {
                Some(reason)
            }
            _ => None,
        }
    }
}

/// Events linking a defendant to its case, defence client and offences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum LinkEvent {
    DefendantLinkedToCase {
        defendant_id: DefendantId,
        defence_client_id: DefenceClientId,
        case_id: CaseId,
        offences: Vec<Offence>,
    },
    DefendantLinkRejected {
        defendant_id: DefendantId,
        defence_client_id: DefenceClientId,
        case_id: CaseId,
        reason: String,
    },
    OffencesUpdated {
        defendant_id: DefendantId,
        offences: Vec<Offence>,
    },
    DefenceClientRegistered {
        defence_client_id: DefenceClientId,
        defendant_id: DefendantId,
    },
}

impl LinkEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LinkEvent::DefendantLinkedToCase { .. } => "DefendantLinkedToCase",
            LinkEvent::DefendantLinkRejected { .. } => "DefendantLinkRejected",
            LinkEvent::OffencesUpdated { .. } => "OffencesUpdated",
            LinkEvent::DefenceClientRegistered { .. } => "DefenceClientRegistered",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LinkEvent::DefendantLinkRejected { .. })
    }

    pub fn stream_id(&self) -> StreamId {
        match self {
            LinkEvent::DefendantLinkedToCase { defendant_id, .. }
            | LinkEvent::DefendantLinkRejected { defendant_id, .. }
            | LinkEvent::OffencesUpdated { defendant_id, .. } => StreamId::Link(*defendant_id),
            LinkEvent::DefenceClientRegistered {
                defence_client_id, ..
            } => StreamId::DefenceClient(*defence_client_id),
        }
    }
}
