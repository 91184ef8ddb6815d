// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commands accepted by the engine.
//!
//! Commands only carry identifiers and the values the caller supplied, everything else is
//! resolved from history and the injected collaborators while the command is handled.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::case::{AssignmentRole, Offence, RepresentationType, Representing};
use crate::error::InputError;
use crate::ids::{CaseId, DefenceClientId, DefendantId, HearingId, OrganisationId, UserId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateOrganisation {
    pub defendant_id: DefendantId,
    pub organisation_id: OrganisationId,
    pub organisation_name: String,
    pub representation_type: RepresentationType,
    pub laa_contract_number: Option<String>,
    #[serde(rename = "requesterUserId")]
    pub requester: UserId,
}

impl AssociateOrganisation {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.organisation_name.trim().is_empty() {
            return Err(InputError::EmptyField("organisationName"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisassociateOrganisation {
    pub defendant_id: DefendantId,
    pub organisation_id: OrganisationId,
    #[serde(rename = "requesterUserId")]
    pub requester: UserId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockForLaa {
    pub defendant_id: DefendantId,
    pub laa_contract_number: String,
}

impl LockForLaa {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.laa_contract_number.trim().is_empty() {
            return Err(InputError::EmptyField("laaContractNumber"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockForLaa {
    pub defendant_id: DefendantId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccess {
    pub defence_client_id: DefenceClientId,
    pub grantee_email: String,
    #[serde(rename = "granterUserId")]
    pub granter: UserId,
}

impl GrantAccess {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.grantee_email.trim().is_empty() {
            return Err(InputError::EmptyField("granteeEmail"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveGrantAccess {
    pub defence_client_id: DefenceClientId,
    #[serde(rename = "granteeUserId")]
    pub grantee: UserId,
    #[serde(rename = "requesterUserId")]
    pub requester: UserId,
}

/// Revoke every active grant on a defence client, issued when its defendant loses their
/// representing organisation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAllGrantAccess {
    pub defence_client_id: DefenceClientId,
    #[serde(rename = "removedByUserId")]
    pub removed_by: UserId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCase {
    pub case_id: CaseId,
    #[serde(rename = "assignorUserId")]
    pub assignor: UserId,
    pub assignee_email: String,
    pub representing: Representing,
    pub role: AssignmentRole,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl AssignCase {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.assignee_email.trim().is_empty() {
            return Err(InputError::EmptyField("assigneeEmail"));
        }
        Ok(())
    }
}

/// Case listed at a hearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingListing {
    pub case_id: CaseId,
    pub hearing_id: HearingId,
}

/// Assign the same advocate to every case listed in a batch of hearings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCaseByHearing {
    pub listings: Vec<HearingListing>,
    #[serde(rename = "assignorUserId")]
    pub assignor: UserId,
    pub assignee_email: String,
    pub representing: Representing,
    pub role: AssignmentRole,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl AssignCaseByHearing {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.listings.is_empty() {
            return Err(InputError::EmptyListings);
        }
        if self.assignee_email.trim().is_empty() {
            return Err(InputError::EmptyField("assigneeEmail"));
        }
        Ok(())
    }

    /// Single-case command for one of the listings.
    pub fn for_listing(&self, listing: &HearingListing) -> AssignCase {
        AssignCase {
            case_id: listing.case_id,
            assignor: self.assignor,
            assignee_email: self.assignee_email.clone(),
            representing: self.representing.clone(),
            role: self.role,
            expiry_date: self.expiry_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCaseAssignment {
    pub case_id: CaseId,
    #[serde(rename = "assigneeUserId")]
    pub assignee: UserId,
    #[serde(rename = "removedByUserId", default)]
    pub removed_by: Option<UserId>,
}

impl RemoveCaseAssignment {
    /// Fails when the remover is unknown, nothing may be loaded in that case.
    pub fn validate(&self) -> Result<UserId, InputError> {
        self.removed_by
            .ok_or(InputError::MissingField("removedByUserId"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDefendant {
    pub defendant_id: DefendantId,
    pub defence_client_id: DefenceClientId,
    pub case_id: CaseId,
    #[serde(default)]
    pub offences: Vec<Offence>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOffences {
    pub defendant_id: DefendantId,
    pub offences: Vec<Offence>,
}

/// Any command, as delivered by a transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum Command {
    AssociateOrganisation(AssociateOrganisation),
    DisassociateOrganisation(DisassociateOrganisation),
    LockForLaa(LockForLaa),
    UnlockForLaa(UnlockForLaa),
    GrantAccess(GrantAccess),
    RemoveGrantAccess(RemoveGrantAccess),
    RemoveAllGrantAccess(RemoveAllGrantAccess),
    AssignCase(AssignCase),
    AssignCaseByHearing(AssignCaseByHearing),
    RemoveCaseAssignment(RemoveCaseAssignment),
    LinkDefendant(LinkDefendant),
    RecordOffences(RecordOffences),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AssociateOrganisation(_) => "AssociateOrganisation",
            Command::DisassociateOrganisation(_) => "DisassociateOrganisation",
            Command::LockForLaa(_) => "LockForLaa",
            Command::UnlockForLaa(_) => "UnlockForLaa",
            Command::GrantAccess(_) => "GrantAccess",
            Command::RemoveGrantAccess(_) => "RemoveGrantAccess",
            Command::RemoveAllGrantAccess(_) => "RemoveAllGrantAccess",
            Command::AssignCase(_) => "AssignCase",
            Command::AssignCaseByHearing(_) => "AssignCaseByHearing",
            Command::RemoveCaseAssignment(_) => "RemoveCaseAssignment",
            Command::LinkDefendant(_) => "LinkDefendant",
            Command::RecordOffences(_) => "RecordOffences",
        }
    }

    /// Check required identifiers and values.
    pub fn validate(&self) -> Result<(), InputError> {
        match self {
            Command::AssociateOrganisation(command) => command.validate(),
            Command::LockForLaa(command) => command.validate(),
            Command::GrantAccess(command) => command.validate(),
            Command::AssignCase(command) => command.validate(),
            Command::AssignCaseByHearing(command) => command.validate(),
            Command::RemoveCaseAssignment(command) => command.validate().map(|_| ()),
            Command::DisassociateOrganisation(_)
            | Command::UnlockForLaa(_)
            | Command::RemoveGrantAccess(_)
            | Command::RemoveAllGrantAccess(_)
            | Command::LinkDefendant(_)
            | Command::RecordOffences(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::error::InputError;
    use crate::ids::{CaseId, UserId};

    use super::{Command, RemoveCaseAssignment};

    #[test]
    fn missing_remover_is_rejected() {
        let json = serde_json::json!({
            "command": "RemoveCaseAssignment",
            "caseId": CaseId::random(),
            "assigneeUserId": UserId::random(),
        });

        let command: Command = serde_json::from_value(json).unwrap();
        assert_matches!(
            command.validate(),
            Err(InputError::MissingField("removedByUserId"))
        );
    }

    #[test]
    fn remover_is_returned_when_present() {
        let removed_by = UserId::random();
        let command = RemoveCaseAssignment {
            case_id: CaseId::random(),
            assignee: UserId::random(),
            removed_by: Some(removed_by),
        };

        assert_eq!(command.validate(), Ok(removed_by));
    }
}
