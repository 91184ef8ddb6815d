// SPDX-License-Identifier: MIT OR Apache-2.0

//! Which organisation currently represents a defendant.
//!
//! A defendant is represented by at most one organisation at a time. Associating a different
//! organisation closes the current association first, closed associations stay in the history.
//! While a legal aid application is pending the defendant is locked and no organisation can be
//! associated.
use counsel_core::command::{
    AssociateOrganisation, DisassociateOrganisation, LockForLaa, UnlockForLaa,
};
use counsel_core::permission::{for_association, invert};
use counsel_core::{
    Actor, AssociationEvent, DefendantId, Event, OrganisationId, PermissionFact,
    RepresentationType, SourceId, Timestamp, UserId, reason,
};

use crate::aggregate::{Aggregate, apply_all};
use crate::policy::GroupPolicy;

/// One period of representation.
#[derive(Clone, Debug, PartialEq)]
pub struct Association {
    pub organisation_id: OrganisationId,
    pub organisation_name: String,
    pub representation_type: RepresentationType,
    pub laa_contract_number: Option<String>,
    pub associated_by: UserId,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub permissions: Vec<PermissionFact>,
}

impl Association {
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssociationState {
    associations: Vec<Association>,
    locked: Option<String>,
}

impl AssociationState {
    /// The association currently in effect.
    pub fn active(&self) -> Option<&Association> {
        self.associations.iter().rev().find(|a| a.is_active())
    }

    /// All associations in the order they started.
    pub fn history(&self) -> &[Association] {
        &self.associations
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Contract number of the pending legal aid application, if locked.
    pub fn laa_contract_number(&self) -> Option<&str> {
        self.locked.as_deref()
    }
}

impl Aggregate for AssociationState {
    type Event = AssociationEvent;

    fn extract(event: &Event) -> Option<&Self::Event> {
        event.as_association()
    }

    fn apply(mut y: Self, event: &Self::Event) -> Self {
        match event {
            AssociationEvent::OrganisationAssociated {
                organisation_id,
                organisation_name,
                representation_type,
                laa_contract_number,
                associated_by,
                start_date,
                permissions,
                ..
            } => {
                y.associations.push(Association {
                    organisation_id: *organisation_id,
                    organisation_name: organisation_name.clone(),
                    representation_type: *representation_type,
                    laa_contract_number: laa_contract_number.clone(),
                    associated_by: *associated_by,
                    start_date: *start_date,
                    end_date: None,
                    permissions: permissions.clone(),
                });
            }
            AssociationEvent::OrganisationDisassociated {
                organisation_id,
                end_date,
                ..
            } => {
                if let Some(active) = y
                    .associations
                    .iter_mut()
                    .rev()
                    .find(|a| a.is_active() && &a.organisation_id == organisation_id)
                {
                    active.end_date = Some(*end_date);
                }
            }
            AssociationEvent::DefendantDefenceAssociationLockedForLaa {
                laa_contract_number,
                ..
            } => {
                y.locked = Some(laa_contract_number.clone());
            }
            AssociationEvent::DefendantDefenceAssociationUnlockedForLaa { .. } => {
                y.locked = None;
            }
            AssociationEvent::AssociationFailed { .. }
            | AssociationEvent::DisassociationFailed { .. } => (),
        }

        y
    }
}

fn disassociated(
    defendant_id: DefendantId,
    active: &Association,
    disassociated_by: UserId,
    now: Timestamp,
) -> AssociationEvent {
    AssociationEvent::OrganisationDisassociated {
        defendant_id,
        organisation_id: active.organisation_id,
        disassociated_by,
        end_date: now,
        permissions: invert(&active.permissions),
    }
}

/// Associate an organisation with a defendant.
///
/// Re-associating the organisation already in effect emits nothing. Associating a different
/// organisation emits the disassociation of the current one followed by the new association.
pub fn associate(
    y: AssociationState,
    command: &AssociateOrganisation,
    now: Timestamp,
) -> (AssociationState, Vec<AssociationEvent>) {
    if y.is_locked() {
        let events = vec![AssociationEvent::AssociationFailed {
            defendant_id: command.defendant_id,
            organisation_id: command.organisation_id,
            reason: reason::LOCKED_FOR_LAA.to_string(),
        }];
        return (y, events);
    }

    let mut events = Vec::with_capacity(2);
    match y.active().cloned() {
        Some(active) if active.organisation_id == command.organisation_id => {
            return (y, events);
        }
        Some(active) => {
            events.push(disassociated(
                command.defendant_id,
                &active,
                command.requester,
                now,
            ));
        }
        None => (),
    }

    events.push(AssociationEvent::OrganisationAssociated {
        defendant_id: command.defendant_id,
        organisation_id: command.organisation_id,
        organisation_name: command.organisation_name.clone(),
        representation_type: command.representation_type,
        laa_contract_number: command.laa_contract_number.clone(),
        associated_by: command.requester,
        start_date: now,
        permissions: for_association(
            command.defendant_id,
            SourceId::Organisation(command.organisation_id),
        ),
    });

    (apply_all(y, &events), events)
}

/// End the association of an organisation with a defendant.
///
/// Members of the associated organisation and court staff may disassociate, requesters unknown
/// to the directory never may.
pub fn disassociate(
    y: AssociationState,
    command: &DisassociateOrganisation,
    requester: Option<&Actor>,
    policy: &GroupPolicy,
    now: Timestamp,
) -> (AssociationState, Vec<AssociationEvent>) {
    let failed = |reason: String| {
        vec![AssociationEvent::DisassociationFailed {
            defendant_id: command.defendant_id,
            organisation_id: command.organisation_id,
            reason,
        }]
    };

    // Ensure that the organisation is the one currently in effect.
    let active = match y.active().cloned() {
        Some(active) if active.organisation_id == command.organisation_id => active,
        _ => {
            let events = failed(reason::not_currently_associated(&command.organisation_id));
            return (y, events);
        }
    };

    // Ensure that the requester may act for the organisation.
    let authorized = requester.is_some_and(|requester| {
        requester.organisation_id() == Some(active.organisation_id)
            || policy.is_hmcts_staff(&requester.groups)
    });
    if !authorized {
        let events = failed(reason::UNAUTHORIZED.to_string());
        return (y, events);
    }

    let events = vec![disassociated(
        command.defendant_id,
        &active,
        command.requester,
        now,
    )];

    (apply_all(y, &events), events)
}

/// Lock the defendant while a legal aid application is pending.
pub fn lock_for_laa(
    y: AssociationState,
    command: &LockForLaa,
) -> (AssociationState, Vec<AssociationEvent>) {
    let events = vec![AssociationEvent::DefendantDefenceAssociationLockedForLaa {
        defendant_id: command.defendant_id,
        laa_contract_number: command.laa_contract_number.clone(),
    }];

    (apply_all(y, &events), events)
}

pub fn unlock_for_laa(
    y: AssociationState,
    command: &UnlockForLaa,
) -> (AssociationState, Vec<AssociationEvent>) {
    if !y.is_locked() {
        return (y, vec![]);
    }

    let events = vec![AssociationEvent::DefendantDefenceAssociationUnlockedForLaa {
        defendant_id: command.defendant_id,
    }];

    (apply_all(y, &events), events)
}
