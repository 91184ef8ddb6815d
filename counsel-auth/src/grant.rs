// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secondary access to a defence client for users outside the representing organisation.
use std::collections::BTreeMap;

use counsel_core::command::{GrantAccess, RemoveGrantAccess};
use counsel_core::permission::{for_grant, invert};
use counsel_core::{
    Actor, CaseId, DefenceClientId, DefendantId, Event, GrantEvent, Organisation,
    OrganisationId, PermissionFact, PersonDetails, SourceId, UserId, reason,
};

use crate::aggregate::{Aggregate, apply_all};
use crate::policy::GroupPolicy;

#[derive(Clone, Debug, PartialEq)]
pub struct Grant {
    pub grantee: PersonDetails,
    pub grantee_organisation: Option<Organisation>,
    pub granter: PersonDetails,
    pub granter_organisation: Option<Organisation>,
    pub permissions: Vec<PermissionFact>,
    pub active: bool,
}

impl Grant {
    pub fn grantee_organisation_id(&self) -> Option<OrganisationId> {
        self.grantee_organisation.as_ref().map(|organisation| organisation.id)
    }
}

/// Grants on one defence client, keyed by grantee.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrantState {
    grants: BTreeMap<UserId, Grant>,
}

impl GrantState {
    /// The grant currently held by a user.
    pub fn active_grant(&self, grantee: &UserId) -> Option<&Grant> {
        self.grants.get(grantee).filter(|grant| grant.active)
    }

    /// All active grants ordered by grantee id.
    pub fn active_grants(&self) -> impl Iterator<Item = &Grant> {
        self.grants.values().filter(|grant| grant.active)
    }
}

impl Aggregate for GrantState {
    type Event = GrantEvent;

    fn extract(event: &Event) -> Option<&Self::Event> {
        event.as_grant()
    }

    fn apply(mut y: Self, event: &Self::Event) -> Self {
        match event {
            GrantEvent::AccessGranted {
                grantee,
                grantee_organisation,
                granter,
                granter_organisation,
                permissions,
                ..
            } => {
                y.grants.insert(
                    grantee.user_id,
                    Grant {
                        grantee: grantee.clone(),
                        grantee_organisation: grantee_organisation.clone(),
                        granter: granter.clone(),
                        granter_organisation: granter_organisation.clone(),
                        permissions: permissions.clone(),
                        active: true,
                    },
                );
            }
            GrantEvent::AccessGrantRemoved {
                grantee_user_id, ..
            } => {
                if let Some(grant) = y.grants.get_mut(grantee_user_id) {
                    grant.active = false;
                }
            }
            GrantEvent::UserNotFound { .. }
            | GrantEvent::GrantAccessFailed { .. }
            | GrantEvent::AccessGrantRemovalFailed { .. }
            | GrantEvent::AssigneeForDefenceIsProsecutingCase { .. } => (),
        }

        y
    }
}

/// Defendant and case a defence client belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientLink {
    pub defendant_id: DefendantId,
    pub case_id: CaseId,
}

/// Everything resolved from collaborators before a grant is decided.
#[derive(Clone, Debug)]
pub struct GrantContext {
    /// Grantee looked up by the e-mail address in the command.
    pub grantee: Option<Actor>,

    /// Granter looked up by user id, `None` if unknown to the directory.
    pub granter: Option<Actor>,

    pub link: Option<ClientLink>,

    /// Organisation currently associated with the defendant.
    pub associated_organisation: Option<OrganisationId>,

    /// Whether the grantee prosecutes the linked case.
    pub grantee_is_prosecuting: bool,
}

/// Grant a user access to a defence client.
///
/// Granting to a user who already holds an active grant emits nothing, the permission set of a
/// grant is fixed when it is created.
pub fn grant_access(
    y: GrantState,
    command: &GrantAccess,
    context: &GrantContext,
    policy: &GroupPolicy,
) -> (GrantState, Vec<GrantEvent>) {
    let defence_client_id = command.defence_client_id;

    let Some(grantee) = &context.grantee else {
        let events = vec![GrantEvent::UserNotFound {
            defence_client_id,
            email: command.grantee_email.clone(),
            reason: reason::USER_NOT_FOUND.to_string(),
        }];
        return (y, events);
    };

    if y.active_grant(&grantee.user_id()).is_some() {
        return (y, vec![]);
    }

    let failed = |reason: String| {
        vec![GrantEvent::GrantAccessFailed {
            defence_client_id,
            grantee_user_id: Some(grantee.user_id()),
            granter_user_id: command.granter,
            reason,
        }]
    };

    let Some(link) = context.link else {
        let events = failed(reason::defence_client_not_linked(&defence_client_id));
        return (y, events);
    };

    // Ensure that the granter either belongs to the representing organisation or is allowed to
    // grant within their own organisation.
    let authorized = context.granter.as_ref().is_some_and(|granter| {
        let is_representing = granter.organisation_id().is_some()
            && granter.organisation_id() == context.associated_organisation;
        is_representing
            || (policy.can_grant(&granter.groups) && granter.shares_organisation_with(grantee))
    });
    let Some(granter) = context.granter.as_ref().filter(|_| authorized) else {
        let events = failed(reason::UNAUTHORIZED.to_string());
        return (y, events);
    };

    let mut events = Vec::with_capacity(2);
    if context.grantee_is_prosecuting {
        events.push(GrantEvent::AssigneeForDefenceIsProsecutingCase {
            defence_client_id,
            user_id: grantee.user_id(),
            email: grantee.details.email.clone(),
            case_id: link.case_id,
        });
    }

    let classification = policy.classify(&grantee.groups);
    events.push(GrantEvent::AccessGranted {
        defence_client_id,
        defendant_id: link.defendant_id,
        grantee: grantee.details.clone(),
        grantee_organisation: grantee.organisation.clone(),
        granter: granter.details.clone(),
        granter_organisation: granter.organisation.clone(),
        permissions: for_grant(
            link.defendant_id,
            SourceId::User(grantee.user_id()),
            classification,
        ),
    });

    (apply_all(y, &events), events)
}

fn removed(defence_client_id: DefenceClientId, grant: &Grant, removed_by: UserId) -> GrantEvent {
    GrantEvent::AccessGrantRemoved {
        defence_client_id,
        grantee_user_id: grant.grantee.user_id,
        removed_by,
        permissions: invert(&grant.permissions),
    }
}

/// Revoke the grant held by a user.
///
/// Nothing is emitted when the user holds no active grant. Grantees may always revoke their
/// own grant.
pub fn remove_grant_access(
    y: GrantState,
    command: &RemoveGrantAccess,
    requester: Option<&Actor>,
    associated_organisation: Option<OrganisationId>,
    policy: &GroupPolicy,
) -> (GrantState, Vec<GrantEvent>) {
    let Some(grant) = y.active_grant(&command.grantee).cloned() else {
        return (y, vec![]);
    };

    let authorized = command.requester == command.grantee
        || requester.is_some_and(|requester| {
            let organisation_id = requester.organisation_id();
            let is_representing =
                organisation_id.is_some() && organisation_id == associated_organisation;
            let same_organisation =
                organisation_id.is_some() && organisation_id == grant.grantee_organisation_id();
            is_representing || (policy.can_remove(&requester.groups) && same_organisation)
        });

    if !authorized {
        let events = vec![GrantEvent::AccessGrantRemovalFailed {
            defence_client_id: command.defence_client_id,
            grantee_user_id: command.grantee,
            requester_user_id: command.requester,
            reason: reason::UNAUTHORIZED.to_string(),
        }];
        return (y, events);
    }

    let events = vec![removed(command.defence_client_id, &grant, command.requester)];
    (apply_all(y, &events), events)
}

/// Revoke every active grant, one complete removal event per grantee.
pub fn remove_all_grant_access(
    y: GrantState,
    defence_client_id: DefenceClientId,
    removed_by: UserId,
) -> (GrantState, Vec<GrantEvent>) {
    let events: Vec<GrantEvent> = y
        .active_grants()
        .map(|grant| removed(defence_client_id, grant, removed_by))
        .collect();

    (apply_all(y, &events), events)
}
