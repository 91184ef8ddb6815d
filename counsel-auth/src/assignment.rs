// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advocates and organisations assigned to a case.
//!
//! Assignments exist on two levels. Every assigned advocate has an advocate-level record, and
//! their organisation has an organisation-level record which stays active as long as at least
//! one of its advocates is. Removing the last active advocate of an organisation also removes
//! the organisation.
use std::collections::BTreeMap;

use counsel_core::command::AssignCase;
use counsel_core::{
    Actor, AssignmentEvent, AssignmentRole, CaseId, Event, HearingId, OrganisationId,
    PersonDetails, Representing, Timestamp, UserId, reason,
};

use crate::aggregate::{Aggregate, apply_all};
use crate::policy::GroupPolicy;

#[derive(Clone, Debug, PartialEq)]
pub struct AdvocateAssignment {
    pub assignee: PersonDetails,
    pub organisation_id: OrganisationId,
    pub assignor_user_id: UserId,
    pub assignor_organisation_id: Option<OrganisationId>,
    pub representing: Representing,
    pub role: AssignmentRole,
    pub groups: Vec<String>,
    pub hearing_id: Option<HearingId>,
    pub assigned_date: Timestamp,
    pub expiry_date: Option<Timestamp>,
    pub removed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrganisationAssignment {
    pub organisation_id: OrganisationId,
    pub organisation_name: String,
    pub assignor_user_id: UserId,
    pub representing: Representing,
    pub role: AssignmentRole,
    pub assigned_date: Timestamp,
    pub removed: bool,
}

/// Assignment record which has reached its expiry date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExpiredRecord {
    Advocate(UserId),
    Organisation(OrganisationId),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssignmentState {
    advocates: BTreeMap<UserId, AdvocateAssignment>,
    organisations: BTreeMap<OrganisationId, OrganisationAssignment>,
}

impl AssignmentState {
    pub fn advocate(&self, user_id: &UserId) -> Option<&AdvocateAssignment> {
        self.advocates.get(user_id).filter(|advocate| !advocate.removed)
    }

    pub fn organisation(
        &self,
        organisation_id: &OrganisationId,
    ) -> Option<&OrganisationAssignment> {
        self.organisations
            .get(organisation_id)
            .filter(|organisation| !organisation.removed)
    }

    pub fn is_assigned(&self, user_id: &UserId) -> bool {
        self.advocate(user_id).is_some()
    }

    /// Active advocates of an organisation, ordered by user id.
    pub fn advocates_of(
        &self,
        organisation_id: &OrganisationId,
    ) -> impl Iterator<Item = &AdvocateAssignment> {
        self.advocates.values().filter(move |advocate| {
            !advocate.removed && &advocate.organisation_id == organisation_id
        })
    }

    pub fn active_advocates(&self) -> impl Iterator<Item = &AdvocateAssignment> {
        self.advocates.values().filter(|advocate| !advocate.removed)
    }

    pub fn active_organisations(&self) -> impl Iterator<Item = &OrganisationAssignment> {
        self.organisations
            .values()
            .filter(|organisation| !organisation.removed)
    }

    /// Expiry of an organisation-level record, the latest expiry of its active advocates.
    ///
    /// `None` if any of them never expires or the organisation is not active.
    pub fn organisation_expiry(&self, organisation_id: &OrganisationId) -> Option<Timestamp> {
        self.organisation(organisation_id)?;

        let mut latest = None;
        for advocate in self.advocates_of(organisation_id) {
            let expiry = advocate.expiry_date?;
            latest = latest.max(Some(expiry));
        }
        latest
    }

    /// Active records with an expiry date at or before `now`.
    pub fn expired_records(&self, now: Timestamp) -> Vec<(Timestamp, ExpiredRecord)> {
        let advocates = self.active_advocates().filter_map(|advocate| {
            advocate
                .expiry_date
                .filter(|expiry| *expiry <= now)
                .map(|expiry| (expiry, ExpiredRecord::Advocate(advocate.assignee.user_id)))
        });

        let organisations = self.active_organisations().filter_map(|organisation| {
            self.organisation_expiry(&organisation.organisation_id)
                .filter(|expiry| *expiry <= now)
                .map(|expiry| {
                    (
                        expiry,
                        ExpiredRecord::Organisation(organisation.organisation_id),
                    )
                })
        });

        let mut records: Vec<_> = advocates.chain(organisations).collect();
        records.sort();
        records
    }
}

impl Aggregate for AssignmentState {
    type Event = AssignmentEvent;

    fn extract(event: &Event) -> Option<&Self::Event> {
        event.as_assignment()
    }

    fn apply(mut y: Self, event: &Self::Event) -> Self {
        match event {
            AssignmentEvent::CaseAssignedToAdvocate {
                hearing_id,
                assignee,
                assignee_organisation,
                assignee_groups,
                assignor_user_id,
                assignor_organisation_id,
                representing,
                role,
                assigned_date,
                expiry_date,
                ..
            } => {
                y.advocates.insert(
                    assignee.user_id,
                    AdvocateAssignment {
                        assignee: assignee.clone(),
                        organisation_id: assignee_organisation.id,
                        assignor_user_id: *assignor_user_id,
                        assignor_organisation_id: *assignor_organisation_id,
                        representing: representing.clone(),
                        role: *role,
                        groups: assignee_groups.clone(),
                        hearing_id: *hearing_id,
                        assigned_date: *assigned_date,
                        expiry_date: *expiry_date,
                        removed: false,
                    },
                );
            }
            AssignmentEvent::CaseAssignedToOrganisation {
                organisation_id,
                organisation_name,
                assignor_user_id,
                representing,
                role,
                assigned_date,
                ..
            } => {
                y.organisations.insert(
                    *organisation_id,
                    OrganisationAssignment {
                        organisation_id: *organisation_id,
                        organisation_name: organisation_name.clone(),
                        assignor_user_id: *assignor_user_id,
                        representing: representing.clone(),
                        role: *role,
                        assigned_date: *assigned_date,
                        removed: false,
                    },
                );
            }
            AssignmentEvent::CaseAssignmentToAdvocateRemoved {
                assignee_user_id, ..
            } => {
                if let Some(advocate) = y.advocates.get_mut(assignee_user_id) {
                    advocate.removed = true;
                }
            }
            AssignmentEvent::CaseAssignmentToOrganisationRemoved {
                organisation_id, ..
            } => {
                if let Some(organisation) = y.organisations.get_mut(organisation_id) {
                    organisation.removed = true;
                }
            }
            AssignmentEvent::AssigneeNotFound { .. }
            | AssignmentEvent::AssigneeNotInAllowedGroups { .. }
            | AssignmentEvent::UserAlreadyAssigned { .. }
            | AssignmentEvent::UserNotAssigned { .. }
            | AssignmentEvent::AssigneeForProsecutionIsDefendingCase { .. }
            | AssignmentEvent::CaseAssignmentsByHearingListingFailed { .. } => (),
        }

        y
    }
}

/// Everything resolved from collaborators before an assignment is decided.
#[derive(Clone, Debug)]
pub struct AssignContext {
    /// Assignee looked up by the e-mail address in the command.
    pub assignee: Option<Actor>,

    /// Organisation of the assignor, if known.
    pub assignor_organisation_id: Option<OrganisationId>,

    /// Whether the assignee is defending the case.
    pub assignee_is_defending: bool,

    /// Hearing the assignment is made for.
    pub hearing_id: Option<HearingId>,
}

/// Assign an advocate to a case.
///
/// The organisation of the advocate is assigned along with them unless it already is.
pub fn assign_case(
    y: AssignmentState,
    command: &AssignCase,
    context: &AssignContext,
    policy: &GroupPolicy,
    now: Timestamp,
) -> (AssignmentState, Vec<AssignmentEvent>) {
    let case_id = command.case_id;

    let Some(assignee) = &context.assignee else {
        let events = vec![AssignmentEvent::AssigneeNotFound {
            case_id,
            email: command.assignee_email.clone(),
            reason: reason::USER_NOT_FOUND.to_string(),
        }];
        return (y, events);
    };

    let Some(organisation) = &assignee.organisation else {
        let events = vec![AssignmentEvent::AssigneeNotFound {
            case_id,
            email: command.assignee_email.clone(),
            reason: reason::ORGANISATION_NOT_FOUND.to_string(),
        }];
        return (y, events);
    };

    let assignee_user_id = assignee.user_id();

    if !policy.can_be_assigned(&assignee.groups) {
        let events = vec![AssignmentEvent::AssigneeNotInAllowedGroups {
            case_id,
            assignee_user_id,
            reason: reason::ASSIGNEE_NOT_IN_ALLOWED_GROUPS.to_string(),
        }];
        return (y, events);
    }

    if y.is_assigned(&assignee_user_id) {
        let events = vec![AssignmentEvent::UserAlreadyAssigned {
            case_id,
            assignee_user_id,
            reason: reason::USER_ALREADY_ASSIGNED.to_string(),
        }];
        return (y, events);
    }

    if command.role.is_prosecuting() && context.assignee_is_defending {
        let events = vec![AssignmentEvent::AssigneeForProsecutionIsDefendingCase {
            case_id,
            assignee_user_id,
            reason: reason::ASSIGNEE_DEFENDING_CASE.to_string(),
        }];
        return (y, events);
    }

    let mut events = Vec::with_capacity(2);
    events.push(AssignmentEvent::CaseAssignedToAdvocate {
        case_id,
        hearing_id: context.hearing_id,
        assignee: assignee.details.clone(),
        assignee_organisation: organisation.clone(),
        assignee_groups: assignee.groups.clone(),
        assignor_user_id: command.assignor,
        assignor_organisation_id: context.assignor_organisation_id,
        representing: command.representing.clone(),
        role: command.role,
        assigned_date: now,
        expiry_date: command.expiry_date,
    });

    if y.organisation(&organisation.id).is_none() {
        events.push(AssignmentEvent::CaseAssignedToOrganisation {
            case_id,
            organisation_id: organisation.id,
            organisation_name: organisation.name.clone(),
            assignor_user_id: command.assignor,
            representing: command.representing.clone(),
            role: command.role,
            assigned_date: now,
            expiry_date: command.expiry_date,
        });
    }

    (apply_all(y, &events), events)
}

/// Assign an advocate to one case listed at a hearing.
///
/// Rejections are reported as a listing failure carrying the hearing id and the reason of the
/// underlying rejection.
pub fn assign_case_for_hearing(
    y: AssignmentState,
    command: &AssignCase,
    hearing_id: HearingId,
    context: &AssignContext,
    policy: &GroupPolicy,
    now: Timestamp,
) -> (AssignmentState, Vec<AssignmentEvent>) {
    let context = AssignContext {
        hearing_id: Some(hearing_id),
        ..context.clone()
    };
    let (y, events) = assign_case(y, command, &context, policy, now);

    let failure = events.iter().find_map(|event| event.reason().map(str::to_string));
    match failure {
        Some(reason) => (
            y,
            vec![AssignmentEvent::CaseAssignmentsByHearingListingFailed {
                case_id: command.case_id,
                hearing_id,
                assignee_email: command.assignee_email.clone(),
                reason,
            }],
        ),
        None => (y, events),
    }
}

fn remove_advocate(
    y: &AssignmentState,
    case_id: CaseId,
    advocate: &AdvocateAssignment,
    removed_by: UserId,
    now: Timestamp,
) -> Vec<AssignmentEvent> {
    let mut events = vec![AssignmentEvent::CaseAssignmentToAdvocateRemoved {
        case_id,
        assignee_user_id: advocate.assignee.user_id,
        organisation_id: advocate.organisation_id,
        removed_by,
        removed_date: now,
    }];

    let remaining = y
        .advocates_of(&advocate.organisation_id)
        .filter(|other| other.assignee.user_id != advocate.assignee.user_id)
        .count();
    if remaining == 0 && y.organisation(&advocate.organisation_id).is_some() {
        events.push(AssignmentEvent::CaseAssignmentToOrganisationRemoved {
            case_id,
            organisation_id: advocate.organisation_id,
            removed_by,
            removed_date: now,
        });
    }

    events
}

/// Remove an advocate from a case, and their organisation if no other advocate of it remains.
pub fn remove_case_assignment(
    y: AssignmentState,
    case_id: CaseId,
    assignee: UserId,
    removed_by: UserId,
    now: Timestamp,
) -> (AssignmentState, Vec<AssignmentEvent>) {
    let Some(advocate) = y.advocate(&assignee).cloned() else {
        let events = vec![AssignmentEvent::UserNotAssigned {
            case_id,
            assignee_user_id: assignee,
            reason: reason::USER_NOT_ASSIGNED.to_string(),
        }];
        return (y, events);
    };

    let events = remove_advocate(&y, case_id, &advocate, removed_by, now);
    (apply_all(y, &events), events)
}

/// Remove expired records.
///
/// Expired organisation records take all their remaining advocates with them. Records removed
/// in the meantime are skipped.
pub fn expire(
    mut y: AssignmentState,
    case_id: CaseId,
    records: &[ExpiredRecord],
    removed_by: UserId,
    now: Timestamp,
) -> (AssignmentState, Vec<AssignmentEvent>) {
    let mut events = Vec::new();

    for record in records {
        let advocates: Vec<AdvocateAssignment> = match record {
            ExpiredRecord::Advocate(user_id) => y.advocate(user_id).cloned().into_iter().collect(),
            ExpiredRecord::Organisation(organisation_id) => {
                y.advocates_of(organisation_id).cloned().collect()
            }
        };

        for advocate in advocates {
            let removals = remove_advocate(&y, case_id, &advocate, removed_by, now);
            y = apply_all(y, &removals);
            events.extend(removals);
        }
    }

    (y, events)
}
