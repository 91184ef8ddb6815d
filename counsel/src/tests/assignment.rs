// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_matches::assert_matches;
use counsel_core::command::{AssignCase, AssignCaseByHearing, HearingListing, RemoveCaseAssignment};
use counsel_core::{
    Actor, AssignmentEvent, AssignmentRole, CaseId, Command, Envelope, Event, HearingId,
    InputError, OrganisationId, Representing, StreamId, UserId, reason,
};
use counsel_store::EventStore;

use crate::error::EngineError;
use crate::test_utils::{TestAuthority, TestDirectory, actor};
use crate::tests::Harness;

fn assign(case_id: CaseId, assignor: &Actor, assignee: &Actor, role: AssignmentRole) -> AssignCase {
    AssignCase {
        case_id,
        assignor: assignor.user_id(),
        assignee_email: assignee.details.email.clone(),
        representing: Representing::Cps,
        role,
        expiry_date: None,
    }
}

fn prosecutor(organisation_id: OrganisationId) -> Actor {
    actor(Some(organisation_id), &["Prosecutors"])
}

#[tokio::test]
async fn assign_through_handle() {
    let cps = OrganisationId::random();
    let assignor = prosecutor(cps);
    let assignee = prosecutor(cps);
    let harness = Harness::new(
        TestDirectory::new().with_actor(&assignor).with_actor(&assignee),
        TestAuthority::new(),
    );
    let case_id = CaseId::random();

    let envelopes = harness
        .engine
        .handle(Command::AssignCase(assign(
            case_id,
            &assignor,
            &assignee,
            AssignmentRole::Prosecuting,
        )))
        .await
        .unwrap();
    assert_eq!(envelopes.len(), 2);
    assert_matches!(
        &envelopes[0].event,
        Event::Assignment(AssignmentEvent::CaseAssignedToAdvocate {
            assignor_organisation_id: Some(organisation_id),
            assigned_date,
            ..
        }) if *organisation_id == cps && *assigned_date == envelopes[0].recorded_at
    );
    assert_matches!(
        &envelopes[1].event,
        Event::Assignment(AssignmentEvent::CaseAssignedToOrganisation { organisation_id, .. })
            if *organisation_id == cps
    );

    let y = harness.engine.assignments(case_id).await.unwrap();
    assert!(y.is_assigned(&assignee.user_id()));
    assert!(y.organisation(&cps).is_some());
}

#[tokio::test]
async fn unknown_assignee_is_recorded() {
    let assignor = prosecutor(OrganisationId::random());
    let harness = Harness::new(
        TestDirectory::new().with_actor(&assignor),
        TestAuthority::new(),
    );
    let case_id = CaseId::random();

    let envelopes = harness
        .engine
        .assign_case(AssignCase {
            case_id,
            assignor: assignor.user_id(),
            assignee_email: "nobody@example.org".to_string(),
            representing: Representing::Police,
            role: AssignmentRole::Prosecuting,
            expiry_date: None,
        })
        .await
        .unwrap();
    assert_matches!(
        &envelopes[..],
        [Envelope {
            event: Event::Assignment(AssignmentEvent::AssigneeNotFound { reason, .. }),
            ..
        }] if reason == reason::USER_NOT_FOUND
    );
}

#[tokio::test]
async fn defending_advocate_cannot_prosecute() {
    let case_id = CaseId::random();
    let assignor = prosecutor(OrganisationId::random());
    let advocate = actor(Some(OrganisationId::random()), &["Advocates"]);
    let harness = Harness::new(
        TestDirectory::new().with_actor(&assignor).with_actor(&advocate),
        TestAuthority::new().defending(advocate.user_id(), case_id),
    );

    let envelopes = harness
        .engine
        .assign_case(assign(case_id, &assignor, &advocate, AssignmentRole::Prosecuting))
        .await
        .unwrap();
    assert_matches!(
        &envelopes[..],
        [Envelope {
            event: Event::Assignment(AssignmentEvent::AssigneeForProsecutionIsDefendingCase {
                assignee_user_id,
                ..
            }),
            ..
        }] if *assignee_user_id == advocate.user_id()
    );

    // Defending the same case is allowed.
    let envelopes = harness
        .engine
        .assign_case(assign(case_id, &assignor, &advocate, AssignmentRole::Defending))
        .await
        .unwrap();
    assert_eq!(envelopes.len(), 2);
}

#[tokio::test]
async fn hearing_batch_reports_each_listing() {
    let cps = OrganisationId::random();
    let assignor = prosecutor(cps);
    let assignee = prosecutor(cps);
    let harness = Harness::new(
        TestDirectory::new().with_actor(&assignor).with_actor(&assignee),
        TestAuthority::new(),
    );

    // The advocate is already on the second case.
    let first = HearingListing {
        case_id: CaseId::random(),
        hearing_id: HearingId::random(),
    };
    let second = HearingListing {
        case_id: CaseId::random(),
        hearing_id: HearingId::random(),
    };
    harness
        .engine
        .assign_case(assign(
            second.case_id,
            &assignor,
            &assignee,
            AssignmentRole::Prosecuting,
        ))
        .await
        .unwrap();

    let outcomes = harness
        .engine
        .assign_case_by_hearing(AssignCaseByHearing {
            listings: vec![first, second],
            assignor: assignor.user_id(),
            assignee_email: assignee.details.email.clone(),
            representing: Representing::Cps,
            role: AssignmentRole::Prosecuting,
            expiry_date: None,
        })
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);

    assert_eq!(outcomes[0].listing, first);
    assert!(outcomes[0].is_assigned());
    assert_matches!(
        &outcomes[0].envelopes[0].event,
        Event::Assignment(AssignmentEvent::CaseAssignedToAdvocate { hearing_id: Some(id), .. })
            if *id == first.hearing_id
    );

    assert_eq!(outcomes[1].listing, second);
    assert_eq!(outcomes[1].failure(), Some(reason::USER_ALREADY_ASSIGNED));
    assert_matches!(
        &outcomes[1].envelopes[..],
        [Envelope {
            stream_id: StreamId::Assignment(case_id),
            event: Event::Assignment(AssignmentEvent::CaseAssignmentsByHearingListingFailed {
                hearing_id,
                ..
            }),
            ..
        }] if *case_id == second.case_id && *hearing_id == second.hearing_id
    );
}

#[tokio::test]
async fn empty_hearing_batch_is_rejected() {
    let harness = Harness::new(TestDirectory::new(), TestAuthority::new());
    let result = harness
        .engine
        .handle(Command::AssignCaseByHearing(AssignCaseByHearing {
            listings: vec![],
            assignor: UserId::random(),
            assignee_email: "someone@example.org".to_string(),
            representing: Representing::Cps,
            role: AssignmentRole::Prosecuting,
            expiry_date: None,
        }))
        .await;
    assert_matches!(result, Err(EngineError::Input(InputError::EmptyListings)));
}

#[tokio::test]
async fn removal_without_remover_loads_nothing() {
    let harness = Harness::new(TestDirectory::new(), TestAuthority::new());
    let loads = harness.store.loads();

    let result = harness
        .engine
        .remove_case_assignment(RemoveCaseAssignment {
            case_id: CaseId::random(),
            assignee: UserId::random(),
            removed_by: None,
        })
        .await;
    assert_matches!(
        result,
        Err(EngineError::Input(InputError::MissingField("removedByUserId")))
    );
    assert_eq!(harness.store.loads(), loads);
}

#[tokio::test]
async fn removing_last_advocate_removes_organisation() {
    let chambers = OrganisationId::random();
    let assignor = prosecutor(OrganisationId::random());
    let first = actor(Some(chambers), &["Advocates"]);
    let second = actor(Some(chambers), &["Advocates"]);
    let harness = Harness::new(
        TestDirectory::new()
            .with_actor(&assignor)
            .with_actor(&first)
            .with_actor(&second),
        TestAuthority::new(),
    );
    let case_id = CaseId::random();

    for advocate in [&first, &second] {
        harness
            .engine
            .assign_case(assign(case_id, &assignor, advocate, AssignmentRole::Prosecuting))
            .await
            .unwrap();
    }

    let remove = |assignee: &Actor| RemoveCaseAssignment {
        case_id,
        assignee: assignee.user_id(),
        removed_by: Some(assignor.user_id()),
    };

    let envelopes = harness.engine.remove_case_assignment(remove(&first)).await.unwrap();
    assert_eq!(
        envelopes.iter().map(Envelope::kind).collect::<Vec<_>>(),
        vec!["CaseAssignmentToAdvocateRemoved"]
    );

    let envelopes = harness.engine.remove_case_assignment(remove(&second)).await.unwrap();
    assert_eq!(
        envelopes.iter().map(Envelope::kind).collect::<Vec<_>>(),
        vec![
            "CaseAssignmentToAdvocateRemoved",
            "CaseAssigmentToOrganisationRemoved"
        ]
    );

    let y = harness.engine.assignments(case_id).await.unwrap();
    assert!(y.organisation(&chambers).is_none());
    assert_eq!(y.active_advocates().count(), 0);

    // Removing again is a recorded rejection.
    let envelopes = harness.engine.remove_case_assignment(remove(&second)).await.unwrap();
    assert_matches!(
        &envelopes[..],
        [Envelope { event: Event::Assignment(AssignmentEvent::UserNotAssigned { .. }), .. }]
    );

    let history = harness
        .store
        .load(&StreamId::Assignment(case_id))
        .await
        .unwrap();
    assert_eq!(history.len(), 7);
}
