// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::TimeDelta;
use counsel_core::command::AssignCase;
use counsel_core::{
    Actor, AssignmentEvent, AssignmentRole, CaseId, Envelope, Event, OrganisationId, Representing,
    StreamId, StreamKind, UserId,
};
use counsel_store::{AppendOutcome, BroadcastPublisher, EventStore};

use crate::clock::Clock;
use crate::config::Config;
use crate::engine::Engine;
use crate::test_utils::{TestAuthority, TestDirectory, actor};
use crate::tests::Harness;

/// Store where every append to one stream loses the race against another writer.
#[derive(Clone, Debug)]
struct ContestedStore<S> {
    store: S,
    contested: StreamId,
}

impl<S: EventStore> EventStore for ContestedStore<S> {
    type Error = S::Error;

    async fn load(&self, stream: &StreamId) -> Result<Vec<Envelope>, Self::Error> {
        self.store.load(stream).await
    }

    async fn append(
        &self,
        stream: &StreamId,
        expected_version: u64,
        envelopes: Vec<Envelope>,
    ) -> Result<AppendOutcome, Self::Error> {
        if *stream == self.contested {
            return Ok(AppendOutcome::Conflict {
                actual: expected_version + 1,
            });
        }
        self.store.append(stream, expected_version, envelopes).await
    }

    async fn stream_ids(&self, kind: StreamKind) -> Result<Vec<StreamId>, Self::Error> {
        self.store.stream_ids(kind).await
    }
}

async fn assign_until(harness: &Harness, case_id: CaseId, assignee: &Actor, hours: i64) {
    harness
        .engine
        .assign_case(AssignCase {
            case_id,
            assignor: UserId::random(),
            assignee_email: assignee.details.email.clone(),
            representing: Representing::Cps,
            role: AssignmentRole::Prosecuting,
            expiry_date: Some(harness.clock.now() + TimeDelta::hours(hours)),
        })
        .await
        .unwrap();
}

fn removed_by(envelope: &Envelope) -> Option<UserId> {
    match &envelope.event {
        Event::Assignment(AssignmentEvent::CaseAssignmentToAdvocateRemoved {
            removed_by, ..
        })
        | Event::Assignment(AssignmentEvent::CaseAssignmentToOrganisationRemoved {
            removed_by,
            ..
        }) => Some(*removed_by),
        _ => None,
    }
}

#[tokio::test]
async fn sweep_removes_expired_assignments() {
    let chambers = OrganisationId::random();
    let expiring = actor(Some(chambers), &["Advocates"]);
    let lasting = actor(Some(OrganisationId::random()), &["Advocates"]);
    let harness = Harness::new(
        TestDirectory::new().with_actor(&expiring).with_actor(&lasting),
        TestAuthority::new(),
    );
    let system_user_id = harness.engine.config().system_user_id;
    let case_id = CaseId::random();

    assign_until(&harness, case_id, &expiring, 1).await;
    assign_until(&harness, case_id, &lasting, 48).await;

    // Nothing has expired yet.
    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 0);
    assert!(report.envelopes.is_empty());

    harness.clock.advance(TimeDelta::hours(2));
    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 2);
    assert_eq!(
        report.envelopes.iter().map(Envelope::kind).collect::<Vec<_>>(),
        vec![
            "CaseAssignmentToAdvocateRemoved",
            "CaseAssigmentToOrganisationRemoved"
        ]
    );
    assert!(
        report
            .envelopes
            .iter()
            .all(|envelope| removed_by(envelope) == Some(system_user_id))
    );

    let y = harness.engine.assignments(case_id).await.unwrap();
    assert!(!y.is_assigned(&expiring.user_id()));
    assert!(y.is_assigned(&lasting.user_id()));
    assert!(y.organisation(&chambers).is_none());

    // Running again finds nothing left to remove.
    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 0);
    assert!(report.envelopes.is_empty());
}

#[tokio::test]
async fn sweep_respects_batch_size() {
    let first = actor(Some(OrganisationId::random()), &["Advocates"]);
    let second = actor(Some(OrganisationId::random()), &["Advocates"]);
    let config = Config {
        expiry_batch_size: 1,
        ..Config::new(UserId::random())
    };
    let harness = Harness::with_config(
        TestDirectory::new().with_actor(&first).with_actor(&second),
        TestAuthority::new(),
        config,
    );
    let older_case = CaseId::random();
    let newer_case = CaseId::random();

    assign_until(&harness, newer_case, &second, 2).await;
    assign_until(&harness, older_case, &first, 1).await;
    harness.clock.advance(TimeDelta::days(1));

    // The oldest expiry goes first, its organisation leaves with the last advocate.
    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.envelopes.len(), 2);
    assert!(
        report
            .envelopes
            .iter()
            .all(|envelope| envelope.stream_id == StreamId::Assignment(older_case))
    );

    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(report.envelopes.len(), 2);
    assert!(
        !harness
            .engine
            .assignments(newer_case)
            .await
            .unwrap()
            .is_assigned(&second.user_id())
    );

    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 0);
}

#[tokio::test]
async fn assignments_without_expiry_stay() {
    let advocate = actor(Some(OrganisationId::random()), &["Advocates"]);
    let harness = Harness::new(
        TestDirectory::new().with_actor(&advocate),
        TestAuthority::new(),
    );
    let case_id = CaseId::random();

    harness
        .engine
        .assign_case(AssignCase {
            case_id,
            assignor: UserId::random(),
            assignee_email: advocate.details.email.clone(),
            representing: Representing::Police,
            role: AssignmentRole::Prosecuting,
            expiry_date: None,
        })
        .await
        .unwrap();

    harness.clock.advance(TimeDelta::days(365));
    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 0);
    assert!(
        harness
            .engine
            .assignments(case_id)
            .await
            .unwrap()
            .is_assigned(&advocate.user_id())
    );
}

#[tokio::test]
async fn contested_case_does_not_stop_sweep() {
    let first = actor(Some(OrganisationId::random()), &["Advocates"]);
    let second = actor(Some(OrganisationId::random()), &["Advocates"]);
    let directory = TestDirectory::new().with_actor(&first).with_actor(&second);
    let harness = Harness::new(directory.clone(), TestAuthority::new());
    let contested_case = CaseId::random();
    let open_case = CaseId::random();

    assign_until(&harness, contested_case, &first, 1).await;
    assign_until(&harness, open_case, &second, 2).await;
    harness.clock.advance(TimeDelta::hours(3));

    // Same streams and clock, but another writer always wins on the contested case.
    let engine = Engine::with_clock(
        ContestedStore {
            store: harness.store.clone(),
            contested: StreamId::Assignment(contested_case),
        },
        directory,
        TestAuthority::new(),
        BroadcastPublisher::new(),
        harness.clock.clone(),
        harness.engine.config().clone(),
    );

    let report = engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 4);
    assert_eq!(report.skipped, vec![contested_case]);
    assert_eq!(
        report.envelopes.iter().map(Envelope::kind).collect::<Vec<_>>(),
        vec![
            "CaseAssignmentToAdvocateRemoved",
            "CaseAssigmentToOrganisationRemoved"
        ]
    );
    assert!(
        report
            .envelopes
            .iter()
            .all(|envelope| envelope.stream_id == StreamId::Assignment(open_case))
    );

    // The skipped case is picked up by the next sweep.
    let report = harness.engine.expiry_sweep().await.unwrap();
    assert_eq!(report.expired, 2);
    assert!(report.skipped.is_empty());
    assert!(
        !harness
            .engine
            .assignments(contested_case)
            .await
            .unwrap()
            .is_assigned(&first.user_id())
    );
}
