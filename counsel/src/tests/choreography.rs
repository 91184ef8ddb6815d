// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_core::command::{DisassociateOrganisation, GrantAccess};
use counsel_core::{Actor, Envelope, Event, GrantEvent, OrganisationId, StreamId};
use counsel_store::EventStore;
use tokio::sync::broadcast;

use crate::choreographer::{Choreographer, Reaction, reactions};
use crate::test_utils::{TestAuthority, TestDirectory, actor};
use crate::tests::{Defendant, Harness, lawyer};

struct Fixture {
    harness: Harness,
    defendant: Defendant,
    representative: Actor,
    grantees: Vec<Actor>,
}

/// Linked and associated defendant with two access grants.
async fn fixture() -> Fixture {
    let defendant = Defendant::new();
    let representative = lawyer(defendant.firm);
    let chambers = OrganisationId::random();
    let grantees = vec![
        actor(Some(chambers), &["Advocates"]),
        actor(Some(chambers), &["Chambers Admin"]),
    ];

    let directory = TestDirectory::new().with_actor(&representative);
    for grantee in &grantees {
        directory.insert(grantee);
    }
    let harness = Harness::new(directory, TestAuthority::new());
    defendant.setup(&harness.engine, &representative).await;

    for grantee in &grantees {
        harness
            .engine
            .grant_access(GrantAccess {
                defence_client_id: defendant.defence_client_id,
                grantee_email: grantee.details.email.clone(),
                granter: representative.user_id(),
            })
            .await
            .unwrap();
    }

    Fixture {
        harness,
        defendant,
        representative,
        grantees,
    }
}

async fn disassociate(fixture: &Fixture) -> Vec<Envelope> {
    fixture
        .harness
        .engine
        .disassociate(DisassociateOrganisation {
            defendant_id: fixture.defendant.defendant_id,
            organisation_id: fixture.defendant.firm,
            requester: fixture.representative.user_id(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn disassociation_triggers_grant_removal() {
    let fixture = fixture().await;
    let envelopes = disassociate(&fixture).await;

    assert_eq!(
        reactions(&envelopes[0]),
        vec![Reaction::RemoveAllGrantAccess {
            defendant_id: fixture.defendant.defendant_id,
            removed_by: fixture.representative.user_id(),
        }]
    );

    // Grants themselves trigger nothing.
    let history = fixture
        .harness
        .engine
        .store()
        .load(&StreamId::Grant(fixture.defendant.defence_client_id))
        .await
        .unwrap();
    assert!(history.iter().all(|envelope| reactions(envelope).is_empty()));
}

#[tokio::test]
async fn cascade_removes_every_grant_once() {
    let fixture = fixture().await;
    let choreographer = Choreographer::new(fixture.harness.engine.clone());
    let envelopes = disassociate(&fixture).await;

    let removed = choreographer.react(&envelopes[0]).await.unwrap();
    assert_eq!(removed.len(), fixture.grantees.len());
    for envelope in &removed {
        match &envelope.event {
            Event::Grant(GrantEvent::AccessGrantRemoved { removed_by, .. }) => {
                assert_eq!(*removed_by, fixture.representative.user_id());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    let y = fixture
        .harness
        .engine
        .grants(fixture.defendant.defence_client_id)
        .await
        .unwrap();
    assert_eq!(y.active_grants().count(), 0);

    // Delivering the same envelope again changes nothing.
    let removed = choreographer.react(&envelopes[0]).await.unwrap();
    assert!(removed.is_empty());
}

#[tokio::test]
async fn run_reacts_until_channel_closes() {
    let fixture = fixture().await;
    let choreographer = Choreographer::new(fixture.harness.engine.clone());
    let envelopes = disassociate(&fixture).await;

    let (tx, rx) = broadcast::channel(16);
    for envelope in &envelopes {
        tx.send(envelope.clone()).unwrap();
    }
    tx.send(envelopes[0].clone()).unwrap();
    drop(tx);

    choreographer.run(rx).await;

    let y = fixture
        .harness
        .engine
        .grants(fixture.defendant.defence_client_id)
        .await
        .unwrap();
    assert_eq!(y.active_grants().count(), 0);

    let history = fixture
        .harness
        .engine
        .store()
        .load(&StreamId::Grant(fixture.defendant.defence_client_id))
        .await
        .unwrap();
    let removals = history
        .iter()
        .filter(|envelope| envelope.kind() == "AccessGrantRemoved")
        .count();
    assert_eq!(removals, fixture.grantees.len());
}

#[tokio::test]
async fn unlinked_defendant_is_skipped() {
    let defendant = Defendant::new();
    let representative = lawyer(defendant.firm);
    let harness = Harness::new(
        TestDirectory::new().with_actor(&representative),
        TestAuthority::new(),
    );
    let choreographer = Choreographer::new(harness.engine.clone());

    // Associated without ever being linked to a case.
    harness
        .engine
        .associate(defendant.associate_command(defendant.firm, &representative))
        .await
        .unwrap();
    let envelopes = harness
        .engine
        .disassociate(DisassociateOrganisation {
            defendant_id: defendant.defendant_id,
            organisation_id: defendant.firm,
            requester: representative.user_id(),
        })
        .await
        .unwrap();
    assert_eq!(reactions(&envelopes[0]).len(), 1);

    let removed = choreographer.react(&envelopes[0]).await.unwrap();
    assert!(removed.is_empty());
}
