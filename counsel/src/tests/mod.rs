// SPDX-License-Identifier: MIT OR Apache-2.0

mod assignment;
mod choreography;
mod sweep;

use chrono::{TimeZone, Utc};
use counsel_core::command::{AssociateOrganisation, LinkDefendant};
use counsel_core::{
    Actor, CaseId, DefenceClientId, DefendantId, OrganisationId, RepresentationType, UserId,
};
use counsel_store::{BroadcastPublisher, MemoryStore};

use crate::config::Config;
use crate::engine::Engine;
use crate::test_utils::{
    CountingStore, FixedClock, TestAuthority, TestDirectory, actor, setup_logging,
};

pub type TestEngine = Engine<
    CountingStore<MemoryStore>,
    TestDirectory,
    TestAuthority,
    BroadcastPublisher,
    FixedClock,
>;

pub struct Harness {
    pub engine: TestEngine,
    pub store: CountingStore<MemoryStore>,
    pub directory: TestDirectory,
    pub publisher: BroadcastPublisher,
    pub clock: FixedClock,
}

impl Harness {
    pub fn new(directory: TestDirectory, authority: TestAuthority) -> Self {
        Self::with_config(directory, authority, Config::new(UserId::random()))
    }

    pub fn with_config(directory: TestDirectory, authority: TestAuthority, config: Config) -> Self {
        setup_logging();

        let store = CountingStore::new(MemoryStore::new());
        let publisher = BroadcastPublisher::new();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap());
        let engine = Engine::with_clock(
            store.clone(),
            directory.clone(),
            authority,
            publisher.clone(),
            clock.clone(),
            config,
        );

        Self {
            engine,
            store,
            directory,
            publisher,
            clock,
        }
    }
}

/// Defendant linked to a case, with the organisation representing them.
pub struct Defendant {
    pub defendant_id: DefendantId,
    pub defence_client_id: DefenceClientId,
    pub case_id: CaseId,
    pub firm: OrganisationId,
}

impl Defendant {
    pub fn new() -> Self {
        Self {
            defendant_id: DefendantId::random(),
            defence_client_id: DefenceClientId::random(),
            case_id: CaseId::random(),
            firm: OrganisationId::random(),
        }
    }

    pub fn associate_command(
        &self,
        organisation_id: OrganisationId,
        requester: &Actor,
    ) -> AssociateOrganisation {
        AssociateOrganisation {
            defendant_id: self.defendant_id,
            organisation_id,
            organisation_name: format!("Organisation {organisation_id}"),
            representation_type: RepresentationType::Private,
            laa_contract_number: None,
            requester: requester.user_id(),
        }
    }

    /// Link the defendant and associate their firm.
    pub async fn setup(&self, engine: &TestEngine, requester: &Actor) {
        engine
            .link_defendant(LinkDefendant {
                defendant_id: self.defendant_id,
                defence_client_id: self.defence_client_id,
                case_id: self.case_id,
                offences: vec![],
            })
            .await
            .unwrap();
        engine
            .associate(self.associate_command(self.firm, requester))
            .await
            .unwrap();
    }
}

/// Lawyer of the given firm who may grant and remove access.
pub fn lawyer(firm: OrganisationId) -> Actor {
    actor(Some(firm), &["Defence Lawyers"])
}
