// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_auth::grant::ClientLink;
use counsel_auth::link::{
    CaseLink, DefenceClientState, LinkState, link_defendant, record_offences,
    register_defence_client,
};
use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::command::{LinkDefendant, RecordOffences};
use counsel_core::{DefenceClientId, DefendantId, Envelope, StreamId};
use counsel_store::{EventPublisher, EventStore};
use tracing::debug;

use crate::clock::Clock;
use crate::engine::Engine;
use crate::error::EngineError;

impl<S, D, A, P, K> Engine<S, D, A, P, K>
where
    S: EventStore,
    D: IdentityDirectory,
    A: CaseAuthority,
    P: EventPublisher,
    K: Clock,
{
    /// Link a defendant to their case and defence client.
    ///
    /// Also registers the defendant on the defence client stream, repeating the command repairs
    /// a registration which did not make it.
    pub async fn link_defendant(
        &self,
        command: LinkDefendant,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let stream = StreamId::Link(command.defendant_id);
        let (y, version) = self.load::<LinkState>(&stream).await?;
        let (y, events) = link_defendant(y, &command);
        let now = self.now();
        let mut envelopes = self.commit(stream, version, events, now).await?;

        let linked = y
            .resolve()
            .is_some_and(|link| link.defence_client_id == command.defence_client_id);
        if linked {
            let stream = StreamId::DefenceClient(command.defence_client_id);
            let (y, version) = self.load::<DefenceClientState>(&stream).await?;
            let (_, events) =
                register_defence_client(y, command.defence_client_id, command.defendant_id);
            envelopes.extend(self.commit(stream, version, events, now).await?);
        }

        Ok(envelopes)
    }

    pub async fn record_offences(
        &self,
        command: RecordOffences,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let stream = StreamId::Link(command.defendant_id);
        let (y, version) = self.load::<LinkState>(&stream).await?;
        let (_, events) = record_offences(y, &command)?;
        self.commit(stream, version, events, self.now()).await
    }

    /// Case and defence client a defendant is linked to.
    pub async fn resolve(
        &self,
        defendant_id: DefendantId,
    ) -> Result<Option<CaseLink>, EngineError<S, D, A>> {
        let (y, _) = self
            .load::<LinkState>(&StreamId::Link(defendant_id))
            .await?;
        Ok(y.resolve())
    }

    /// Defendant a defence client belongs to.
    pub async fn defendant_for(
        &self,
        defence_client_id: DefenceClientId,
    ) -> Result<Option<DefendantId>, EngineError<S, D, A>> {
        let (y, _) = self
            .load::<DefenceClientState>(&StreamId::DefenceClient(defence_client_id))
            .await?;
        Ok(y.defendant_for())
    }

    /// Defendant and case behind a defence client.
    pub(crate) async fn client_link(
        &self,
        defence_client_id: DefenceClientId,
    ) -> Result<Option<ClientLink>, EngineError<S, D, A>> {
        let Some(defendant_id) = self.defendant_for(defence_client_id).await? else {
            debug!("defence client {} is not registered", defence_client_id);
            return Ok(None);
        };

        let link = self
            .resolve(defendant_id)
            .await?
            .filter(|link| link.defence_client_id == defence_client_id)
            .map(|link| ClientLink {
                defendant_id,
                case_id: link.case_id,
            });
        Ok(link)
    }
}
