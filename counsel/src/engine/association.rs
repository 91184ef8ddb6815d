// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_auth::association::{
    AssociationState, associate, disassociate, lock_for_laa, unlock_for_laa,
};
use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::command::{
    AssociateOrganisation, DisassociateOrganisation, LockForLaa, UnlockForLaa,
};
use counsel_core::{DefendantId, Envelope, OrganisationId, StreamId};
use counsel_store::{EventPublisher, EventStore};

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
    pub async fn associate(
        &self,
        command: AssociateOrganisation,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        command.validate()?;

        let stream = StreamId::Association(command.defendant_id);
        let (y, version) = self.load::<AssociationState>(&stream).await?;
        let now = self.now();
        let (_, events) = associate(y, &command, now);
        self.commit(stream, version, events, now).await
    }

    pub async fn disassociate(
        &self,
        command: DisassociateOrganisation,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let stream = StreamId::Association(command.defendant_id);
        let (y, version) = self.load::<AssociationState>(&stream).await?;
        let requester = self.actor_by_id(&command.requester).await?;

        let now = self.now();
        let (_, events) = disassociate(
            y,
            &command,
            requester.as_ref(),
            &self.config().groups,
            now,
        );
        self.commit(stream, version, events, now).await
    }

    pub async fn lock_for_laa(
        &self,
        command: LockForLaa,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        command.validate()?;

        let stream = StreamId::Association(command.defendant_id);
        let (y, version) = self.load::<AssociationState>(&stream).await?;
        let (_, events) = lock_for_laa(y, &command);
        self.commit(stream, version, events, self.now()).await
    }

    pub async fn unlock_for_laa(
        &self,
        command: UnlockForLaa,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let stream = StreamId::Association(command.defendant_id);
        let (y, version) = self.load::<AssociationState>(&stream).await?;
        let (_, events) = unlock_for_laa(y, &command);
        self.commit(stream, version, events, self.now()).await
    }

    /// Current representation state of a defendant.
    pub async fn association(
        &self,
        defendant_id: DefendantId,
    ) -> Result<AssociationState, EngineError<S, D, A>> {
        let (y, _) = self
            .load::<AssociationState>(&StreamId::Association(defendant_id))
            .await?;
        Ok(y)
    }

    /// Organisation currently representing a defendant.
    pub(crate) async fn associated_organisation(
        &self,
        defendant_id: DefendantId,
    ) -> Result<Option<OrganisationId>, EngineError<S, D, A>> {
        let y = self.association(defendant_id).await?;
        Ok(y.active().map(|association| association.organisation_id))
    }
}
