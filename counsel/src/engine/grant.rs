// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_auth::grant::{
    GrantContext, GrantState, grant_access, remove_all_grant_access, remove_grant_access,
};
use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::command::{GrantAccess, RemoveAllGrantAccess, RemoveGrantAccess};
use counsel_core::{DefenceClientId, Envelope, StreamId};
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
    pub async fn grant_access(
        &self,
        command: GrantAccess,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        command.validate()?;

        let stream = StreamId::Grant(command.defence_client_id);
        let (y, version) = self.load::<GrantState>(&stream).await?;

        let grantee = self.actor_by_email(&command.grantee_email).await?;
        let context = match grantee {
            None => GrantContext {
                grantee: None,
                granter: None,
                link: None,
                associated_organisation: None,
                grantee_is_prosecuting: false,
            },
            Some(grantee) => {
                let granter = self.actor_by_id(&command.granter).await?;
                let link = self.client_link(command.defence_client_id).await?;

                let (associated_organisation, grantee_is_prosecuting) = match link {
                    Some(link) => (
                        self.associated_organisation(link.defendant_id).await?,
                        self.authority()
                            .is_prosecuting(&grantee.user_id(), &link.case_id)
                            .await
                            .map_err(EngineError::Authority)?,
                    ),
                    None => (None, false),
                };

                GrantContext {
                    grantee: Some(grantee),
                    granter,
                    link,
                    associated_organisation,
                    grantee_is_prosecuting,
                }
            }
        };

        let (_, events) = grant_access(y, &command, &context, &self.config().groups);
        self.commit(stream, version, events, self.now()).await
    }

    pub async fn remove_grant_access(
        &self,
        command: RemoveGrantAccess,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let stream = StreamId::Grant(command.defence_client_id);
        let (y, version) = self.load::<GrantState>(&stream).await?;
        if y.active_grant(&command.grantee).is_none() {
            return Ok(vec![]);
        }

        let requester = self.actor_by_id(&command.requester).await?;
        let associated_organisation = match self.client_link(command.defence_client_id).await? {
            Some(link) => self.associated_organisation(link.defendant_id).await?,
            None => None,
        };

        let (_, events) = remove_grant_access(
            y,
            &command,
            requester.as_ref(),
            associated_organisation,
            &self.config().groups,
        );
        self.commit(stream, version, events, self.now()).await
    }

    pub async fn remove_all_grant_access(
        &self,
        command: RemoveAllGrantAccess,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let stream = StreamId::Grant(command.defence_client_id);
        let (y, version) = self.load::<GrantState>(&stream).await?;
        let (_, events) = remove_all_grant_access(y, command.defence_client_id, command.removed_by);
        self.commit(stream, version, events, self.now()).await
    }

    /// Current access grants on a defence client.
    pub async fn grants(
        &self,
        defence_client_id: DefenceClientId,
    ) -> Result<GrantState, EngineError<S, D, A>> {
        let (y, _) = self
            .load::<GrantState>(&StreamId::Grant(defence_client_id))
            .await?;
        Ok(y)
    }
}
