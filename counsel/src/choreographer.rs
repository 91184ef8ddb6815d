// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-entity reactions to committed events.
//!
//! Entities never change each other's state. When an event on one stream requires a follow-up
//! command on another, the reaction is listed in [`reactions`] and carried out by the
//! [`Choreographer`], either directly with the envelopes returned by a command or from a
//! broadcast subscription. Reactions end up in commands which emit nothing when their effect
//! is already in place, so an envelope can be handled any number of times.
use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::command::RemoveAllGrantAccess;
use counsel_core::{AssociationEvent, DefendantId, Envelope, Event, UserId};
use counsel_store::{EventPublisher, EventStore};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::engine::Engine;
use crate::error::EngineError;

/// Follow-up work triggered by an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// Revoke every access grant on the defence client of a defendant.
    RemoveAllGrantAccess {
        defendant_id: DefendantId,
        removed_by: UserId,
    },
}

/// Subscription table, maps a committed event to the reactions it triggers.
pub fn reactions(envelope: &Envelope) -> Vec<Reaction> {
    match &envelope.event {
        Event::Association(AssociationEvent::OrganisationDisassociated {
            defendant_id,
            disassociated_by,
            ..
        }) => vec![Reaction::RemoveAllGrantAccess {
            defendant_id: *defendant_id,
            removed_by: *disassociated_by,
        }],
        _ => vec![],
    }
}

pub struct Choreographer<S, D, A, P, K> {
    engine: Engine<S, D, A, P, K>,
}

impl<S, D, A, P, K> Choreographer<S, D, A, P, K>
where
    S: EventStore,
    D: IdentityDirectory,
    A: CaseAuthority,
    P: EventPublisher,
    K: Clock,
{
    pub fn new(engine: Engine<S, D, A, P, K>) -> Self {
        Self { engine }
    }

    /// Carry out all reactions to an envelope and return what they appended.
    pub async fn react(&self, envelope: &Envelope) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let mut appended = Vec::new();

        for reaction in reactions(envelope) {
            match reaction {
                Reaction::RemoveAllGrantAccess {
                    defendant_id,
                    removed_by,
                } => {
                    let Some(link) = self.engine.resolve(defendant_id).await? else {
                        debug!(
                            "defendant {} has no defence client, no grants to remove",
                            defendant_id
                        );
                        continue;
                    };

                    let envelopes = self
                        .engine
                        .remove_all_grant_access(RemoveAllGrantAccess {
                            defence_client_id: link.defence_client_id,
                            removed_by,
                        })
                        .await?;
                    appended.extend(envelopes);
                }
            }
        }

        Ok(appended)
    }

    /// Carry out reactions to every envelope arriving on the receiver until the channel closes.
    ///
    /// Failed reactions are logged and skipped.
    pub async fn run(&self, mut rx: broadcast::Receiver<Envelope>) {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    if let Err(err) = self.react(&envelope).await {
                        warn!(
                            "reaction to {} on {} failed: {}",
                            envelope.kind(),
                            envelope.stream_id,
                            err
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("choreographer lagged behind, skipped {} envelopes", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("event channel closed, stopping choreographer");
                    break;
                }
            }
        }
    }
}
