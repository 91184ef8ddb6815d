// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command handling.
//!
//! Every handler loads the stream of the entity a command addresses, folds it into state,
//! resolves collaborators, decides the events to emit and appends them with the version it
//! loaded. A concurrent writer on the same stream makes the append fail with
//! [`EngineError::VersionConflict`], the command can then be retried against the new history.
mod assignment;
mod association;
mod grant;
mod link;
mod sweep;

use std::sync::Arc;

use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_auth::{Aggregate, fold};
use counsel_core::{Actor, Command, Envelope, Event, PersonDetails, StreamId, Timestamp, UserId};
use counsel_store::{AppendOutcome, EventPublisher, EventStore};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::EngineError;

pub use assignment::ListingOutcome;
pub use sweep::SweepReport;

struct EngineInner<S, D, A, P, K> {
    store: S,
    directory: D,
    authority: A,
    publisher: P,
    clock: K,
    config: Config,
}

/// Handles commands against any number of entity streams.
///
/// Engines are cheap to clone, all clones share the same store and collaborators.
pub struct Engine<S, D, A, P, K = SystemClock> {
    inner: Arc<EngineInner<S, D, A, P, K>>,
}

impl<S, D, A, P, K> Clone for Engine<S, D, A, P, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, D, A, P> Engine<S, D, A, P, SystemClock>
where
    S: EventStore,
    D: IdentityDirectory,
    A: CaseAuthority,
    P: EventPublisher,
{
    pub fn new(store: S, directory: D, authority: A, publisher: P, config: Config) -> Self {
        Self::with_clock(store, directory, authority, publisher, SystemClock, config)
    }
}

impl<S, D, A, P, K> Engine<S, D, A, P, K>
where
    S: EventStore,
    D: IdentityDirectory,
    A: CaseAuthority,
    P: EventPublisher,
    K: Clock,
{
    pub fn with_clock(
        store: S,
        directory: D,
        authority: A,
        publisher: P,
        clock: K,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store,
                directory,
                authority,
                publisher,
                clock,
                config,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Handle any command and return the envelopes it appended.
    pub async fn handle(&self, command: Command) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        debug!("handle {} command", command.name());
        command.validate()?;

        match command {
            Command::AssociateOrganisation(command) => self.associate(command).await,
            Command::DisassociateOrganisation(command) => self.disassociate(command).await,
            Command::LockForLaa(command) => self.lock_for_laa(command).await,
            Command::UnlockForLaa(command) => self.unlock_for_laa(command).await,
            Command::GrantAccess(command) => self.grant_access(command).await,
            Command::RemoveGrantAccess(command) => self.remove_grant_access(command).await,
            Command::RemoveAllGrantAccess(command) => self.remove_all_grant_access(command).await,
            Command::AssignCase(command) => self.assign_case(command).await,
            Command::AssignCaseByHearing(command) => {
                let outcomes = self.assign_case_by_hearing(command).await?;
                Ok(outcomes
                    .into_iter()
                    .flat_map(|outcome| outcome.envelopes)
                    .collect())
            }
            Command::RemoveCaseAssignment(command) => self.remove_case_assignment(command).await,
            Command::LinkDefendant(command) => self.link_defendant(command).await,
            Command::RecordOffences(command) => self.record_offences(command).await,
        }
    }

    /// Load a stream and fold it, returns the state and the version it was loaded at.
    pub(crate) async fn load<T: Aggregate>(
        &self,
        stream: &StreamId,
    ) -> Result<(T, u64), EngineError<S, D, A>> {
        let history = self
            .inner
            .store
            .load(stream)
            .await
            .map_err(EngineError::Store)?;
        let version = history.len() as u64;
        Ok((fold(&history), version))
    }

    /// Append decided events to a stream and publish them.
    ///
    /// `recorded_at` is the time the events were decided at, envelopes carry the same instant as
    /// the dates inside their events.
    pub(crate) async fn commit<E: Into<Event>>(
        &self,
        stream: StreamId,
        expected_version: u64,
        events: Vec<E>,
        recorded_at: Timestamp,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        if events.is_empty() {
            debug!("no events to append to {}", stream);
            return Ok(vec![]);
        }

        let envelopes: Vec<Envelope> = events
            .into_iter()
            .zip(expected_version + 1..)
            .map(|(event, version)| Envelope {
                stream_id: stream,
                version,
                recorded_at,
                event: event.into(),
            })
            .collect();

        let outcome = self
            .inner
            .store
            .append(&stream, expected_version, envelopes.clone())
            .await
            .map_err(EngineError::Store)?;

        match outcome {
            AppendOutcome::Appended { version } => {
                debug!(
                    "appended {} events to {}, now at version {}",
                    envelopes.len(),
                    stream,
                    version
                );
                for envelope in &envelopes {
                    if envelope.event.is_failure() {
                        info!("{} recorded on {}", envelope.kind(), stream);
                    }
                    self.inner.publisher.publish(envelope);
                }
                Ok(envelopes)
            }
            AppendOutcome::Conflict { actual } => {
                warn!(
                    "version conflict on {}: expected {}, found {}",
                    stream, expected_version, actual
                );
                Err(EngineError::VersionConflict {
                    stream,
                    expected: expected_version,
                    actual,
                })
            }
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.inner.clock.now()
    }

    pub(crate) fn directory(&self) -> &D {
        &self.inner.directory
    }

    pub(crate) fn authority(&self) -> &A {
        &self.inner.authority
    }

    async fn actor(&self, details: PersonDetails) -> Result<Actor, EngineError<S, D, A>> {
        let groups = self
            .directory()
            .groups_of(&details.user_id)
            .await
            .map_err(EngineError::Directory)?;
        let organisation = self
            .directory()
            .organisation_of(&details.user_id)
            .await
            .map_err(EngineError::Directory)?;

        Ok(Actor {
            details,
            organisation,
            groups,
        })
    }

    /// Resolve a user with their organisation and groups by e-mail address.
    pub(crate) async fn actor_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Actor>, EngineError<S, D, A>> {
        let details = self
            .directory()
            .by_email(email)
            .await
            .map_err(EngineError::Directory)?;

        match details {
            Some(details) => Ok(Some(self.actor(details).await?)),
            None => Ok(None),
        }
    }

    /// Resolve a user with their organisation and groups by id.
    pub(crate) async fn actor_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Actor>, EngineError<S, D, A>> {
        let details = self
            .directory()
            .by_user_id(user_id)
            .await
            .map_err(EngineError::Directory)?;

        match details {
            Some(details) => Ok(Some(self.actor(details).await?)),
            None => Ok(None),
        }
    }
}
