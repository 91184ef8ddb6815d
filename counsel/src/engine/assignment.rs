// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_auth::assignment::{
    AssignContext, AssignmentState, assign_case, assign_case_for_hearing, remove_case_assignment,
};
use counsel_auth::traits::{CaseAuthority, IdentityDirectory};
use counsel_core::command::{AssignCase, AssignCaseByHearing, HearingListing, RemoveCaseAssignment};
use counsel_core::{Actor, AssignmentEvent, CaseId, Envelope, Event, StreamId};
use counsel_store::{EventPublisher, EventStore};
use tracing::debug;

use crate::clock::Clock;
use crate::engine::Engine;
use crate::error::EngineError;

/// Result of assigning one hearing listing.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingOutcome {
    pub listing: HearingListing,
    pub envelopes: Vec<Envelope>,
}

impl ListingOutcome {
    /// Reason the listing was rejected, `None` if the advocate was assigned.
    pub fn failure(&self) -> Option<&str> {
        self.envelopes
            .iter()
            .find_map(|envelope| match &envelope.event {
                Event::Assignment(AssignmentEvent::CaseAssignmentsByHearingListingFailed {
                    reason,
                    ..
                }) => Some(reason.as_str()),
                _ => None,
            })
    }

    pub fn is_assigned(&self) -> bool {
        self.failure().is_none()
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
    async fn assign_context(
        &self,
        command: &AssignCase,
        assignee: Option<&Actor>,
    ) -> Result<AssignContext, EngineError<S, D, A>> {
        let assignor_organisation_id = self
            .directory()
            .organisation_of(&command.assignor)
            .await
            .map_err(EngineError::Directory)?
            .map(|organisation| organisation.id);

        let assignee_is_defending = match assignee {
            Some(assignee) if command.role.is_prosecuting() => self
                .authority()
                .is_defending(&assignee.user_id(), &command.case_id)
                .await
                .map_err(EngineError::Authority)?,
            _ => false,
        };

        Ok(AssignContext {
            assignee: assignee.cloned(),
            assignor_organisation_id,
            assignee_is_defending,
            hearing_id: None,
        })
    }

    pub async fn assign_case(
        &self,
        command: AssignCase,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        command.validate()?;

        let stream = StreamId::Assignment(command.case_id);
        let (y, version) = self.load::<AssignmentState>(&stream).await?;
        let assignee = self.actor_by_email(&command.assignee_email).await?;
        let context = self.assign_context(&command, assignee.as_ref()).await?;

        let now = self.now();
        let (_, events) = assign_case(y, &command, &context, &self.config().groups, now);
        self.commit(stream, version, events, now).await
    }

    /// Assign an advocate to every case listed in a batch of hearings.
    ///
    /// Each listing is decided against its own case stream. Rejected listings are recorded on
    /// their case and do not stop the batch.
    pub async fn assign_case_by_hearing(
        &self,
        command: AssignCaseByHearing,
    ) -> Result<Vec<ListingOutcome>, EngineError<S, D, A>> {
        command.validate()?;

        let assignee = self.actor_by_email(&command.assignee_email).await?;
        let mut outcomes = Vec::with_capacity(command.listings.len());

        for listing in &command.listings {
            let case_command = command.for_listing(listing);
            let stream = StreamId::Assignment(listing.case_id);
            let (y, version) = self.load::<AssignmentState>(&stream).await?;
            let context = self.assign_context(&case_command, assignee.as_ref()).await?;

            let now = self.now();
            let (_, events) = assign_case_for_hearing(
                y,
                &case_command,
                listing.hearing_id,
                &context,
                &self.config().groups,
                now,
            );
            let envelopes = self.commit(stream, version, events, now).await?;

            let outcome = ListingOutcome {
                listing: *listing,
                envelopes,
            };
            if let Some(reason) = outcome.failure() {
                debug!(
                    "listing of case {} at hearing {} rejected: {}",
                    listing.case_id, listing.hearing_id, reason
                );
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    pub async fn remove_case_assignment(
        &self,
        command: RemoveCaseAssignment,
    ) -> Result<Vec<Envelope>, EngineError<S, D, A>> {
        let removed_by = command.validate()?;

        let stream = StreamId::Assignment(command.case_id);
        let (y, version) = self.load::<AssignmentState>(&stream).await?;
        let now = self.now();
        let (_, events) =
            remove_case_assignment(y, command.case_id, command.assignee, removed_by, now);
        self.commit(stream, version, events, now).await
    }

    /// Current assignments on a case.
    pub async fn assignments(
        &self,
        case_id: CaseId,
    ) -> Result<AssignmentState, EngineError<S, D, A>> {
        let (y, _) = self
            .load::<AssignmentState>(&StreamId::Assignment(case_id))
            .await?;
        Ok(y)
    }
}
