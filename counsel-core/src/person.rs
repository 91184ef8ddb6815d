// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ids::{OrganisationId, UserId};

/// Details of a user as returned by the identity directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDetails {
    pub user_id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Organisation a user belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub id: OrganisationId,
    pub name: String,
}

/// Everything the engine needs to know about an actor to make an authorization decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub details: PersonDetails,
    pub organisation: Option<Organisation>,
    pub groups: Vec<String>,
}

impl Actor {
    pub fn user_id(&self) -> UserId {
        self.details.user_id
    }

    pub fn organisation_id(&self) -> Option<OrganisationId> {
        self.organisation.as_ref().map(|organisation| organisation.id)
    }

    /// Return `true` if both actors belong to the same organisation.
    ///
    /// Actors without an organisation never share one.
    pub fn shares_organisation_with(&self, other: &Actor) -> bool {
        match (self.organisation_id(), other.organisation_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
