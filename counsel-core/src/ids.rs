// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongly typed identifiers.
//!
//! Every entity and actor is addressed by a UUID. Wrapping them in distinct types makes it
//! impossible to pass a case id where a defendant id is expected.
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(value)?))
            }
        }
    };
}

uuid_id!(
    /// Defendant on a case, owner of a representation association stream.
    DefendantId
);

uuid_id!(
    /// Defence client, the defence-side record of a defendant which access grants refer to.
    DefenceClientId
);

uuid_id!(
    /// Prosecution case, owner of a case assignment stream.
    CaseId
);

uuid_id!(
    /// Hearing listed for a case.
    HearingId
);

uuid_id!(
    /// Individual user known to the identity directory.
    UserId
);

uuid_id!(
    /// Legal organisation (firm, chambers, prosecuting authority).
    OrganisationId
);

uuid_id!(
    /// Identifier of a single permission fact.
    PermissionId
);

#[derive(Debug, Error)]
pub enum IdError {
    #[error("invalid identifier: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

/// Originator of a permission, either an individual user or an organisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum SourceId {
    User(UserId),
    Organisation(OrganisationId),
}

impl SourceId {
    pub fn as_uuid(&self) -> &Uuid {
        match self {
            SourceId::User(id) => id.as_uuid(),
            SourceId::Organisation(id) => id.as_uuid(),
        }
    }

    /// Return `true` if this source is an individual user.
    pub fn is_user(&self) -> bool {
        matches!(self, SourceId::User(_))
    }
}

impl From<UserId> for SourceId {
    fn from(id: UserId) -> Self {
        SourceId::User(id)
    }
}

impl From<OrganisationId> for SourceId {
    fn from(id: OrganisationId) -> Self {
        SourceId::Organisation(id)
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceId::User(id) => write!(f, "user:{id}"),
            SourceId::Organisation(id) => write!(f, "organisation:{id}"),
        }
    }
}
