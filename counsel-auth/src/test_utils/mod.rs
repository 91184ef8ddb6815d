// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
mod authority;
mod directory;

pub use authority::TestAuthority;
pub use directory::{TestDirectory, TestDirectoryError};

use counsel_core::{Actor, Organisation, OrganisationId, PersonDetails, UserId};

/// Random user with the given organisation and groups.
pub fn actor(organisation_id: Option<OrganisationId>, groups: &[&str]) -> Actor {
    let user_id = UserId::random();
    Actor {
        details: PersonDetails {
            user_id,
            email: format!("{user_id}@example.org"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        },
        organisation: organisation_id.map(|id| Organisation {
            id,
            name: format!("Organisation {id}"),
        }),
        groups: groups.iter().map(|group| group.to_string()).collect(),
    }
}
