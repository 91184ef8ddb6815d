// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reason strings carried by domain failure events.
//!
//! Downstream consumers match on these, they must not change.
use crate::ids::{DefenceClientId, OrganisationId};

pub const LOCKED_FOR_LAA: &str = "locked for LAA";

pub const UNAUTHORIZED: &str = "unauthorized";

pub const USER_NOT_FOUND: &str = "User not found for the given e-mail.";

pub const ORGANISATION_NOT_FOUND: &str = "Organisation not found for the given user.";

pub const ASSIGNEE_NOT_IN_ALLOWED_GROUPS: &str = "Assignee is not a member of an allowed group.";

pub const USER_ALREADY_ASSIGNED: &str = "User is already assigned to the case.";

pub const USER_NOT_ASSIGNED: &str = "User is not assigned to the case.";

pub const ASSIGNEE_DEFENDING_CASE: &str = "Assignee is defending the case.";

pub const DEFENDANT_ALREADY_LINKED: &str = "Defendant is already linked to a different case.";

pub fn not_currently_associated(organisation_id: &OrganisationId) -> String {
    format!("Organisation id '{organisation_id}' is not currently associated with Defence client")
}

pub fn defence_client_not_linked(defence_client_id: &DefenceClientId) -> String {
    format!("Defence client '{defence_client_id}' is not linked to a case")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::ids::OrganisationId;

    use super::not_currently_associated;

    #[test]
    fn disassociation_reason_wording() {
        let organisation_id =
            OrganisationId::from_str("5e1a2b3c-4d5e-4f60-8a9b-0c1d2e3f4a5b").unwrap();
        assert_eq!(
            not_currently_associated(&organisation_id),
            "Organisation id '5e1a2b3c-4d5e-4f60-8a9b-0c1d2e3f4a5b' is not currently \
             associated with Defence client"
        );
    }
}
