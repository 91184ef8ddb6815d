// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces to the external systems authorization decisions depend on.
//!
//! Errors returned by these collaborators are infrastructure faults and abort the command.
//! Absent users or organisations are regular outcomes and reported as `None`.
use std::error::Error;

use counsel_core::{CaseId, Organisation, PersonDetails, UserId};

/// Directory of users, their organisations and group memberships.
pub trait IdentityDirectory {
    type Error: Error;

    fn by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<PersonDetails>, Self::Error>>;

    fn by_user_id(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<PersonDetails>, Self::Error>>;

    fn groups_of(&self, user_id: &UserId) -> impl Future<Output = Result<Vec<String>, Self::Error>>;

    fn organisation_of(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<Organisation>, Self::Error>>;
}

/// Answers which side of a case a user is working on.
pub trait CaseAuthority {
    type Error: Error;

    fn is_defending(
        &self,
        user_id: &UserId,
        case_id: &CaseId,
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    fn is_prosecuting(
        &self,
        user_id: &UserId,
        case_id: &CaseId,
    ) -> impl Future<Output = Result<bool, Self::Error>>;
}
