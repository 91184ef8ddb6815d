// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::ids::DefendantId;

/// Malformed commands, rejected before any history is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("required field '{0}' is empty")]
    EmptyField(&'static str),

    #[error("hearing assignment needs at least one listing")]
    EmptyListings,

    #[error("defendant {0} is not linked to a case")]
    UnknownDefendant(DefendantId),
}
