// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Identifiers, permission facts, commands and the event wire contract shared by all counsel
//! crates.
pub mod case;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
pub mod permission;
pub mod person;
pub mod reason;
pub mod stream;

pub use case::{AssignmentRole, Offence, RepresentationType, Representing};
pub use command::Command;
pub use error::InputError;
pub use event::{AssignmentEvent, AssociationEvent, Envelope, Event, GrantEvent, LinkEvent};
pub use ids::{
    CaseId, DefenceClientId, DefendantId, HearingId, IdError, OrganisationId, PermissionId,
    SourceId, UserId,
};
pub use permission::{Classification, PermissionFact, PermissionLedger};
pub use person::{Actor, Organisation, PersonDetails};
pub use stream::{StreamId, StreamKind};

/// UTC point in time recorded on every event.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
