// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of representation an organisation provides to a defendant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepresentationType {
    /// Publicly funded through a legal aid contract.
    RepresentationOrder,

    /// Privately funded.
    Private,
}

/// Party an assignee represents on a case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum Representing {
    /// Crown Prosecution Service.
    Cps,

    /// Police prosecution.
    Police,

    /// Any other prosecuting authority, identified by its reference data id.
    ProsecutingAuthority(String),

    /// Named organisation, used for defending assignments.
    Organisation(String),
}

/// Side of the case an assignment is made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentRole {
    Prosecuting,
    Defending,
}

impl AssignmentRole {
    pub fn is_prosecuting(&self) -> bool {
        matches!(self, AssignmentRole::Prosecuting)
    }
}

/// Offence a defendant is charged with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offence {
    pub code: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
}
