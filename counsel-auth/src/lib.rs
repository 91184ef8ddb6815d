// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Event-sourced state machines for defence representation, access grants and case
//! assignments.
//!
//! Each module holds the folded state of one entity type and the decision functions for its
//! commands. A decision takes the state by value and returns it together with the events it
//! emitted, already applied.
pub mod aggregate;
pub mod assignment;
pub mod association;
pub mod grant;
pub mod link;
mod policy;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;

pub use aggregate::{Aggregate, apply_all, fold};
pub use policy::GroupPolicy;
