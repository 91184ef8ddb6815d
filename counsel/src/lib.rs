// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Event-sourced engine deciding who represents a defendant, who may access their defence
//! client and who is assigned to a case.
mod choreographer;
mod clock;
mod config;
mod engine;
mod error;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;

pub use choreographer::{Choreographer, Reaction, reactions};
pub use clock::{Clock, SystemClock};
pub use config::{Config, ConfigError};
pub use engine::{Engine, ListingOutcome, SweepReport};
pub use error::EngineError;
