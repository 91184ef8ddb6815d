// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Event store and publisher interfaces with in-memory implementations.
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "memory")]
mod publisher;
mod traits;

#[cfg(feature = "memory")]
pub use memory::{MemoryStore, MemoryStoreError};
#[cfg(feature = "memory")]
pub use publisher::BroadcastPublisher;
pub use traits::{AppendOutcome, EventPublisher, EventStore};
