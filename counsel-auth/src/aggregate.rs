// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rebuilding entity state from history.
use counsel_core::{Envelope, Event};

/// Entity whose state is derived by folding its events.
pub trait Aggregate: Default + Sized {
    type Event;

    /// Pick the events of this entity out of the shared event enum.
    fn extract(event: &Event) -> Option<&Self::Event>;

    /// Apply a single event to the state.
    ///
    /// Must be total, events are facts and applying one never fails.
    fn apply(y: Self, event: &Self::Event) -> Self;
}

/// Rebuild state from a loaded stream.
pub fn fold<A: Aggregate>(history: &[Envelope]) -> A {
    history
        .iter()
        .filter_map(|envelope| A::extract(&envelope.event))
        .fold(A::default(), A::apply)
}

/// Apply freshly decided events in order.
pub fn apply_all<A: Aggregate>(y: A, events: &[A::Event]) -> A {
    events.iter().fold(y, A::apply)
}
