// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::Utc;
use counsel_core::Timestamp;

/// Source of the timestamps recorded on events.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}
