// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::TimeDelta;
use counsel_core::{Envelope, StreamId, StreamKind, Timestamp};
use counsel_store::{AppendOutcome, EventStore};

use crate::clock::Clock;

pub use counsel_auth::test_utils::{TestAuthority, TestDirectory, actor};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Clock which only moves when told to.
#[derive(Clone, Debug)]
pub struct FixedClock {
    now: Arc<Mutex<Timestamp>>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().expect("clock lock poisoned")
    }
}

/// Clock moving forward by a fixed step every time it is read.
#[derive(Clone, Debug)]
pub struct TickingClock {
    now: Arc<Mutex<Timestamp>>,
    step: TimeDelta,
}

impl TickingClock {
    pub fn new(start: Timestamp, step: TimeDelta) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            step,
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> Timestamp {
        let mut now = self.now.lock().expect("clock lock poisoned");
        let current = *now;
        *now += self.step;
        current
    }
}

/// Store wrapper counting how often streams were loaded.
#[derive(Clone, Debug)]
pub struct CountingStore<S> {
    store: S,
    loads: Arc<AtomicUsize>,
}

impl<S> CountingStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            loads: Arc::default(),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl<S: EventStore> EventStore for CountingStore<S> {
    type Error = S::Error;

    async fn load(&self, stream: &StreamId) -> Result<Vec<Envelope>, Self::Error> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.store.load(stream).await
    }

    async fn append(
        &self,
        stream: &StreamId,
        expected_version: u64,
        envelopes: Vec<Envelope>,
    ) -> Result<AppendOutcome, Self::Error> {
        self.store.append(stream, expected_version, envelopes).await
    }

    async fn stream_ids(&self, kind: StreamKind) -> Result<Vec<StreamId>, Self::Error> {
        self.store.stream_ids(kind).await
    }
}
