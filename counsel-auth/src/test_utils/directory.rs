// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use counsel_core::{Actor, Organisation, PersonDetails, UserId};
use thiserror::Error;

use crate::traits::IdentityDirectory;

#[derive(Debug, Error)]
#[error("identity directory unavailable")]
pub struct TestDirectoryError;

/// Identity directory backed by a fixed set of actors.
///
/// Clones share their actors and the availability switch. Inserting an actor again replaces
/// it, use [`TestDirectory::set_available`] to simulate an outage.
#[derive(Clone, Debug, Default)]
pub struct TestDirectory {
    actors: Arc<Mutex<HashMap<UserId, Actor>>>,
    unavailable: Arc<AtomicBool>,
}

impl TestDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(self, actor: &Actor) -> Self {
        self.insert(actor);
        self
    }

    pub fn insert(&self, actor: &Actor) {
        self.actors
            .lock()
            .unwrap()
            .insert(actor.user_id(), actor.clone());
    }

    fn find<T>(&self, f: impl FnOnce(&HashMap<UserId, Actor>) -> T) -> T {
        f(&self.actors.lock().unwrap())
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), TestDirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TestDirectoryError);
        }
        Ok(())
    }
}

impl IdentityDirectory for TestDirectory {
    type Error = TestDirectoryError;

    async fn by_email(&self, email: &str) -> Result<Option<PersonDetails>, Self::Error> {
        self.check()?;
        Ok(self.find(|actors| {
            actors
                .values()
                .find(|actor| actor.details.email.eq_ignore_ascii_case(email))
                .map(|actor| actor.details.clone())
        }))
    }

    async fn by_user_id(&self, user_id: &UserId) -> Result<Option<PersonDetails>, Self::Error> {
        self.check()?;
        Ok(self.find(|actors| actors.get(user_id).map(|actor| actor.details.clone())))
    }

    async fn groups_of(&self, user_id: &UserId) -> Result<Vec<String>, Self::Error> {
        self.check()?;
        Ok(self.find(|actors| {
            actors
                .get(user_id)
                .map(|actor| actor.groups.clone())
                .unwrap_or_default()
        }))
    }

    async fn organisation_of(&self, user_id: &UserId) -> Result<Option<Organisation>, Self::Error> {
        self.check()?;
        Ok(self.find(|actors| {
            actors
                .get(user_id)
                .and_then(|actor| actor.organisation.clone())
        }))
    }
}
