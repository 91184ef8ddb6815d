// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::convert::Infallible;

use counsel_core::{CaseId, UserId};

use crate::traits::CaseAuthority;

/// Case authority answering from fixed sets of (user, case) pairs.
#[derive(Clone, Debug, Default)]
pub struct TestAuthority {
    defending: HashSet<(UserId, CaseId)>,
    prosecuting: HashSet<(UserId, CaseId)>,
}

impl TestAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defending(mut self, user_id: UserId, case_id: CaseId) -> Self {
        self.defending.insert((user_id, case_id));
        self
    }

    pub fn prosecuting(mut self, user_id: UserId, case_id: CaseId) -> Self {
        self.prosecuting.insert((user_id, case_id));
        self
    }
}

impl CaseAuthority for TestAuthority {
    type Error = Infallible;

    async fn is_defending(&self, user_id: &UserId, case_id: &CaseId) -> Result<bool, Self::Error> {
        Ok(self.defending.contains(&(*user_id, *case_id)))
    }

    async fn is_prosecuting(
        &self,
        user_id: &UserId,
        case_id: &CaseId,
    ) -> Result<bool, Self::Error> {
        Ok(self.prosecuting.contains(&(*user_id, *case_id)))
    }
}
