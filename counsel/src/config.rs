// SPDX-License-Identifier: MIT OR Apache-2.0

use counsel_auth::GroupPolicy;
use counsel_core::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_EXPIRY_BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("expiry batch size must be at least 1")]
    ZeroBatchSize,
}

/// Configuration for an engine instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory groups unlocking privileged actions.
    pub groups: GroupPolicy,

    /// Maximum number of expired assignment records removed by one sweep.
    pub expiry_batch_size: usize,

    /// User recorded as remover of expired assignments.
    pub system_user_id: UserId,
}

impl Config {
    pub fn new(system_user_id: UserId) -> Self {
        Self {
            system_user_id,
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML, missing keys take their default.
    ///
    /// ```toml
    /// expiry_batch_size = 50
    /// system_user_id = "00000000-0000-0000-0000-000000000001"
    ///
    /// [groups]
    /// full_access = ["Advocates", "Defence Lawyers"]
    /// ```
    pub fn from_toml(value: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(value)?;
        if config.expiry_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groups: GroupPolicy::default(),
            expiry_batch_size: DEFAULT_EXPIRY_BATCH_SIZE,
            system_user_id: UserId::from_uuid(Uuid::nil()),
        }
    }
}
