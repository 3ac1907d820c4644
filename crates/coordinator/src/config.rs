//! Coordinator configuration
//!
//! Every field has a default, so an empty file is a valid config:
//!
//! ```toml
//! log_relation = "mutation_log"
//! history_limit = 50
//! enforce_base_version = false
//!
//! [relations]
//! notes = ["id", "title", "body", "tags"]
//! people = ["name", "email"]   # "id" is prepended
//! ```

use crate::error::ConfigError;
use deltaguard_log::DEFAULT_LOG_RELATION;
use deltaguard_store::{Ident, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default number of entries returned by history queries
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Settings for one [`MutationCoordinator`](crate::MutationCoordinator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Relation holding the mutation log
    pub log_relation: String,
    /// History size when the caller gives no limit
    pub history_limit: usize,
    /// Treat a stale `base_version` as a conflict
    pub enforce_base_version: bool,
    /// Relation name → ordered field list
    pub relations: BTreeMap<String, Vec<String>>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            log_relation: DEFAULT_LOG_RELATION.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            enforce_base_version: false,
            relations: BTreeMap::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: CoordinatorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every name is a usable identifier
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ident::new(self.log_relation.as_str())
            .map_err(|e| ConfigError::InvalidIdentifier(e.to_string()))?;
        self.schema().map(|_| ())
    }

    /// Static schema built from `relations`
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        Schema::from_map(&self.relations).map_err(|e| ConfigError::InvalidIdentifier(e.to_string()))
    }
}
