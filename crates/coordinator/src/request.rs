//! Mutation requests

use deltaguard_core::{MutationId, MutationOperation, SessionId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An intent to write one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    /// What to do
    pub operation: MutationOperation,
    /// Target relation
    pub relation: String,
    /// Free-form type tag copied to the log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Target record
    pub record_id: String,
    /// New field values (ignored for DELETE)
    #[serde(default)]
    pub data: Value,
    /// Version the caller believed was current
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<i64>,
    /// Originating session
    pub session_id: SessionId,
    /// Originating user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Mutation this one derives from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_mutation_id: Option<MutationId>,
}

impl MutationRequest {
    /// Request with no optional fields set
    pub fn new(
        operation: MutationOperation,
        relation: impl Into<String>,
        record_id: impl Into<String>,
        data: Value,
        session_id: SessionId,
    ) -> Self {
        MutationRequest {
            operation,
            relation: relation.into(),
            entity_type: None,
            record_id: record_id.into(),
            data,
            base_version: None,
            session_id,
            user_id: None,
            parent_mutation_id: None,
        }
    }

    /// Set the entity type tag
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the version the change was based on
    pub fn with_base_version(mut self, version: i64) -> Self {
        self.base_version = Some(version);
        self
    }

    /// Set the user
    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Chain to an earlier mutation
    pub fn with_parent(mut self, parent: MutationId) -> Self {
        self.parent_mutation_id = Some(parent);
        self
    }
}
