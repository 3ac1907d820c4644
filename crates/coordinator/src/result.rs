//! Mutation outcomes

use crate::error::MutationError;
use deltaguard_core::MutationId;
use deltaguard_delta::RecordDelta;

/// `version` of a mutation that did not apply
pub const FAILED_VERSION: i64 = -1;

/// Outcome of one mutation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// The write reached the store
    pub success: bool,
    /// Id of this attempt (and of its log entry, if one was written)
    pub mutation_id: MutationId,
    /// Target record
    pub record_id: String,
    /// Log entries this attempt conflicted with
    pub conflicts: Vec<MutationId>,
    /// Computed delta, on success
    pub delta: Option<RecordDelta>,
    /// Apply timestamp in milliseconds, or [`FAILED_VERSION`]
    pub version: i64,
    /// Why the attempt failed
    pub error: Option<MutationError>,
}

impl MutationResult {
    pub(crate) fn applied(
        mutation_id: MutationId,
        record_id: String,
        delta: RecordDelta,
        version: i64,
    ) -> Self {
        MutationResult {
            success: true,
            mutation_id,
            record_id,
            conflicts: Vec::new(),
            delta: Some(delta),
            version,
            error: None,
        }
    }

    pub(crate) fn failed(mutation_id: MutationId, record_id: String, error: MutationError) -> Self {
        let conflicts = match &error {
            MutationError::Conflict { conflicts } => conflicts.clone(),
            _ => Vec::new(),
        };
        MutationResult {
            success: false,
            mutation_id,
            record_id,
            conflicts,
            delta: None,
            version: FAILED_VERSION,
            error: Some(error),
        }
    }

    /// Failed because of a conflict
    pub fn is_conflict(&self) -> bool {
        self.error.as_ref().map_or(false, MutationError::is_conflict)
    }

    /// Error text, if the attempt failed
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// `Ok(self)` if the mutation applied, otherwise its error
    pub fn into_result(self) -> Result<Self, MutationError> {
        match (self.success, self.error) {
            (true, _) => Ok(MutationResult { error: None, ..self }),
            (false, Some(error)) => Err(error),
            (false, None) => Err(MutationError::ApplyFailure {
                message: format!("mutation {} did not apply", self.mutation_id),
            }),
        }
    }
}
