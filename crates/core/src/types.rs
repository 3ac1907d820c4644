//! Identity and time types
//!
//! - [`MutationId`]: unique id of one mutation attempt (one log entry)
//! - [`SessionId`]: the logical session a coordinator is bound to
//! - [`UserId`]: optional acting user
//! - [`Timestamp`]: milliseconds since the Unix epoch

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a mutation attempt
///
/// Every call to the coordinator that reaches the mutation log produces one
/// `MutationId`. Conflict reports list the ids of the entries they collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(Uuid);

impl MutationId {
    /// Create a new random MutationId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use deltaguard_core::MutationId;
    ///
    /// let a = MutationId::new();
    /// let b = MutationId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        MutationId(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        MutationId(uuid)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MutationId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(MutationId)
            .map_err(|e| ParseError::InvalidId {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Logical session identity
///
/// A coordinator is bound to exactly one session for its whole life. Two
/// browser tabs, or a foreground app and a background sync task, are two
/// sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Use a caller-provided session name
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    /// Fresh random session id
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId::new(s)
    }
}

/// Acting user, when the host application knows one
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a user id
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::new(s)
    }
}

/// Milliseconds since the Unix epoch (UTC)
///
/// Applied mutations use their apply timestamp as the record version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        Timestamp(chrono::Utc::now().timestamp_millis())
    }

    /// From raw milliseconds
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Raw milliseconds
    pub const fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}
