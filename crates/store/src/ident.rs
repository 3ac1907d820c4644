//! Validated identifiers for relation and column names
//!
//! Query text is assembled from identifiers only. An [`Ident`] can hold
//! nothing but ASCII letters, digits, and underscores (not starting with a
//! digit), so it cannot break out of its position in a statement.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A relation or column name that is safe to place in query text
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ident(String);

impl Ident {
    /// Validate and wrap a name
    ///
    /// # Examples
    ///
    /// ```
    /// use deltaguard_store::Ident;
    ///
    /// assert!(Ident::new("notes").is_ok());
    /// assert!(Ident::new("_private_2").is_ok());
    /// assert!(Ident::new("2fast").is_err());
    /// assert!(Ident::new("notes} :rm").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
        if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Ident(name))
        } else {
            Err(StoreError::InvalidIdentifier(name))
        }
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ident {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ident::new(s)
    }
}

impl TryFrom<String> for Ident {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ident::new(value)
    }
}

impl From<Ident> for String {
    fn from(ident: Ident) -> Self {
        ident.0
    }
}
