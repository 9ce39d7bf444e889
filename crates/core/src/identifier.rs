//! Job identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies one job within a job graph.
///
/// Equality and hashing are structural, and the two kinds never compare
/// equal to each other, so `Integer(7)` and `Text("7")` are distinct
/// graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identifier {
    /// A job keyed by a unique integer.
    Integer(i64),

    /// A job keyed by a unique string.
    Text(String),
}

impl Identifier {
    /// Creates a text identifier.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Command-line flags that select this job in a child process.
    pub fn arguments(&self) -> Vec<String> {
        vec!["--job-id".to_string(), self.to_string()]
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    /// Parses an integer identifier when the token is an `i64`,
    /// otherwise a text identifier.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(id) => Ok(Self::Integer(id)),
            Err(_) => Ok(Self::Text(s.to_string())),
        }
    }
}
