//! Resolved configuration types shared across crates.
//!
//! Raw TOML deserialization structs stay private in `silently-config`. The
//! config loader resolves them into these types at the parse boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens to a failure stored on a deferred computation that nobody observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Drop the failure. Nothing is recorded.
    Swallow,
    /// Log at error level and record the failure.
    Log,
    /// Log, record, and mark the run as failed.
    #[default]
    Escalate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown orphan policy `{0}`; expected swallow, log or escalate")]
pub struct OrphanPolicyParseError(String);

impl OrphanPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swallow => "swallow",
            Self::Log => "log",
            Self::Escalate => "escalate",
        }
    }

    /// Whether orphaned failures are kept for later inspection.
    #[must_use]
    pub const fn records(self) -> bool {
        !matches!(self, Self::Swallow)
    }

    /// Whether an orphaned failure marks the whole run as failed.
    #[must_use]
    pub const fn escalates(self) -> bool {
        matches!(self, Self::Escalate)
    }
}

impl FromStr for OrphanPolicy {
    type Err = OrphanPolicyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "swallow" => Ok(Self::Swallow),
            "log" => Ok(Self::Log),
            "escalate" => Ok(Self::Escalate),
            _ => Err(OrphanPolicyParseError(raw.to_string())),
        }
    }
}

impl fmt::Display for OrphanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
