/// Push policies: how a new snapshot relates to the forward (redo) branch.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Governs what `push` does with entries after the cursor.
///
/// The serialized names (`clearpath`, `insertion`, `lineare`) are the ones
/// stored in saved snapshots and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Policy {
    /// Pushing after an undo discards the forward branch.
    #[default]
    #[serde(rename = "clearpath")]
    ClearPath,
    /// Pushing after an undo inserts in front of the forward branch, keeping it.
    #[serde(rename = "insertion")]
    Insertion,
    /// Pushing always appends to the end, wherever the cursor is.
    #[serde(rename = "lineare")]
    Linear,
}

impl Policy {
    /// Every policy, in wire-name order.
    pub const ALL: [Policy; 3] = [Policy::ClearPath, Policy::Insertion, Policy::Linear];

    /// The name used in saved snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::ClearPath => "clearpath",
            Policy::Insertion => "insertion",
            Policy::Linear => "lineare",
        }
    }

    /// Matches `name` against the closed set of policy names.
    ///
    /// Matching is exact: `"ClearPath"` or `" clearpath"` are rejected.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
            anyhow::anyhow!("unknown policy {s:?}, expected one of {}", valid.join(", "))
        })
    }
}
