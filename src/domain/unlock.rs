//! Unlock scopes and update decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of the requirement graph an update may modify
///
/// Ordered by permissiveness: `None < Own < All`. `UpdateNotPossible` is the
/// terminal fallback when no scope allows an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockScope {
    /// Only the resolved version moves; every requirement stays as written
    None,
    /// The dependency's own requirement may be rewritten
    Own,
    /// Requirements of dependents may be rewritten too
    All,
    /// No scope permits an update
    UpdateNotPossible,
}

impl UnlockScope {
    /// Returns the identifier used in logs and pull-request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockScope::None => "none",
            UnlockScope::Own => "own",
            UnlockScope::All => "all",
            UnlockScope::UpdateNotPossible => "update_not_possible",
        }
    }
}

impl fmt::Display for UnlockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the update decision for one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The dependency is already at the latest eligible release
    UpToDate,
    /// An unlock scope was selected
    Scope(UnlockScope),
}

impl Decision {
    /// Returns the scope to update with, if an update should be attempted
    pub fn actionable_scope(&self) -> Option<UnlockScope> {
        match self {
            Decision::UpToDate | Decision::Scope(UnlockScope::UpdateNotPossible) => None,
            Decision::Scope(scope) => Some(*scope),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::UpToDate => f.write_str("up to date"),
            Decision::Scope(scope) => write!(f, "{}", scope),
        }
    }
}
