//! Result of computing an update for one dependency

use super::{Ecosystem, VersionSpec};
use serde::{Deserialize, Serialize};

/// A dependency with its new target version and requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedDependency {
    pub name: String,
    pub ecosystem: Ecosystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_requirement: Option<VersionSpec>,
    /// New requirement; equal to the previous one when it still admits `version`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<VersionSpec>,
    pub top_level: bool,
}

impl UpdatedDependency {
    /// Returns true if the manifest requirement has to change
    pub fn requirement_changed(&self) -> bool {
        self.previous_requirement != self.requirement
    }

    /// The version to show as "from" in messages
    pub fn from_version(&self) -> Option<&str> {
        self.previous_version.as_deref().or_else(|| {
            self.previous_requirement
                .as_ref()
                .map(|r| r.version.as_str())
                .filter(|v| !v.is_empty())
        })
    }
}
