//! Version information from registry
//!
//! This module provides the VersionInfo struct that represents
//! a published release with its release date and, when the registry reports
//! them, the requirements it places on other packages.

use crate::domain::version::{compare_versions, is_prerelease};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a package version from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// The version string (e.g., "1.2.3")
    pub version: String,
    /// When this version was released, if the registry says
    pub released_at: Option<DateTime<Utc>>,
    /// Withdrawn from the registry
    pub yanked: bool,
    /// Requirements on other packages; `None` when the registry does not report them
    pub requirements: Option<BTreeMap<String, String>>,
}

/// What a release says about another package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementOn<'a> {
    /// The registry does not report this release's requirements
    Unknown,
    /// The release does not depend on the package
    Absent,
    Requires(&'a str),
}

impl VersionInfo {
    /// Create a new VersionInfo
    pub fn new(version: impl Into<String>, released_at: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            released_at: Some(released_at),
            yanked: false,
            requirements: None,
        }
    }

    /// Create a VersionInfo without a release date
    pub fn undated(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            released_at: None,
            yanked: false,
            requirements: None,
        }
    }

    pub fn yanked(mut self) -> Self {
        self.yanked = true;
        self
    }

    /// Record a requirement this release places on `package`
    pub fn requires(mut self, package: impl Into<String>, requirement: impl Into<String>) -> Self {
        self.requirements
            .get_or_insert_with(BTreeMap::new)
            .insert(package.into(), requirement.into());
        self
    }

    /// Mark the requirements as known, even if there are none
    pub fn with_requirements(mut self, requirements: BTreeMap<String, String>) -> Self {
        self.requirements = Some(requirements);
        self
    }

    pub fn is_prerelease(&self) -> bool {
        is_prerelease(&self.version)
    }

    pub fn requirement_on(&self, package: &str) -> RequirementOn<'_> {
        match &self.requirements {
            None => RequirementOn::Unknown,
            Some(map) => match map.get(package) {
                Some(requirement) => RequirementOn::Requires(requirement),
                None => RequirementOn::Absent,
            },
        }
    }
}

/// Orders releases by version precedence alone, for `sort_by` and `max_by`
pub fn by_version(a: &VersionInfo, b: &VersionInfo) -> std::cmp::Ordering {
    compare_versions(&a.version, &b.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_version_info_new() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let info = VersionInfo::new("1.2.3", date);
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.released_at, Some(date));
        assert!(!info.yanked);
    }

    #[test]
    fn test_version_sorting() {
        let mut versions = vec![
            VersionInfo::undated("2.0.0"),
            VersionInfo::undated("1.0.0"),
            VersionInfo::undated("1.10.0"),
            VersionInfo::undated("1.0.1"),
        ];

        versions.sort_by(by_version);

        let sorted: Vec<_> = versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(sorted, vec!["1.0.0", "1.0.1", "1.10.0", "2.0.0"]);
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        let beta = VersionInfo::undated("2.0.0-beta.1");
        let release = VersionInfo::undated("2.0.0");
        assert_eq!(by_version(&beta, &release), std::cmp::Ordering::Less);
        assert!(beta.is_prerelease());
    }

    #[test]
    fn test_same_version_with_different_metadata_is_not_equal() {
        let dated = VersionInfo::new("1.0.0", Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
        let undated = VersionInfo::undated("1.0.0");
        assert_eq!(by_version(&dated, &undated), std::cmp::Ordering::Equal);
        assert_ne!(dated, undated);
    }

    #[test]
    fn test_requirement_on() {
        let unknown = VersionInfo::undated("1.0.0");
        assert_eq!(unknown.requirement_on("foo"), RequirementOn::Unknown);

        let none = VersionInfo::undated("1.0.0").with_requirements(BTreeMap::new());
        assert_eq!(none.requirement_on("foo"), RequirementOn::Absent);

        let some = VersionInfo::undated("1.0.0").requires("foo", "^2.0.0");
        assert_eq!(some.requirement_on("foo"), RequirementOn::Requires("^2.0.0"));
        assert_eq!(some.requirement_on("bar"), RequirementOn::Absent);
    }

    #[test]
    fn test_serde_version_info() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let info = VersionInfo::new("1.2.3", date).yanked();

        let json = serde_json::to_string(&info).unwrap();
        let parsed: VersionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, info);
    }
}
