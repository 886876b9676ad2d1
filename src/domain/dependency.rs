//! Dependency information structures

use super::{Ecosystem, VersionSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A package dependency found in a manifest or lockfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package name
    pub name: String,
    /// Resolved version from the lockfile, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Requirement as written in the manifest; transitive dependencies have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<VersionSpec>,
    /// Whether the dependency is declared directly in a manifest
    pub top_level: bool,
    /// The ecosystem this dependency belongs to
    pub ecosystem: Ecosystem,
    /// Whether this is a development dependency
    pub is_dev: bool,
    /// Name of the manifest declaring the dependency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

impl Dependency {
    /// Creates a top-level dependency declared in `manifest`
    pub fn declared(
        name: impl Into<String>,
        requirement: VersionSpec,
        ecosystem: Ecosystem,
        manifest: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: None,
            requirement: Some(requirement),
            top_level: true,
            ecosystem,
            is_dev: false,
            manifest: Some(manifest.into()),
        }
    }

    /// Creates a transitive dependency known only from the lockfile
    pub fn transitive(name: impl Into<String>, version: impl Into<String>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            requirement: None,
            top_level: false,
            ecosystem,
            is_dev: false,
            manifest: None,
        }
    }

    /// Marks the dependency as a development dependency (builder pattern)
    pub fn dev(mut self) -> Self {
        self.is_dev = true;
        self
    }

    /// Sets the resolved version (builder pattern)
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Returns the version to display: resolved if known, else the written one
    pub fn display_version(&self) -> Option<&str> {
        self.version.as_deref().or_else(|| {
            self.requirement
                .as_ref()
                .map(|r| r.version.as_str())
                .filter(|v| !v.is_empty())
        })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_dev { " (dev)" } else { "" };
        write!(
            f,
            "{}@{}{} [{}]",
            self.name,
            self.display_version().unwrap_or("unknown"),
            dev_marker,
            self.ecosystem
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    fn caret(version: &str) -> VersionSpec {
        VersionSpec::new(VersionSpecKind::Caret, format!("^{version}"), version).with_prefix("^")
    }

    #[test]
    fn test_declared_dependency() {
        let dep = Dependency::declared("foo", caret("1.2.0"), Ecosystem::NpmAndYarn, "package.json");
        assert!(dep.top_level);
        assert!(!dep.is_dev);
        assert_eq!(dep.manifest.as_deref(), Some("package.json"));
        assert_eq!(dep.version, None);
    }

    #[test]
    fn test_transitive_dependency() {
        let dep = Dependency::transitive("ms", "2.1.3", Ecosystem::NpmAndYarn);
        assert!(!dep.top_level);
        assert!(dep.requirement.is_none());
        assert_eq!(dep.display_version(), Some("2.1.3"));
    }

    #[test]
    fn test_display_version_prefers_resolved() {
        let dep = Dependency::declared("foo", caret("1.2.0"), Ecosystem::NpmAndYarn, "package.json")
            .with_version("1.2.4");
        assert_eq!(dep.display_version(), Some("1.2.4"));
    }

    #[test]
    fn test_display_version_without_any_version() {
        let dep = Dependency::declared("rails", VersionSpec::any(), Ecosystem::Bundler, "Gemfile");
        assert_eq!(dep.display_version(), None);
        assert_eq!(dep.to_string(), "rails@unknown [bundler]");
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::declared("jest", caret("29.0.0"), Ecosystem::NpmAndYarn, "package.json")
            .dev();
        assert_eq!(dep.to_string(), "jest@29.0.0 (dev) [npm_and_yarn]");
    }
}
