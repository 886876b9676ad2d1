//! Update filter configuration
//!
//! This module provides the UpdateFilter struct that encapsulates the
//! package and release filters given on the command line.

use crate::domain::SkipReason;
use crate::update::VersionInfo;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Filter configuration for update decisions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    /// Packages to exclude from updates
    pub exclude: Vec<String>,
    /// If non-empty, only update these packages
    pub only: Vec<String>,
    /// Minimum age for versions to be considered
    pub min_age: Option<Duration>,
    /// Never rewrite requirements; only updates inside them are allowed
    pub lockfile_only: bool,
}

impl UpdateFilter {
    /// Create a new UpdateFilter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set packages to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set packages to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    /// Set minimum age for versions
    pub fn with_min_age(mut self, age: Duration) -> Self {
        self.min_age = Some(age);
        self
    }

    pub fn with_lockfile_only(mut self, lockfile_only: bool) -> Self {
        self.lockfile_only = lockfile_only;
        self
    }

    /// Why a package is filtered out, or `None` if it should be processed
    ///
    /// `--only` takes precedence over `--exclude`.
    pub fn skip_reason(&self, name: &str) -> Option<SkipReason> {
        if !self.only.is_empty() {
            return (!self.only.iter().any(|p| p == name)).then_some(SkipReason::NotInOnlyList);
        }
        self.exclude
            .iter()
            .any(|p| p == name)
            .then_some(SkipReason::Excluded)
    }

    /// Check if a release is old enough to be considered
    ///
    /// Releases without a known date pass, as do all releases when no
    /// minimum age is set.
    pub fn is_old_enough(&self, version: &VersionInfo, now: DateTime<Utc>) -> bool {
        let (Some(min_age), Some(released_at)) = (self.min_age, version.released_at) else {
            return true;
        };
        match chrono::Duration::from_std(min_age) {
            Ok(min_age) => now - released_at >= min_age,
            Err(_) => false,
        }
    }
}

/// Parse duration string in format: Nd (days), Nw (weeks), Nm (months)
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, days_per_unit) = if let Some(n) = s.strip_suffix('d') {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('w') {
        (n, 7)
    } else if let Some(n) = s.strip_suffix('m') {
        // months are 30 days
        (n, 30)
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;

    Ok(Duration::from_secs(num * days_per_unit * 24 * 60 * 60))
}
