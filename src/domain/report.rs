//! Run report types
//!
//! Tracks what happened to every ecosystem and dependency during a run.

use super::{Ecosystem, UnlockScope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason why a dependency was not updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Already at the latest eligible release
    UpToDate,
    /// No unlock scope permits an update
    UpdateNotPossible,
    /// Package was excluded via --exclude
    Excluded,
    /// Package not in --only list
    NotInOnlyList,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UpToDate => write!(f, "up to date"),
            SkipReason::UpdateNotPossible => write!(f, "update not possible"),
            SkipReason::Excluded => write!(f, "excluded by --exclude"),
            SkipReason::NotInOnlyList => write!(f, "not in --only list"),
        }
    }
}

/// Reason why a computed change was not submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotSubmittedReason {
    /// An open pull request already carries this update
    AlreadyOpen { url: String },
    /// Dry run: the change was printed, nothing was pushed
    DryRun,
}

impl fmt::Display for NotSubmittedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotSubmittedReason::AlreadyOpen { url } => write!(f, "already open: {}", url),
            NotSubmittedReason::DryRun => write!(f, "dry run"),
        }
    }
}

/// Stage at which a dependency failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Resolution,
    Rewrite,
    Submission,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Resolution => write!(f, "resolution"),
            FailureStage::Rewrite => write!(f, "rewrite"),
            FailureStage::Submission => write!(f, "submission"),
        }
    }
}

/// What happened to one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// A change was submitted (pull request or patch file)
    Submitted {
        scope: UnlockScope,
        to: String,
        location: String,
    },
    /// A change was computed but not submitted
    NotSubmitted {
        scope: UnlockScope,
        to: String,
        reason: NotSubmittedReason,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        stage: FailureStage,
        message: String,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Submitted { .. } => write!(f, "submitted"),
            Outcome::NotSubmitted { reason, .. } => write!(f, "not submitted ({})", reason),
            Outcome::Skipped { reason } => write!(f, "skipped ({})", reason),
            Outcome::Failed { stage, message } => write!(f, "{} failed: {}", stage, message),
        }
    }
}

/// Outcome for one dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub outcome: Outcome,
}

/// How far processing of an ecosystem got
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EcosystemStatus {
    /// Manifests fetched and parsed; see the dependency outcomes
    Processed,
    /// The ecosystem has no backend
    Unsupported,
    /// Fetching or parsing failed
    Failed { message: String },
}

/// Results for one ecosystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemReport {
    pub ecosystem: Ecosystem,
    pub status: EcosystemStatus,
    pub dependencies: Vec<DependencyReport>,
}

impl EcosystemReport {
    pub fn new(ecosystem: Ecosystem, status: EcosystemStatus) -> Self {
        Self {
            ecosystem,
            status,
            dependencies: Vec::new(),
        }
    }

    pub fn record(&mut self, name: impl Into<String>, from: Option<String>, outcome: Outcome) {
        self.dependencies.push(DependencyReport {
            name: name.into(),
            from,
            outcome,
        });
    }

    /// Returns the report for a dependency by name
    pub fn dependency(&self, name: &str) -> Option<&DependencyReport> {
        self.dependencies.iter().find(|d| d.name == name)
    }
}

/// Overall summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub repository: String,
    pub ecosystems: Vec<EcosystemReport>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn new(repository: impl Into<String>, dry_run: bool) -> Self {
        Self {
            repository: repository.into(),
            ecosystems: Vec::new(),
            dry_run,
        }
    }

    pub fn add(&mut self, report: EcosystemReport) {
        self.ecosystems.push(report);
    }

    fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.ecosystems
            .iter()
            .flat_map(|e| e.dependencies.iter().map(|d| &d.outcome))
    }

    pub fn submitted_count(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, Outcome::Submitted { .. }))
            .count()
    }

    pub fn not_submitted_count(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, Outcome::NotSubmitted { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, Outcome::Skipped { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o, Outcome::Failed { .. }))
            .count()
    }

    /// Returns the report for an ecosystem
    pub fn ecosystem(&self, ecosystem: Ecosystem) -> Option<&EcosystemReport> {
        self.ecosystems.iter().find(|e| e.ecosystem == ecosystem)
    }
}
