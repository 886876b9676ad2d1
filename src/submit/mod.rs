//! Submitting rewritten files
//!
//! This module provides:
//! - The `ChangeSubmitter` trait and its request/outcome types
//! - A GitHub submitter opening pull requests through the REST API
//! - A CodeCommit submitter opening pull requests through the AWS SDK
//! - A patch-file submitter for local working trees
//! - A dry-run submitter printing the change
//! - Pull-request titles, bodies and branch names

mod codecommit;
mod dry_run;
mod github;
pub mod message;
mod patch;

pub use codecommit::CodecommitSubmitter;
pub use dry_run::DryRunSubmitter;
pub use github::GithubSubmitter;
pub use patch::PatchSubmitter;

use crate::domain::{
    Credentials, DependencyFile, DependencySource, Ecosystem, FetchedFiles, NotSubmittedReason,
    UnlockScope, UpdatedDependency,
};
use crate::error::SubmissionError;
use async_trait::async_trait;

/// Everything needed to submit one update
#[derive(Debug, Clone, Copy)]
pub struct SubmitRequest<'a> {
    pub source: &'a DependencySource,
    pub ecosystem: Ecosystem,
    pub scope: UnlockScope,
    pub dependencies: &'a [UpdatedDependency],
    /// Changed files only
    pub files: &'a [DependencyFile],
    /// The files as fetched; `commit` is the base of the change
    pub base: &'a FetchedFiles,
    pub credentials: &'a Credentials,
}

impl SubmitRequest<'_> {
    pub fn title(&self) -> String {
        message::title(self.dependencies, self.source)
    }

    pub fn body(&self) -> String {
        message::body(self.dependencies, self.ecosystem, self.scope)
    }

    pub fn branch(&self) -> String {
        message::branch_name(self.ecosystem, self.source, self.dependencies)
    }
}

/// A submitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull-request number; patch files have none
    pub number: Option<u64>,
    /// Pull-request URL or patch file path
    pub location: String,
    pub branch: String,
}

/// Result of a submission that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(PullRequest),
    NotSubmitted(NotSubmittedReason),
}

/// Trait for publishing a rewritten change
#[async_trait]
pub trait ChangeSubmitter: Send + Sync {
    async fn submit(&self, request: &SubmitRequest<'_>) -> Result<SubmitOutcome, SubmissionError>;
}
