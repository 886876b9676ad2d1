//! Fetching dependency files from the repository
//!
//! This module provides:
//! - The `FileFetcher` trait the orchestrator reads manifests through
//! - A GitHub fetcher using the REST contents API
//! - A CodeCommit fetcher using the AWS SDK
//! - A local fetcher reading a working tree

mod codecommit;
mod github;
mod local;

pub use codecommit::{connect as connect_codecommit, CodecommitFetcher};
pub use github::{api_base, GithubFetcher};
pub use local::{LocalFetcher, UNVERSIONED};

use crate::domain::{Credentials, DependencySource, FetchedFiles, FileLayout};
use crate::error::SourceError;
use async_trait::async_trait;

/// Trait for reading an ecosystem's dependency files
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Fetch the layout's files from the source directory
    ///
    /// The manifest is required; optional files are included when present.
    /// All files are read at the same commit.
    async fn fetch(
        &self,
        source: &DependencySource,
        layout: &FileLayout,
        credentials: &Credentials,
    ) -> Result<FetchedFiles, SourceError>;
}
