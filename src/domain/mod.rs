//! Core domain models for depbot
//!
//! This module contains the fundamental types used throughout the application:
//! - Ecosystem identifiers and lenient version handling
//! - Version requirements, dependencies and computed updates
//! - Unlock scopes and update decisions
//! - Repository coordinates, credentials and fetched files
//! - Run report structures

mod credentials;
mod dependency;
mod ecosystem;
mod files;
mod report;
mod source;
mod unlock;
mod update;
pub mod version;
mod version_spec;

pub use credentials::{Credential, CredentialKind, Credentials};
pub use dependency::Dependency;
pub use ecosystem::{Ecosystem, UnknownEcosystem};
pub use files::{DependencyFile, FetchedFiles, FileLayout};
pub use report::{
    DependencyReport, EcosystemReport, EcosystemStatus, FailureStage, NotSubmittedReason,
    Outcome, RunReport, SkipReason,
};
pub use source::{DependencySource, Provider};
pub use unlock::{Decision, UnlockScope};
pub use update::UpdatedDependency;
pub use version_spec::{VersionSpec, VersionSpecKind};
