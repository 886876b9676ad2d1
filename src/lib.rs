//! depbot - dependency update orchestrator library
//!
//! For each requested package ecosystem of a repository, depbot:
//! - fetches the manifest and lockfiles from GitHub or a local checkout
//! - decides per dependency whether an update is possible and how much
//!   has to be unlocked for it
//! - rewrites the files and submits the change as a pull request or patch

pub mod backend;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
pub mod rewrite;
pub mod source;
pub mod submit;
pub mod update;
