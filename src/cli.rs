//! CLI argument parsing module for depbot

use crate::domain::Provider;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Default directory for patch files written by the local provider
pub const DEFAULT_PATCH_DIR: &str = "depbot-patches";

/// Dependency update orchestrator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depbot",
    version,
    about = "Checks a repository's dependencies and opens pull requests for updates"
)]
pub struct CliArgs {
    // Ecosystem selection
    /// Package managers to update, space-delimited (e.g. "npm_and_yarn cargo")
    #[arg(long, value_name = "PM", num_args = 1..)]
    pub package_manager_list: Vec<String>,

    /// Update every known package manager
    #[arg(long)]
    pub all_package_managers: bool,

    // Repository
    /// Repository to update: owner/name for github, the repository name for codecommit, a path for local
    #[arg(long, value_name = "REPO")]
    pub project_path: String,

    /// Directory inside the repository holding the manifests
    #[arg(long, default_value = "/")]
    pub directory_path: String,

    /// Branch to read from and open pull requests against
    #[arg(long, alias = "codecommit-branch", default_value = "master")]
    pub branch: String,

    /// Where to read manifests and submit changes
    #[arg(long, value_enum, default_value_t = Provider::Github)]
    pub provider: Provider,

    // Environment
    /// Source-control host
    #[arg(long, env = "SOURCE_HOSTNAME", default_value = "github.com")]
    pub source_hostname: String,

    /// Token for the source-control host
    #[arg(long, env = "GITHUB_ACCESS_TOKEN", hide_env_values = true)]
    pub github_access_token: Option<String>,

    /// AWS region of the CodeCommit repository
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// User assigned to opened pull requests
    #[arg(long, env = "PULL_REQUESTS_ASSIGNEE")]
    pub pull_requests_assignee: Option<String>,

    // General options
    /// Dry run mode - print changes instead of submitting them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Directory for patch files when using the local provider
    #[arg(long, default_value = DEFAULT_PATCH_DIR)]
    pub patch_dir: PathBuf,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    // Package filters
    /// Exclude specific packages from update (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Update only specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    // Release filters
    /// Only update to versions released at least this long ago (e.g., 2w, 10d, 1m)
    #[arg(long)]
    pub age: Option<String>,

    /// Never change manifest requirements; only update within them
    #[arg(long)]
    pub lockfile_only: bool,

    // Output options
    /// Output the run report in JSON format
    #[arg(long)]
    pub json: bool,
}
