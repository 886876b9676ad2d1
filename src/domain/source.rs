//! Repository coordinates for one run

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where manifests are read from and changes are submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// A repository on GitHub or GitHub Enterprise
    Github,
    /// An AWS CodeCommit repository; the hostname holds the AWS region
    Codecommit,
    /// A working tree on the local filesystem
    Local,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Codecommit => "codecommit",
            Provider::Local => "local",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Provider::Github),
            "codecommit" => Ok(Provider::Codecommit),
            "local" => Ok(Provider::Local),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Repository coordinates, constant for a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySource {
    pub provider: Provider,
    /// Source-control host, e.g. `github.com`, or the AWS region for CodeCommit
    pub hostname: String,
    /// `owner/name` for GitHub, the repository name for CodeCommit, a filesystem path for local
    pub repository: String,
    /// Directory inside the repository holding the manifests, always starting with `/`
    pub directory: String,
    pub branch: String,
}

impl DependencySource {
    /// Creates a source, normalizing the directory to a leading `/` without a trailing one
    pub fn new(
        provider: Provider,
        hostname: impl Into<String>,
        repository: impl Into<String>,
        directory: &str,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            hostname: hostname.into(),
            repository: repository.into(),
            directory: normalize_directory(directory),
            branch: branch.into(),
        }
    }

    /// Returns true when the manifests live at the repository root
    pub fn is_root_directory(&self) -> bool {
        self.directory == "/"
    }

    /// Joins a file name onto the directory, without a leading `/`
    pub fn repo_path(&self, file_name: &str) -> String {
        let dir = self.directory.trim_start_matches('/');
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", dir, file_name)
        }
    }
}

fn normalize_directory(directory: &str) -> String {
    let trimmed = directory.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}
