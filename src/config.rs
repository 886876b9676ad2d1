//! Run configuration
//!
//! Command-line arguments and environment are validated once into a
//! [`RunConfig`] that is passed down unchanged for the whole run.

use crate::cli::CliArgs;
use crate::domain::{Credential, Credentials, DependencySource, Ecosystem, Provider};
use crate::error::ConfigError;
use crate::update::{parse_duration, UpdateFilter};
use std::path::PathBuf;

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Ecosystems to process, in the requested order
    pub ecosystems: Vec<Ecosystem>,
    pub source: DependencySource,
    pub credentials: Credentials,
    pub assignee: Option<String>,
    pub filter: UpdateFilter,
    pub dry_run: bool,
    pub patch_dir: PathBuf,
}

impl RunConfig {
    /// Validate CLI arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let ecosystems = select_ecosystems(&args.package_manager_list, args.all_package_managers)?;

        let mut filter = UpdateFilter::new()
            .with_exclude(args.exclude.clone())
            .with_only(args.only.clone())
            .with_lockfile_only(args.lockfile_only);
        if let Some(age) = &args.age {
            let age = parse_duration(age).map_err(|_| ConfigError::InvalidDuration {
                value: age.clone(),
            })?;
            filter = filter.with_min_age(age);
        }

        let token = args
            .github_access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if args.provider == Provider::Github && !args.dry_run && token.is_none() {
            return Err(ConfigError::MissingToken {
                host: args.source_hostname.clone(),
            });
        }

        // CodeCommit repositories are addressed by region instead of host
        let hostname = match args.provider {
            Provider::Codecommit => args
                .aws_region
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or(ConfigError::MissingRegion)?
                .to_string(),
            Provider::Github | Provider::Local => args.source_hostname.clone(),
        };

        let credentials = Credentials::new(
            token
                .map(|t| Credential::git_source(args.source_hostname.clone(), t))
                .into_iter()
                .collect(),
        );

        Ok(Self {
            ecosystems,
            source: DependencySource::new(
                args.provider,
                hostname,
                args.project_path.clone(),
                &args.directory_path,
                args.branch.clone(),
            ),
            credentials,
            assignee: args
                .pull_requests_assignee
                .clone()
                .filter(|a| !a.trim().is_empty()),
            filter,
            dry_run: args.dry_run,
            patch_dir: args.patch_dir.clone(),
        })
    }
}

/// Resolve the requested ecosystems
///
/// Each entry may hold several whitespace-separated identifiers. Every
/// unknown identifier is reported, not just the first. Duplicates are
/// dropped.
pub fn select_ecosystems(list: &[String], all: bool) -> Result<Vec<Ecosystem>, ConfigError> {
    let tokens: Vec<&str> = list.iter().flat_map(|entry| entry.split_whitespace()).collect();

    if all && !tokens.is_empty() {
        return Err(ConfigError::ConflictingOptions {
            message: "--package-manager-list cannot be combined with --all-package-managers"
                .to_string(),
        });
    }
    if all {
        return Ok(Ecosystem::all().to_vec());
    }

    let mut ecosystems = Vec::new();
    let mut invalid = Vec::new();
    for token in tokens {
        match token.parse::<Ecosystem>() {
            Ok(eco) if !ecosystems.contains(&eco) => ecosystems.push(eco),
            Ok(_) => {}
            Err(_) => invalid.push(token.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(ConfigError::InvalidEcosystems {
            invalid,
            supported: Ecosystem::identifiers(),
        });
    }
    if ecosystems.is_empty() {
        return Err(ConfigError::NoEcosystems);
    }

    Ok(ecosystems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> CliArgs {
        let mut full = vec![
            "depbot",
            "--project-path",
            "acme/app",
            "--github-access-token",
            "secret",
        ];
        full.extend_from_slice(extra);
        CliArgs::parse_from(full)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_ecosystems_space_delimited() {
        let selected = select_ecosystems(&strings(&["npm_and_yarn cargo", "pip"]), false).unwrap();
        assert_eq!(
            selected,
            vec![Ecosystem::NpmAndYarn, Ecosystem::Cargo, Ecosystem::Pip]
        );
    }

    #[test]
    fn test_select_ecosystems_dedupes() {
        let selected = select_ecosystems(&strings(&["cargo", "cargo"]), false).unwrap();
        assert_eq!(selected, vec![Ecosystem::Cargo]);
    }

    #[test]
    fn test_select_ecosystems_reports_every_invalid() {
        let err = select_ecosystems(&strings(&["npm_and_yarn", "rubygems", "yarn"]), false)
            .unwrap_err();
        match err {
            ConfigError::InvalidEcosystems { invalid, supported } => {
                assert_eq!(invalid, vec!["rubygems", "yarn"]);
                assert!(supported.contains("github_actions"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_all() {
        assert_eq!(select_ecosystems(&[], true).unwrap().len(), 16);
    }

    #[test]
    fn test_select_conflict_and_empty() {
        assert!(matches!(
            select_ecosystems(&strings(&["cargo"]), true),
            Err(ConfigError::ConflictingOptions { .. })
        ));
        assert!(matches!(
            select_ecosystems(&[], false),
            Err(ConfigError::NoEcosystems)
        ));
        assert!(matches!(
            select_ecosystems(&strings(&["  "]), false),
            Err(ConfigError::NoEcosystems)
        ));
    }

    #[test]
    fn test_from_args() {
        let config = RunConfig::from_args(&args(&[
            "--package-manager-list",
            "bundler",
            "--directory-path",
            "web/",
            "--age",
            "2w",
            "--exclude",
            "rails",
        ]))
        .unwrap();

        assert_eq!(config.ecosystems, vec![Ecosystem::Bundler]);
        assert_eq!(config.source.directory, "/web");
        assert_eq!(config.source.repository, "acme/app");
        assert_eq!(config.credentials.source_token(), Some("secret"));
        assert_eq!(config.filter.exclude, vec!["rails"]);
        assert_eq!(
            config.filter.min_age,
            Some(std::time::Duration::from_secs(14 * 24 * 60 * 60))
        );
    }

    #[test]
    fn test_invalid_age() {
        let err = RunConfig::from_args(&args(&["--all-package-managers", "--age", "soon"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { .. }));
    }

    #[test]
    fn test_github_requires_token_unless_dry_run() {
        let no_token = |extra: &[&str]| {
            let mut full = vec![
                "depbot",
                "--project-path",
                "acme/app",
                "--all-package-managers",
                "--github-access-token",
                "",
            ];
            full.extend_from_slice(extra);
            RunConfig::from_args(&CliArgs::parse_from(full))
        };

        assert!(matches!(no_token(&[]), Err(ConfigError::MissingToken { .. })));
        assert!(no_token(&["--dry-run"]).is_ok());
        assert!(no_token(&["--provider", "local"]).is_ok());
        assert!(no_token(&["--provider", "codecommit", "--aws-region", "us-east-1"]).is_ok());
    }

    #[test]
    fn test_codecommit_source() {
        let config = RunConfig::from_args(&args(&[
            "--all-package-managers",
            "--provider",
            "codecommit",
            "--aws-region",
            "eu-west-1",
            "--codecommit-branch",
            "develop",
        ]))
        .unwrap();

        assert_eq!(config.source.provider, Provider::Codecommit);
        assert_eq!(config.source.hostname, "eu-west-1");
        assert_eq!(config.source.repository, "acme/app");
        assert_eq!(config.source.branch, "develop");
    }

    #[test]
    fn test_codecommit_requires_region() {
        let err = RunConfig::from_args(&args(&[
            "--all-package-managers",
            "--provider",
            "codecommit",
            "--aws-region",
            " ",
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRegion));
    }
}
