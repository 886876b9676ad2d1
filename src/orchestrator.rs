//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: fetch → parse → decide → rewrite → submit
//! - One ecosystem, one dependency and one submission at a time
//! - Failure isolation: a dependency failure never stops the run, a fetch or
//!   parse failure only stops its ecosystem

use crate::backend::{BackendRegistry, EcosystemBackend};
use crate::config::RunConfig;
use crate::domain::{
    Decision, Dependency, Ecosystem, EcosystemReport, EcosystemStatus, FailureStage,
    FetchedFiles, Outcome, Provider, RunReport, SkipReason, UnlockScope,
};
use crate::error::HttpError;
use crate::progress::Progress;
use crate::registry::HttpClient;
use crate::rewrite::SystemLockfileRegenerator;
use crate::source::{
    connect_codecommit, CodecommitFetcher, FileFetcher, GithubFetcher, LocalFetcher,
};
use crate::submit::{
    ChangeSubmitter, CodecommitSubmitter, DryRunSubmitter, GithubSubmitter, PatchSubmitter,
    SubmitOutcome, SubmitRequest,
};
use crate::update::decide;
use std::sync::Arc;

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    config: RunConfig,
    backends: BackendRegistry,
    fetcher: Arc<dyn FileFetcher>,
    submitter: Arc<dyn ChangeSubmitter>,
    show_progress: bool,
}

impl Orchestrator {
    /// Create an orchestrator with explicit collaborators
    pub fn new(
        config: RunConfig,
        backends: BackendRegistry,
        fetcher: Arc<dyn FileFetcher>,
        submitter: Arc<dyn ChangeSubmitter>,
    ) -> Self {
        Self {
            config,
            backends,
            fetcher,
            submitter,
            show_progress: false,
        }
    }

    /// Create an orchestrator with the real collaborators for the configured provider
    ///
    /// With `json`, dry-run output goes to stderr so stdout holds only the report.
    pub async fn standard(config: RunConfig, json: bool) -> Result<Self, HttpError> {
        let client = HttpClient::new()?;
        let backends =
            BackendRegistry::standard(client.clone(), Arc::new(SystemLockfileRegenerator::new()));

        let (fetcher, submitter): (Arc<dyn FileFetcher>, Arc<dyn ChangeSubmitter>) =
            match config.source.provider {
                Provider::Github => (
                    Arc::new(GithubFetcher::new(client.clone())),
                    Arc::new(GithubSubmitter::new(client, config.assignee.clone())),
                ),
                Provider::Codecommit => {
                    let aws = connect_codecommit(&config.source.hostname).await;
                    (
                        Arc::new(CodecommitFetcher::new(aws.clone())),
                        Arc::new(CodecommitSubmitter::new(aws)),
                    )
                }
                Provider::Local => (
                    Arc::new(LocalFetcher::new()),
                    Arc::new(PatchSubmitter::new(config.patch_dir.clone())),
                ),
            };

        let submitter: Arc<dyn ChangeSubmitter> = match (config.dry_run, json) {
            (true, true) => Arc::new(DryRunSubmitter::with_writer(
                Box::new(std::io::stderr()),
                true,
            )),
            (true, false) => Arc::new(DryRunSubmitter::new(true)),
            (false, _) => submitter,
        };

        Ok(Self::new(config, backends, fetcher, submitter))
    }

    /// Enable or disable progress lines (builder pattern)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the update workflow over every configured ecosystem
    pub async fn run(&self) -> RunReport {
        let mut progress = Progress::new(self.show_progress);
        let mut report = RunReport::new(&self.config.source.repository, self.config.dry_run);

        for &ecosystem in &self.config.ecosystems {
            let ecosystem_report = self.run_ecosystem(ecosystem, &mut progress).await;
            report.add(ecosystem_report);
        }

        progress.finish_and_clear();
        report
    }

    async fn run_ecosystem(&self, ecosystem: Ecosystem, progress: &mut Progress) -> EcosystemReport {
        let Some(backend) = self.backends.get(ecosystem) else {
            tracing::warn!(%ecosystem, "package manager is not supported, skipping");
            progress.note(&format!("{} is not supported, skipping", ecosystem));
            return EcosystemReport::new(ecosystem, EcosystemStatus::Unsupported);
        };

        progress.start_ecosystem(ecosystem, &self.config.source.repository);

        let files = match self
            .fetcher
            .fetch(&self.config.source, &backend.layout(), &self.config.credentials)
            .await
        {
            Ok(files) => files,
            Err(e) => return Self::ecosystem_failed(ecosystem, e.to_string(), progress),
        };

        let dependencies = match backend.parse(&files) {
            Ok(deps) => deps,
            Err(e) => return Self::ecosystem_failed(ecosystem, e.to_string(), progress),
        };
        progress.finish_and_clear();

        let mut report = EcosystemReport::new(ecosystem, EcosystemStatus::Processed);

        for dependency in dependencies.iter().filter(|d| d.top_level) {
            let from = dependency.display_version().map(str::to_string);

            if let Some(reason) = self.config.filter.skip_reason(&dependency.name) {
                tracing::debug!(name = %dependency.name, %reason, "filtered out");
                report.record(&dependency.name, from, Outcome::Skipped { reason });
                continue;
            }

            progress.start_dependency(&dependency.name);
            let outcome = self
                .update_dependency(backend.as_ref(), dependency, &dependencies, &files)
                .await;
            progress.dependency(&dependency.name, from.as_deref(), &outcome);
            report.record(&dependency.name, from, outcome);
        }

        report
    }

    fn ecosystem_failed(ecosystem: Ecosystem, message: String, progress: &mut Progress) -> EcosystemReport {
        tracing::error!(%ecosystem, error = %message, "failed to read dependency files");
        progress.note(&format!("failed: {}", message));
        EcosystemReport::new(ecosystem, EcosystemStatus::Failed { message })
    }

    /// Decide, rewrite and submit one dependency
    ///
    /// Every failure is turned into an outcome so the loop can go on.
    async fn update_dependency(
        &self,
        backend: &dyn EcosystemBackend,
        dependency: &Dependency,
        dependencies: &[Dependency],
        files: &FetchedFiles,
    ) -> Outcome {
        let failed = |stage: FailureStage, message: String| {
            tracing::warn!(name = %dependency.name, %stage, error = %message, "update failed");
            Outcome::Failed { stage, message }
        };

        let checker = match backend.checker(
            dependency,
            dependencies,
            files,
            &self.config.credentials,
            &self.config.filter,
        ) {
            Ok(checker) => checker,
            Err(e) => return failed(FailureStage::Resolution, e.to_string()),
        };

        let decision = match decide(checker.as_ref()).await {
            Ok(decision) => decision,
            Err(e) => return failed(FailureStage::Resolution, e.to_string()),
        };
        tracing::debug!(name = %dependency.name, ?decision, "decided");

        let scope = match decision {
            Decision::UpToDate => {
                return Outcome::Skipped {
                    reason: SkipReason::UpToDate,
                }
            }
            Decision::Scope(UnlockScope::UpdateNotPossible) => {
                return Outcome::Skipped {
                    reason: SkipReason::UpdateNotPossible,
                }
            }
            Decision::Scope(scope @ (UnlockScope::None | UnlockScope::Own | UnlockScope::All)) => {
                scope
            }
        };

        let updated = match checker.updated_dependencies(scope).await {
            Ok(updated) => updated,
            Err(e) => return failed(FailureStage::Resolution, e.to_string()),
        };
        let Some(to) = updated
            .iter()
            .find(|u| u.name == dependency.name)
            .or_else(|| updated.first())
            .map(|u| u.version.clone())
        else {
            return failed(
                FailureStage::Resolution,
                format!("no updated dependencies at unlock scope {}", scope),
            );
        };

        let changed = match backend.updated_files(&updated, files).await {
            Ok(changed) => changed,
            Err(e) => return failed(FailureStage::Rewrite, e.to_string()),
        };

        let request = SubmitRequest {
            source: &self.config.source,
            ecosystem: backend.ecosystem(),
            scope,
            dependencies: &updated,
            files: &changed,
            base: files,
            credentials: &self.config.credentials,
        };

        match self.submitter.submit(&request).await {
            Ok(SubmitOutcome::Created(pr)) => Outcome::Submitted {
                scope,
                to,
                location: pr.location,
            },
            Ok(SubmitOutcome::NotSubmitted(reason)) => Outcome::NotSubmitted { scope, to, reason },
            Err(e) => failed(FailureStage::Submission, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use crate::domain::{Credentials, DependencySource, FileLayout};
    use crate::error::SourceError;
    use async_trait::async_trait;
    use clap::Parser;

    struct MissingFiles;

    #[async_trait]
    impl FileFetcher for MissingFiles {
        async fn fetch(
            &self,
            source: &DependencySource,
            layout: &FileLayout,
            _credentials: &Credentials,
        ) -> Result<FetchedFiles, SourceError> {
            Err(SourceError::ManifestNotFound {
                repository: source.repository.clone(),
                directory: source.directory.clone(),
                file: layout.manifest.to_string(),
            })
        }
    }

    fn config(list: &str) -> RunConfig {
        let args = CliArgs::parse_from([
            "depbot",
            "--project-path",
            "acme/app",
            "--package-manager-list",
            list,
            "--dry-run",
        ]);
        RunConfig::from_args(&args).unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_ecosystem_is_reported() {
        let orchestrator = Orchestrator::new(
            config("docker"),
            BackendRegistry::empty(),
            Arc::new(MissingFiles),
            Arc::new(DryRunSubmitter::with_writer(Box::new(std::io::sink()), false)),
        );
        let report = orchestrator.run().await;
        assert_eq!(
            report.ecosystem(Ecosystem::Docker).unwrap().status,
            EcosystemStatus::Unsupported
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_only_that_ecosystem() {
        let backends = BackendRegistry::standard(
            HttpClient::new().unwrap(),
            Arc::new(SystemLockfileRegenerator::new()),
        );
        let orchestrator = Orchestrator::new(
            config("cargo docker"),
            backends,
            Arc::new(MissingFiles),
            Arc::new(DryRunSubmitter::with_writer(Box::new(std::io::sink()), false)),
        );
        let report = orchestrator.run().await;

        assert_eq!(report.ecosystems.len(), 2);
        assert!(matches!(
            report.ecosystem(Ecosystem::Cargo).unwrap().status,
            EcosystemStatus::Failed { .. }
        ));
        assert_eq!(
            report.ecosystem(Ecosystem::Docker).unwrap().status,
            EcosystemStatus::Unsupported
        );
    }

    #[tokio::test]
    async fn test_standard_collaborators() {
        let orchestrator = Orchestrator::standard(config("cargo"), false).await.unwrap();
        assert_eq!(orchestrator.config().ecosystems, vec![Ecosystem::Cargo]);
    }

    #[tokio::test]
    async fn test_standard_codecommit_collaborators() {
        let args = CliArgs::parse_from([
            "depbot",
            "--provider",
            "codecommit",
            "--aws-region",
            "eu-west-1",
            "--project-path",
            "app",
            "--package-manager-list",
            "cargo",
        ]);
        let config = RunConfig::from_args(&args).unwrap();
        let orchestrator = Orchestrator::standard(config, false).await.unwrap();
        assert_eq!(orchestrator.config().source.hostname, "eu-west-1");
        assert!(!orchestrator.config().dry_run);
    }
}
