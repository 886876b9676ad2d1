//! AWS CodeCommit pull-request submitter
//!
//! 1. an existing update branch means the update is already proposed
//! 2. create the branch at the base commit
//! 3. commit the changed files onto it
//! 4. open the pull request against the source branch

use crate::domain::NotSubmittedReason;
use crate::error::SubmissionError;
use crate::submit::{ChangeSubmitter, PullRequest, SubmitOutcome, SubmitRequest};
use async_trait::async_trait;
use aws_sdk_codecommit::error::{BuildError, DisplayErrorContext};
use aws_sdk_codecommit::primitives::Blob;
use aws_sdk_codecommit::types::{PutFileEntry, Target};
use aws_sdk_codecommit::Client;

/// Commit author shown in CodeCommit
pub const AUTHOR_NAME: &str = "depbot";

/// Opens pull requests on AWS CodeCommit
pub struct CodecommitSubmitter {
    client: Client,
}

impl CodecommitSubmitter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns true when the branch exists
    async fn branch_exists(&self, repository: &str, branch: &str) -> Result<bool, SubmissionError> {
        match self
            .client
            .get_branch()
            .repository_name(repository)
            .branch_name(branch)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_branch_does_not_exist_exception()) =>
            {
                Ok(false)
            }
            Err(e) => Err(api_error("read branch", DisplayErrorContext(&e))),
        }
    }
}

fn api_error(action: &str, message: impl std::fmt::Display) -> SubmissionError {
    SubmissionError::Api {
        action: action.to_string(),
        message: message.to_string(),
    }
}

fn console_url(region: &str, repository: &str, path: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/codesuite/codecommit/repositories/{repository}/{path}?region={region}"
    )
}

/// Console link to a pull request
pub fn pull_request_url(region: &str, repository: &str, id: &str) -> String {
    console_url(region, repository, &format!("pull-requests/{id}/details"))
}

/// Console link to a branch
pub fn branch_url(region: &str, repository: &str, branch: &str) -> String {
    console_url(region, repository, &format!("browse/refs/heads/{branch}"))
}

/// One file entry per changed file, at its repository path
fn put_file_entries(request: &SubmitRequest<'_>) -> Result<Vec<PutFileEntry>, BuildError> {
    request
        .files
        .iter()
        .map(|file| {
            PutFileEntry::builder()
                .file_path(request.source.repo_path(&file.name))
                .file_content(Blob::new(file.content.as_bytes()))
                .build()
        })
        .collect()
}

fn pull_request_target(request: &SubmitRequest<'_>, branch: &str) -> Result<Target, BuildError> {
    Target::builder()
        .repository_name(&request.source.repository)
        .source_reference(branch)
        .destination_reference(&request.source.branch)
        .build()
}

#[async_trait]
impl ChangeSubmitter for CodecommitSubmitter {
    async fn submit(&self, request: &SubmitRequest<'_>) -> Result<SubmitOutcome, SubmissionError> {
        let source = request.source;
        let region = source.hostname.as_str();
        let repository = source.repository.as_str();
        let branch = request.branch();

        if self.branch_exists(repository, &branch).await? {
            tracing::debug!(repository, branch = %branch, "update branch already exists");
            return Ok(SubmitOutcome::NotSubmitted(NotSubmittedReason::AlreadyOpen {
                url: branch_url(region, repository, &branch),
            }));
        }

        self.client
            .create_branch()
            .repository_name(repository)
            .branch_name(&branch)
            .commit_id(&request.base.commit)
            .send()
            .await
            .map_err(|e| api_error("create branch", DisplayErrorContext(&e)))?;

        let entries = put_file_entries(request).map_err(|e| api_error("create commit", e))?;
        let commit = self
            .client
            .create_commit()
            .repository_name(repository)
            .branch_name(&branch)
            .parent_commit_id(&request.base.commit)
            .author_name(AUTHOR_NAME)
            .commit_message(request.title())
            .set_put_files(Some(entries))
            .send()
            .await
            .map_err(|e| api_error("create commit", DisplayErrorContext(&e)))?;
        tracing::debug!(repository, branch = %branch, commit = ?commit.commit_id(), "committed update");

        let target =
            pull_request_target(request, &branch).map_err(|e| api_error("open pull request", e))?;
        let created = self
            .client
            .create_pull_request()
            .title(request.title())
            .description(request.body())
            .targets(target)
            .send()
            .await
            .map_err(|e| api_error("open pull request", DisplayErrorContext(&e)))?;

        let id = created
            .pull_request()
            .and_then(|pr| pr.pull_request_id())
            .map(str::to_string);
        let location = match &id {
            Some(id) => pull_request_url(region, repository, id),
            None => branch_url(region, repository, &branch),
        };

        tracing::info!(repository, id = ?id, url = %location, "opened pull request");

        Ok(SubmitOutcome::Created(PullRequest {
            number: id.as_deref().and_then(|id| id.parse().ok()),
            location,
            branch,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Credentials, DependencyFile, DependencySource, Ecosystem, FetchedFiles, Provider,
        UnlockScope, UpdatedDependency,
    };

    fn with_request<R>(f: impl FnOnce(&SubmitRequest<'_>) -> R) -> R {
        let source = DependencySource::new(Provider::Codecommit, "eu-west-1", "app", "/web", "develop");
        let base = FetchedFiles::new(vec![DependencyFile::new("package.json", "{}")], "base123");
        let files = vec![
            DependencyFile::new("package.json", "{\"a\": 1}"),
            DependencyFile::new("package-lock.json", "{}"),
        ];
        let deps = vec![UpdatedDependency {
            name: "foo".to_string(),
            ecosystem: Ecosystem::NpmAndYarn,
            previous_version: Some("1.2.0".to_string()),
            version: "1.3.0".to_string(),
            previous_requirement: None,
            requirement: None,
            top_level: true,
        }];
        let credentials = Credentials::empty();
        f(&SubmitRequest {
            source: &source,
            ecosystem: Ecosystem::NpmAndYarn,
            scope: UnlockScope::None,
            dependencies: &deps,
            files: &files,
            base: &base,
            credentials: &credentials,
        })
    }

    #[test]
    fn test_put_file_entries_use_repository_paths() {
        let entries = with_request(put_file_entries).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.file_path()).collect();
        assert_eq!(paths, vec!["web/package.json", "web/package-lock.json"]);
        assert_eq!(
            entries[0].file_content().map(|b| b.as_ref()),
            Some("{\"a\": 1}".as_bytes())
        );
    }

    #[test]
    fn test_pull_request_target() {
        let target = with_request(|r| pull_request_target(r, "depbot/npm_and_yarn/web/foo-1.3.0")).unwrap();
        assert_eq!(target.repository_name(), "app");
        assert_eq!(target.source_reference(), "depbot/npm_and_yarn/web/foo-1.3.0");
        assert_eq!(target.destination_reference(), Some("develop"));
    }

    #[test]
    fn test_console_urls() {
        assert_eq!(
            pull_request_url("eu-west-1", "app", "42"),
            "https://eu-west-1.console.aws.amazon.com/codesuite/codecommit/repositories/app/pull-requests/42/details?region=eu-west-1"
        );
        assert!(branch_url("us-east-1", "app", "depbot/cargo/serde-1.0.200")
            .contains("/browse/refs/heads/depbot/cargo/serde-1.0.200?region=us-east-1"));
    }
}
