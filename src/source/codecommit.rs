//! AWS CodeCommit fetcher
//!
//! The branch is resolved to a commit once, then every file is read at that
//! commit with `GetFile`. AWS credentials come from the SDK's default chain.

use crate::domain::{Credentials, DependencyFile, DependencySource, FetchedFiles, FileLayout};
use crate::error::SourceError;
use crate::source::FileFetcher;
use async_trait::async_trait;
use aws_sdk_codecommit::config::Region;
use aws_sdk_codecommit::error::DisplayErrorContext;
use aws_sdk_codecommit::Client;

/// Build a CodeCommit client for a region from the default AWS configuration
pub async fn connect(region: &str) -> Client {
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    Client::new(&config)
}

/// Reads files from a CodeCommit repository at the head of a branch
pub struct CodecommitFetcher {
    client: Client,
}

impl CodecommitFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn head_commit(&self, source: &DependencySource) -> Result<String, SourceError> {
        let branch_not_found = || SourceError::BranchNotFound {
            repository: source.repository.clone(),
            branch: source.branch.clone(),
        };

        let output = self
            .client
            .get_branch()
            .repository_name(&source.repository)
            .branch_name(&source.branch)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_branch_does_not_exist_exception())
                {
                    branch_not_found()
                } else {
                    SourceError::Api {
                        repository: source.repository.clone(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        output
            .branch()
            .and_then(|b| b.commit_id())
            .map(str::to_string)
            .ok_or_else(branch_not_found)
    }

    /// File content at a commit, or `None` when the file does not exist
    async fn file_at(
        &self,
        source: &DependencySource,
        name: &str,
        commit: &str,
    ) -> Result<Option<String>, SourceError> {
        let path = source.repo_path(name);
        let result = self
            .client
            .get_file()
            .repository_name(&source.repository)
            .commit_specifier(commit)
            .file_path(&path)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(
                String::from_utf8_lossy(output.file_content().as_ref()).into_owned(),
            )),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_file_does_not_exist_exception()) =>
            {
                Ok(None)
            }
            Err(e) => Err(SourceError::Api {
                repository: source.repository.clone(),
                message: format!("reading {}: {}", path, DisplayErrorContext(&e)),
            }),
        }
    }
}

#[async_trait]
impl FileFetcher for CodecommitFetcher {
    async fn fetch(
        &self,
        source: &DependencySource,
        layout: &FileLayout,
        _credentials: &Credentials,
    ) -> Result<FetchedFiles, SourceError> {
        let commit = self.head_commit(source).await?;
        tracing::debug!(
            repository = %source.repository,
            region = %source.hostname,
            branch = %source.branch,
            %commit,
            "resolved branch"
        );

        let mut files = Vec::new();
        for name in layout.all_names() {
            match self.file_at(source, name, &commit).await? {
                Some(content) => files.push(DependencyFile::new(name, content)),
                None if name == layout.manifest => {
                    return Err(SourceError::ManifestNotFound {
                        repository: source.repository.clone(),
                        directory: source.directory.clone(),
                        file: name.to_string(),
                    });
                }
                None => {}
            }
        }

        Ok(FetchedFiles::new(files, commit))
    }
}
