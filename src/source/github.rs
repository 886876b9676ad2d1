//! GitHub contents API fetcher

use crate::domain::{Credentials, DependencyFile, DependencySource, FetchedFiles, FileLayout};
use crate::error::{HttpError, SourceError};
use crate::registry::{HttpClient, RequestOptions};
use crate::source::FileFetcher;
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// REST API root for a GitHub or GitHub Enterprise host
pub fn api_base(hostname: &str) -> String {
    if hostname == "github.com" {
        "https://api.github.com".to_string()
    } else {
        format!("https://{}/api/v3", hostname)
    }
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
}

/// Reads files from a GitHub repository at the head of a branch
pub struct GithubFetcher {
    client: HttpClient,
}

impl GithubFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    async fn head_commit(
        &self,
        source: &DependencySource,
        credentials: &Credentials,
    ) -> Result<String, SourceError> {
        let url = format!(
            "{}/repos/{}/commits/{}",
            api_base(&source.hostname),
            source.repository,
            source.branch
        );
        let commit: CommitResponse = self
            .client
            .get_json(&url, credentials)
            .await
            .map_err(|e| match e.status() {
                Some(404) | Some(422) => SourceError::BranchNotFound {
                    repository: source.repository.clone(),
                    branch: source.branch.clone(),
                },
                _ => SourceError::Http {
                    repository: source.repository.clone(),
                    source: e,
                },
            })?;
        Ok(commit.sha)
    }

    /// Raw file content at a commit, or `None` when the file does not exist
    async fn file_at(
        &self,
        source: &DependencySource,
        name: &str,
        commit: &str,
        credentials: &Credentials,
    ) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            api_base(&source.hostname),
            source.repository,
            source.repo_path(name),
            commit
        );
        let options = RequestOptions {
            accept: Some(RAW_MEDIA_TYPE),
            body: None,
        };
        match self.client.request(Method::GET, &url, credentials, options).await {
            Ok(content) => Ok(Some(content)),
            Err(HttpError::NotFound { .. }) => Ok(None),
            Err(e) => Err(SourceError::Http {
                repository: source.repository.clone(),
                source: e,
            }),
        }
    }
}

#[async_trait]
impl FileFetcher for GithubFetcher {
    async fn fetch(
        &self,
        source: &DependencySource,
        layout: &FileLayout,
        credentials: &Credentials,
    ) -> Result<FetchedFiles, SourceError> {
        let commit = self.head_commit(source, credentials).await?;
        tracing::debug!(repository = %source.repository, branch = %source.branch, %commit, "resolved branch");

        let mut files = Vec::new();
        for name in layout.all_names() {
            match self.file_at(source, name, &commit, credentials).await? {
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
