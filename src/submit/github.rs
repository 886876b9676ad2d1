//! GitHub pull-request submitter
//!
//! Uses the git data API so no clone is needed:
//! 1. look for an open pull request from the branch
//! 2. create a tree on top of the base commit's tree
//! 3. create a commit whose parent is the base commit
//! 4. create the branch ref, or force it to the new commit
//! 5. open the pull request, then label and assign it

use crate::domain::{Credentials, NotSubmittedReason};
use crate::error::{HttpError, SubmissionError};
use crate::registry::{HttpClient, RequestOptions};
use crate::source::api_base;
use crate::submit::{ChangeSubmitter, PullRequest, SubmitOutcome, SubmitRequest};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Label added to every pull request, next to the ecosystem id
pub const DEPENDENCIES_LABEL: &str = "dependencies";

#[derive(Debug, Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ShaResponse,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

/// Opens pull requests on GitHub or GitHub Enterprise
pub struct GithubSubmitter {
    client: HttpClient,
    assignee: Option<String>,
}

impl GithubSubmitter {
    pub fn new(client: HttpClient, assignee: Option<String>) -> Self {
        Self { client, assignee }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: &str,
        method: Method,
        url: &str,
        credentials: &Credentials,
        body: Option<&Value>,
    ) -> Result<T, HttpError> {
        tracing::debug!(action, %method, url, "github request");
        self.client
            .send_json(
                method,
                url,
                credentials,
                RequestOptions {
                    accept: Some("application/vnd.github+json"),
                    body,
                },
            )
            .await
    }

    async fn open_pull_request(
        &self,
        repo_url: &str,
        owner: &str,
        branch: &str,
        credentials: &Credentials,
    ) -> Result<Option<PullResponse>, SubmissionError> {
        let url = format!("{}/pulls?state=open&head={}:{}", repo_url, owner, branch);
        let pulls: Vec<PullResponse> = self
            .call("list pull requests", Method::GET, &url, credentials, None)
            .await
            .map_err(|e| SubmissionError::http("list pull requests", e))?;
        Ok(pulls.into_iter().next())
    }

    async fn push_branch(
        &self,
        repo_url: &str,
        branch: &str,
        commit: &str,
        credentials: &Credentials,
    ) -> Result<(), SubmissionError> {
        let create = json!({ "ref": format!("refs/heads/{}", branch), "sha": commit });
        let created: Result<Value, HttpError> = self
            .call("create branch", Method::POST, &format!("{}/git/refs", repo_url), credentials, Some(&create))
            .await;

        match created {
            Ok(_) => Ok(()),
            // branch left over from a closed pull request
            Err(e) if e.status() == Some(422) => {
                let update = json!({ "sha": commit, "force": true });
                self.call::<Value>(
                    "update branch",
                    Method::PATCH,
                    &format!("{}/git/refs/heads/{}", repo_url, branch),
                    credentials,
                    Some(&update),
                )
                .await
                .map(|_| ())
                .map_err(|e| SubmissionError::http("update branch", e))
            }
            Err(e) => Err(SubmissionError::http("create branch", e)),
        }
    }

    /// Labels and assignee; failures are logged only
    async fn decorate(
        &self,
        repo_url: &str,
        number: u64,
        labels: &[&str],
        credentials: &Credentials,
    ) {
        let url = format!("{}/issues/{}/labels", repo_url, number);
        let body = json!({ "labels": labels });
        if let Err(e) = self
            .call::<Value>("add labels", Method::POST, &url, credentials, Some(&body))
            .await
        {
            tracing::warn!(number, error = %e, "failed to label pull request");
        }

        if let Some(assignee) = &self.assignee {
            let url = format!("{}/issues/{}/assignees", repo_url, number);
            let body = json!({ "assignees": [assignee] });
            if let Err(e) = self
                .call::<Value>("add assignee", Method::POST, &url, credentials, Some(&body))
                .await
            {
                tracing::warn!(number, assignee = %assignee, error = %e, "failed to assign pull request");
            }
        }
    }
}

/// Tree entries replacing each changed file
fn tree_payload(request: &SubmitRequest<'_>, base_tree: &str) -> Value {
    let entries: Vec<Value> = request
        .files
        .iter()
        .map(|file| {
            json!({
                "path": request.source.repo_path(&file.name),
                "mode": "100644",
                "type": "blob",
                "content": file.content,
            })
        })
        .collect();
    json!({ "base_tree": base_tree, "tree": entries })
}

fn pull_payload(request: &SubmitRequest<'_>, branch: &str) -> Value {
    json!({
        "title": request.title(),
        "body": request.body(),
        "head": branch,
        "base": request.source.branch,
    })
}

#[async_trait]
impl ChangeSubmitter for GithubSubmitter {
    async fn submit(&self, request: &SubmitRequest<'_>) -> Result<SubmitOutcome, SubmissionError> {
        let source = request.source;
        let credentials = request.credentials;
        if credentials.source_token().is_none() {
            return Err(SubmissionError::MissingToken {
                host: source.hostname.clone(),
            });
        }

        let repo_url = format!("{}/repos/{}", api_base(&source.hostname), source.repository);
        let owner = source.repository.split('/').next().unwrap_or_default();
        let branch = request.branch();

        if let Some(existing) = self
            .open_pull_request(&repo_url, owner, &branch, credentials)
            .await?
        {
            return Ok(SubmitOutcome::NotSubmitted(NotSubmittedReason::AlreadyOpen {
                url: existing.html_url,
            }));
        }

        let base: CommitResponse = self
            .call(
                "read base commit",
                Method::GET,
                &format!("{}/git/commits/{}", repo_url, request.base.commit),
                credentials,
                None,
            )
            .await
            .map_err(|e| SubmissionError::http("read base commit", e))?;

        let tree: ShaResponse = self
            .call(
                "create tree",
                Method::POST,
                &format!("{}/git/trees", repo_url),
                credentials,
                Some(&tree_payload(request, &base.tree.sha)),
            )
            .await
            .map_err(|e| SubmissionError::http("create tree", e))?;

        let commit_body = json!({
            "message": request.title(),
            "tree": tree.sha,
            "parents": [request.base.commit],
        });
        let commit: ShaResponse = self
            .call(
                "create commit",
                Method::POST,
                &format!("{}/git/commits", repo_url),
                credentials,
                Some(&commit_body),
            )
            .await
            .map_err(|e| SubmissionError::http("create commit", e))?;

        self.push_branch(&repo_url, &branch, &commit.sha, credentials)
            .await?;

        let pull: PullResponse = self
            .call(
                "open pull request",
                Method::POST,
                &format!("{}/pulls", repo_url),
                credentials,
                Some(&pull_payload(request, &branch)),
            )
            .await
            .map_err(|e| SubmissionError::http("open pull request", e))?;

        self.decorate(
            &repo_url,
            pull.number,
            &[DEPENDENCIES_LABEL, request.ecosystem.as_str()],
            credentials,
        )
        .await;

        tracing::info!(number = pull.number, url = %pull.html_url, "opened pull request");

        Ok(SubmitOutcome::Created(PullRequest {
            number: Some(pull.number),
            location: pull.html_url,
            branch,
        }))
    }
}
