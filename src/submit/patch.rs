//! Patch-file submitter for local working trees

use crate::domain::NotSubmittedReason;
use crate::error::SubmissionError;
use crate::output::diff::changes_diff;
use crate::submit::{ChangeSubmitter, PullRequest, SubmitOutcome, SubmitRequest};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes each change as `<dir>/<branch>.patch`
///
/// A patch with identical content already on disk counts as already open.
pub struct PatchSubmitter {
    dir: PathBuf,
}

impl PatchSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn render(request: &SubmitRequest<'_>) -> String {
        format!(
            "Subject: {}\nBase: {}\n\n{}\n{}",
            request.title(),
            request.base.commit,
            request.body(),
            changes_diff(request.source, request.base, request.files)
        )
    }
}

#[async_trait]
impl ChangeSubmitter for PatchSubmitter {
    async fn submit(&self, request: &SubmitRequest<'_>) -> Result<SubmitOutcome, SubmissionError> {
        let branch = request.branch();
        let path = self.dir.join(format!("{}.patch", branch));
        let content = Self::render(request);

        if let Ok(existing) = tokio::fs::read_to_string(&path).await {
            if existing == content {
                return Ok(SubmitOutcome::NotSubmitted(NotSubmittedReason::AlreadyOpen {
                    url: path.display().to_string(),
                }));
            }
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SubmissionError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, &content)
            .await
            .map_err(|source| SubmissionError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), "wrote patch");

        Ok(SubmitOutcome::Created(PullRequest {
            number: None,
            location: path.display().to_string(),
            branch,
        }))
    }
}
