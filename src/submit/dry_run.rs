//! Dry-run submitter

use crate::domain::NotSubmittedReason;
use crate::error::SubmissionError;
use crate::output::diff::changes_diff;
use crate::submit::{ChangeSubmitter, SubmitOutcome, SubmitRequest};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Prints the change instead of submitting it
///
/// Output goes to the given writer, stdout by default.
pub struct DryRunSubmitter {
    writer: Mutex<Box<dyn Write + Send>>,
    show_diff: bool,
}

impl DryRunSubmitter {
    pub fn new(show_diff: bool) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), show_diff)
    }

    pub fn with_writer(writer: Box<dyn Write + Send>, show_diff: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            show_diff,
        }
    }

    fn render(&self, request: &SubmitRequest<'_>) -> String {
        let mut text = format!("branch: {}\ntitle: {}\n\n{}", request.branch(), request.title(), request.body());
        if self.show_diff {
            text.push('\n');
            text.push_str(&changes_diff(request.source, request.base, request.files));
        }
        text
    }
}

#[async_trait]
impl ChangeSubmitter for DryRunSubmitter {
    async fn submit(&self, request: &SubmitRequest<'_>) -> Result<SubmitOutcome, SubmissionError> {
        let text = self.render(request);
        let mut writer = self.writer.lock().map_err(|_| SubmissionError::Rejected {
            action: "dry run".to_string(),
            message: "output writer poisoned".to_string(),
        })?;
        writeln!(writer, "{}", text)
            .and_then(|_| writer.flush())
            .map_err(|source| SubmissionError::Io {
                path: "<stdout>".into(),
                source,
            })?;

        Ok(SubmitOutcome::NotSubmitted(NotSubmittedReason::DryRun))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Credentials, DependencyFile, DependencySource, Ecosystem, FetchedFiles, Provider,
        UnlockScope, UpdatedDependency,
    };
    use std::sync::Arc;

    /// Writer sharing its buffer with the test
    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dry_run_prints_and_does_not_submit() {
        let buffer = Buffer::default();
        let submitter = DryRunSubmitter::with_writer(Box::new(buffer.clone()), true);

        let source = DependencySource::new(Provider::Github, "github.com", "acme/app", "/", "master");
        let base = FetchedFiles::new(vec![DependencyFile::new("go.mod", "require x v1.0.0\n")], "abc");
        let files = vec![DependencyFile::new("go.mod", "require x v1.1.0\n")];
        let deps = vec![UpdatedDependency {
            name: "x".to_string(),
            ecosystem: Ecosystem::GoModules,
            previous_version: Some("1.0.0".to_string()),
            version: "1.1.0".to_string(),
            previous_requirement: None,
            requirement: None,
            top_level: true,
        }];
        let credentials = Credentials::empty();
        let request = SubmitRequest {
            source: &source,
            ecosystem: Ecosystem::GoModules,
            scope: UnlockScope::None,
            dependencies: &deps,
            files: &files,
            base: &base,
            credentials: &credentials,
        };

        let outcome = submitter.submit(&request).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::NotSubmitted(NotSubmittedReason::DryRun));

        let printed = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(printed.contains("title: Bump x from 1.0.0 to 1.1.0"));
        assert!(printed.contains("branch: depbot/go_modules/x-1.1.0"));
        assert!(printed.contains("+require x v1.1.0"));
    }
}
