//! Local working-tree fetcher

use crate::domain::{Credentials, DependencyFile, DependencySource, FetchedFiles, FileLayout};
use crate::error::SourceError;
use crate::source::FileFetcher;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Commit recorded for trees that are not git checkouts
pub const UNVERSIONED: &str = "unversioned";

/// Reads files from a directory on disk
///
/// The repository is a filesystem path; the directory is relative to it.
#[derive(Debug, Default)]
pub struct LocalFetcher;

impl LocalFetcher {
    pub fn new() -> Self {
        Self
    }

    fn directory(source: &DependencySource) -> PathBuf {
        let root = Path::new(&source.repository);
        if source.is_root_directory() {
            root.to_path_buf()
        } else {
            root.join(source.directory.trim_start_matches('/'))
        }
    }

    async fn head_commit(root: &Path) -> String {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(root)
            .output()
            .await;
        match output {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            _ => UNVERSIONED.to_string(),
        }
    }
}

#[async_trait]
impl FileFetcher for LocalFetcher {
    async fn fetch(
        &self,
        source: &DependencySource,
        layout: &FileLayout,
        _credentials: &Credentials,
    ) -> Result<FetchedFiles, SourceError> {
        let dir = Self::directory(source);
        let mut files = Vec::new();

        for name in layout.all_names() {
            let path = dir.join(name);
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => files.push(DependencyFile::new(name, content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    if name == layout.manifest {
                        return Err(SourceError::ManifestNotFound {
                            repository: source.repository.clone(),
                            directory: source.directory.clone(),
                            file: name.to_string(),
                        });
                    }
                }
                Err(source) => return Err(SourceError::Io { path, source }),
            }
        }

        let commit = Self::head_commit(Path::new(&source.repository)).await;
        Ok(FetchedFiles::new(files, commit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provider;
    use std::fs;
    use tempfile::TempDir;

    const LAYOUT: FileLayout = FileLayout {
        manifest: "package.json",
        optional: &["package-lock.json"],
    };

    fn source(root: &Path, directory: &str) -> DependencySource {
        DependencySource::new(
            Provider::Local,
            "localhost",
            root.to_string_lossy().to_string(),
            directory,
            "master",
        )
    }

    #[tokio::test]
    async fn test_fetch_manifest_and_optional_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web/package.json"), "{}").unwrap();

        let fetched = LocalFetcher::new()
            .fetch(&source(dir.path(), "/web"), &LAYOUT, &Credentials::empty())
            .await
            .unwrap();

        assert_eq!(fetched.files.len(), 1);
        assert_eq!(fetched.files[0].name, "package.json");
        assert!(!fetched.commit.is_empty());
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package-lock.json"), "{}").unwrap();

        let err = LocalFetcher::new()
            .fetch(&source(dir.path(), "/"), &LAYOUT, &Credentials::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::ManifestNotFound { .. }));
    }
}
