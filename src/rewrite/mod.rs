//! Producing updated dependency files
//!
//! This module provides:
//! - The `FileUpdater` trait the orchestrator rewrites through
//! - Manifest requirement edits that keep the file's formatting
//! - Lockfile regeneration by the ecosystem's package manager

mod lockfile;

pub use lockfile::{lock_commands, LockfileRegenerator, SystemLockfileRegenerator};

use crate::domain::{DependencyFile, Ecosystem, FetchedFiles, FileLayout, UpdatedDependency};
use crate::error::{ManifestError, RewriteError};
use crate::manifest::{self, ManifestParser};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for turning updated dependencies into updated files
#[async_trait]
pub trait FileUpdater: Send + Sync {
    /// Returns only the files whose content changed
    ///
    /// An update that changes no file is a [`RewriteError::NothingChanged`].
    async fn updated_files(
        &self,
        updates: &[UpdatedDependency],
        files: &FetchedFiles,
    ) -> Result<Vec<DependencyFile>, RewriteError>;
}

/// Rewrites the manifest in place and relocks when a lockfile was fetched
pub struct ManifestFileUpdater {
    parser: Box<dyn ManifestParser>,
    layout: FileLayout,
    regenerator: Arc<dyn LockfileRegenerator>,
}

impl ManifestFileUpdater {
    pub fn new(
        parser: Box<dyn ManifestParser>,
        layout: FileLayout,
        regenerator: Arc<dyn LockfileRegenerator>,
    ) -> Self {
        Self {
            parser,
            layout,
            regenerator,
        }
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.parser.ecosystem()
    }

    /// Applies every changed top-level requirement to the manifest content
    fn rewrite_manifest(
        &self,
        content: &str,
        updates: &[UpdatedDependency],
    ) -> Result<String, ManifestError> {
        let mut content = content.to_string();
        for update in updates.iter().filter(|u| u.top_level && u.requirement_changed()) {
            let (Some(old), Some(new)) = (&update.previous_requirement, &update.requirement) else {
                continue;
            };
            content = self
                .parser
                .update_requirement(&content, &update.name, &old.raw, &new.raw)?;
        }
        Ok(content)
    }
}

#[async_trait]
impl FileUpdater for ManifestFileUpdater {
    async fn updated_files(
        &self,
        updates: &[UpdatedDependency],
        files: &FetchedFiles,
    ) -> Result<Vec<DependencyFile>, RewriteError> {
        let manifest_file = files
            .get(self.layout.manifest)
            .ok_or_else(|| ManifestError::not_found(self.layout.manifest))?;

        let manifest = DependencyFile::new(
            manifest_file.name.clone(),
            self.rewrite_manifest(&manifest_file.content, updates)?,
        );

        let mut working = vec![manifest];
        let lockfiles: Vec<&DependencyFile> = self
            .layout
            .optional
            .iter()
            .filter_map(|name| files.get(name))
            .collect();

        if !lockfiles.is_empty() {
            working.extend(lockfiles.into_iter().cloned());
            working = self
                .regenerator
                .regenerate(self.ecosystem(), &working, updates)
                .await?;
        }

        let changed: Vec<DependencyFile> = working
            .into_iter()
            .filter(|file| {
                files
                    .get(&file.name)
                    .map_or(true, |original| original.content != file.content)
            })
            .collect();

        if changed.is_empty() {
            return Err(RewriteError::NothingChanged {
                dependencies: updates
                    .iter()
                    .map(|u| u.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        tracing::debug!(
            files = %changed.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", "),
            "rewrote dependency files"
        );

        Ok(changed)
    }
}

/// Looks up the manifest parser and builds an updater for it
pub fn manifest_updater(
    ecosystem: Ecosystem,
    layout: FileLayout,
    regenerator: Arc<dyn LockfileRegenerator>,
) -> Option<ManifestFileUpdater> {
    manifest::get_parser(ecosystem).map(|parser| ManifestFileUpdater::new(parser, layout, regenerator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{VersionSpec, VersionSpecKind};
    use std::sync::Mutex;

    const PACKAGE_JSON: &str = r#"{
  "name": "app",
  "dependencies": {
    "foo": "^1.2.0",
    "bar": "~2.0.0"
  }
}
"#;

    const LAYOUT: FileLayout = FileLayout {
        manifest: "package.json",
        optional: &["package-lock.json"],
    };

    /// Regenerator that rewrites the lockfile to a fixed content
    struct FixedLockfile {
        content: Option<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LockfileRegenerator for FixedLockfile {
        async fn regenerate(
            &self,
            _ecosystem: Ecosystem,
            files: &[DependencyFile],
            _updates: &[UpdatedDependency],
        ) -> Result<Vec<DependencyFile>, RewriteError> {
            self.seen
                .lock()
                .unwrap()
                .extend(files.iter().map(|f| f.name.clone()));
            Ok(files
                .iter()
                .map(|f| match (f.name.as_str(), self.content) {
                    ("package-lock.json", Some(content)) => DependencyFile::new(f.name.clone(), content),
                    _ => f.clone(),
                })
                .collect())
        }
    }

    fn updater(content: Option<&'static str>) -> (ManifestFileUpdater, Arc<FixedLockfile>) {
        let regenerator = Arc::new(FixedLockfile {
            content,
            seen: Mutex::new(Vec::new()),
        });
        let updater = manifest_updater(Ecosystem::NpmAndYarn, LAYOUT, regenerator.clone()).unwrap();
        (updater, regenerator)
    }

    fn caret(version: &str) -> VersionSpec {
        VersionSpec::new(VersionSpecKind::Caret, format!("^{version}"), version).with_prefix("^")
    }

    fn update(from: &str, to: &str, requirement: VersionSpec) -> UpdatedDependency {
        UpdatedDependency {
            name: "foo".to_string(),
            ecosystem: Ecosystem::NpmAndYarn,
            previous_version: Some(from.to_string()),
            version: to.to_string(),
            previous_requirement: Some(caret("1.2.0")),
            requirement: Some(requirement),
            top_level: true,
        }
    }

    #[tokio::test]
    async fn test_rewrites_manifest_requirement() {
        let (updater, _) = updater(None);
        let files = FetchedFiles::new(vec![DependencyFile::new("package.json", PACKAGE_JSON)], "abc");

        let changed = updater
            .updated_files(&[update("1.2.0", "2.0.0", caret("2.0.0"))], &files)
            .await
            .unwrap();

        assert_eq!(changed.len(), 1);
        assert!(changed[0].content.contains(r#""foo": "^2.0.0""#));
        assert!(changed[0].content.contains(r#""bar": "~2.0.0""#));
    }

    #[tokio::test]
    async fn test_lockfile_only_change() {
        let (updater, regenerator) = updater(Some("{\"lockfileVersion\": 3}"));
        let files = FetchedFiles::new(
            vec![
                DependencyFile::new("package.json", PACKAGE_JSON),
                DependencyFile::new("package-lock.json", "{}"),
            ],
            "abc",
        );

        let changed = updater
            .updated_files(&[update("1.2.0", "1.3.0", caret("1.2.0"))], &files)
            .await
            .unwrap();

        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].name, "package-lock.json");
        assert_eq!(
            *regenerator.seen.lock().unwrap(),
            vec!["package.json", "package-lock.json"]
        );
    }

    #[tokio::test]
    async fn test_nothing_changed_is_an_error() {
        let (updater, _) = updater(None);
        let files = FetchedFiles::new(vec![DependencyFile::new("package.json", PACKAGE_JSON)], "abc");

        let err = updater
            .updated_files(&[update("1.2.0", "1.3.0", caret("1.2.0"))], &files)
            .await
            .unwrap_err();
        assert!(matches!(err, RewriteError::NothingChanged { .. }));
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let (updater, _) = updater(None);
        let files = FetchedFiles::new(Vec::new(), "abc");
        let err = updater
            .updated_files(&[update("1.2.0", "2.0.0", caret("2.0.0"))], &files)
            .await
            .unwrap_err();
        assert!(matches!(err, RewriteError::Manifest(ManifestError::NotFound { .. })));
    }
}
