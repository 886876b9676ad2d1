//! Lockfile regeneration through the ecosystem's package manager
//!
//! The files are copied into a temporary directory, the ecosystem's lock
//! command is run there, and the files are read back.

use crate::domain::{DependencyFile, Ecosystem, UpdatedDependency};
use crate::error::RewriteError;
use async_trait::async_trait;
use std::path::Path;
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;

/// Trait for regenerating lockfiles after a manifest edit
#[async_trait]
pub trait LockfileRegenerator: Send + Sync {
    /// Returns `files` as they are after locking `updates`
    ///
    /// `files` holds the already rewritten manifest and the current lockfile.
    async fn regenerate(
        &self,
        ecosystem: Ecosystem,
        files: &[DependencyFile],
        updates: &[UpdatedDependency],
    ) -> Result<Vec<DependencyFile>, RewriteError>;
}

/// Regenerator that runs the real package-manager commands
#[derive(Debug, Default)]
pub struct SystemLockfileRegenerator;

impl SystemLockfileRegenerator {
    pub fn new() -> Self {
        Self
    }

    async fn write_files(
        dir: &Path,
        ecosystem: Ecosystem,
        files: &[DependencyFile],
    ) -> Result<(), RewriteError> {
        for file in files {
            let path = dir.join(&file.name);
            fs::write(&path, &file.content)
                .await
                .map_err(|source| RewriteError::Io { path, source })?;
        }

        // cargo refuses to lock a package without a target
        if ecosystem == Ecosystem::Cargo {
            let src = dir.join("src");
            fs::create_dir_all(&src).await.map_err(|source| RewriteError::Io {
                path: src.clone(),
                source,
            })?;
            let lib = src.join("lib.rs");
            fs::write(&lib, "")
                .await
                .map_err(|source| RewriteError::Io { path: lib, source })?;
        }

        Ok(())
    }

    async fn read_files(dir: &Path, files: &[DependencyFile]) -> Result<Vec<DependencyFile>, RewriteError> {
        let mut regenerated = Vec::with_capacity(files.len());
        for file in files {
            let path = dir.join(&file.name);
            let content = fs::read_to_string(&path)
                .await
                .map_err(|source| RewriteError::Io { path, source })?;
            regenerated.push(DependencyFile::new(file.name.clone(), content));
        }
        Ok(regenerated)
    }

    /// Run a command and capture output
    async fn run_command(
        ecosystem: Ecosystem,
        command: &[String],
        working_dir: &Path,
    ) -> Result<(), RewriteError> {
        let rendered = command.join(" ");
        let Some((program, args)) = command.split_first() else {
            return Err(RewriteError::Lockfile {
                ecosystem,
                command: rendered,
                message: "empty command".to_string(),
            });
        };

        tracing::debug!(command = %rendered, dir = %working_dir.display(), "regenerating lockfile");

        let output = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
            .await
            .map_err(|e| RewriteError::Lockfile {
                ecosystem,
                command: rendered.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RewriteError::Lockfile {
                ecosystem,
                command: rendered,
                message: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl LockfileRegenerator for SystemLockfileRegenerator {
    async fn regenerate(
        &self,
        ecosystem: Ecosystem,
        files: &[DependencyFile],
        updates: &[UpdatedDependency],
    ) -> Result<Vec<DependencyFile>, RewriteError> {
        let dir = TempDir::new().map_err(|source| RewriteError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
        Self::write_files(dir.path(), ecosystem, files).await?;

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        for command in lock_commands(ecosystem, &names, updates) {
            Self::run_command(ecosystem, &command, dir.path()).await?;
        }

        Self::read_files(dir.path(), files).await
    }
}

/// The commands that relock `updates`, in order
///
/// `files` are the names present in the working directory; pip picks uv or
/// poetry by the lockfile it finds.
pub fn lock_commands(
    ecosystem: Ecosystem,
    files: &[&str],
    updates: &[UpdatedDependency],
) -> Vec<Vec<String>> {
    let owned = |parts: &[&str]| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();
    let names = || updates.iter().map(|u| u.name.clone());

    match ecosystem {
        // npm update stays inside the manifest ranges, which already admit every target
        Ecosystem::NpmAndYarn => {
            let mut cmd = owned(&["npm", "update", "--package-lock-only", "--ignore-scripts"]);
            cmd.extend(names());
            vec![cmd]
        }
        Ecosystem::Cargo => updates
            .iter()
            .map(|u| {
                let mut cmd = owned(&["cargo", "update", "-p"]);
                cmd.push(format!(
                    "{}@{}",
                    u.name,
                    u.previous_version.as_deref().unwrap_or(&u.version)
                ));
                cmd.push("--precise".to_string());
                cmd.push(u.version.clone());
                cmd
            })
            .collect(),
        Ecosystem::Bundler => {
            let mut cmd = owned(&["bundle", "lock", "--update"]);
            cmd.extend(names());
            vec![cmd]
        }
        Ecosystem::Composer => {
            let mut cmd = owned(&["composer", "update"]);
            cmd.extend(names());
            cmd.extend(owned(&["--no-install", "--no-scripts", "--no-interaction"]));
            vec![cmd]
        }
        Ecosystem::Pip if files.contains(&"uv.lock") => {
            let mut cmd = owned(&["uv", "lock"]);
            for update in updates {
                cmd.push("--upgrade-package".to_string());
                cmd.push(format!("{}=={}", update.name, update.version));
            }
            vec![cmd]
        }
        Ecosystem::Pip if files.contains(&"poetry.lock") => {
            let mut cmd = owned(&["poetry", "update", "--lock"]);
            cmd.extend(names());
            vec![cmd]
        }
        Ecosystem::GoModules => updates
            .iter()
            .map(|u| vec!["go".to_string(), "get".to_string(), format!("{}@v{}", u.name, u.version)])
            .collect(),
        _ => Vec::new(),
    }
}
