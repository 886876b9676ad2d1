//! Dependency files moved between fetch, rewrite and submit

use serde::{Deserialize, Serialize};

/// A manifest or lockfile and its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    /// File name relative to the source directory (e.g. `package.json`)
    pub name: String,
    pub content: String,
}

impl DependencyFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Files fetched for one ecosystem, pinned to the commit they were read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFiles {
    pub files: Vec<DependencyFile>,
    /// Commit the files were read at; the base of any submitted change
    pub commit: String,
}

impl FetchedFiles {
    pub fn new(files: Vec<DependencyFile>, commit: impl Into<String>) -> Self {
        Self {
            files,
            commit: commit.into(),
        }
    }

    /// Looks up a file by name
    pub fn get(&self, name: &str) -> Option<&DependencyFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Returns the first of `names` that was fetched
    pub fn first_of(&self, names: &[&str]) -> Option<&DependencyFile> {
        names.iter().find_map(|name| self.get(name))
    }
}

/// Manifest and lockfile names an ecosystem reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLayout {
    /// The manifest, required
    pub manifest: &'static str,
    /// Lockfiles and auxiliary files, fetched when present
    pub optional: &'static [&'static str],
}

impl FileLayout {
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.manifest).chain(self.optional.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_files_lookup() {
        let fetched = FetchedFiles::new(
            vec![
                DependencyFile::new("package.json", "{}"),
                DependencyFile::new("package-lock.json", "{}"),
            ],
            "abc123",
        );
        assert!(fetched.get("package.json").is_some());
        assert!(fetched.get("yarn.lock").is_none());
        assert_eq!(
            fetched
                .first_of(&["yarn.lock", "package-lock.json"])
                .map(|f| f.name.as_str()),
            Some("package-lock.json")
        );
    }

    #[test]
    fn test_layout_names() {
        let layout = FileLayout {
            manifest: "Cargo.toml",
            optional: &["Cargo.lock"],
        };
        assert_eq!(
            layout.all_names().collect::<Vec<_>>(),
            vec!["Cargo.toml", "Cargo.lock"]
        );
    }
}
