//! Unified diffs of rewritten dependency files
//!
//! Used for patch files and dry-run output.

use crate::domain::{DependencyFile, DependencySource, FetchedFiles};
use similar::TextDiff;

/// Lines of context around each hunk
const CONTEXT_RADIUS: usize = 3;

/// Unified diff of one file, with `a/` and `b/` repository paths
pub fn file_diff(path: &str, old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(CONTEXT_RADIUS)
        .header(&format!("a/{}", path), &format!("b/{}", path))
        .to_string()
}

/// Unified diff of every changed file against the fetched originals
///
/// Files that were not fetched diff against empty content.
pub fn changes_diff(
    source: &DependencySource,
    originals: &FetchedFiles,
    changed: &[DependencyFile],
) -> String {
    changed
        .iter()
        .map(|file| {
            let old = originals
                .get(&file.name)
                .map(|f| f.content.as_str())
                .unwrap_or("");
            file_diff(&source.repo_path(&file.name), old, &file.content)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Provider;

    #[test]
    fn test_file_diff() {
        let diff = file_diff(
            "package.json",
            "{\n  \"foo\": \"^1.2.0\"\n}\n",
            "{\n  \"foo\": \"^1.3.0\"\n}\n",
        );
        assert!(diff.starts_with("--- a/package.json\n+++ b/package.json\n"));
        assert!(diff.contains("-  \"foo\": \"^1.2.0\""));
        assert!(diff.contains("+  \"foo\": \"^1.3.0\""));
    }

    #[test]
    fn test_changes_diff_uses_directory() {
        let source = DependencySource::new(Provider::Github, "github.com", "acme/app", "/web", "main");
        let originals = FetchedFiles::new(vec![DependencyFile::new("Gemfile", "gem \"rails\", \"~> 7.0\"\n")], "abc");
        let changed = vec![DependencyFile::new("Gemfile", "gem \"rails\", \"~> 7.1\"\n")];

        let diff = changes_diff(&source, &originals, &changed);
        assert!(diff.contains("--- a/web/Gemfile"));
        assert!(diff.contains("+gem \"rails\", \"~> 7.1\""));
    }

    #[test]
    fn test_identical_content_has_no_hunks() {
        assert!(!file_diff("go.mod", "module x\n", "module x\n").contains("@@"));
    }
}
