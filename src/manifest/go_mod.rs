//! go.mod parser for Go projects
//!
//! Handles:
//! - require statements (single and block)
//! - `// indirect` requirements, which are transitive
//! - `// pinned` comments for version pinning
//! - replace and exclude directives (skipped)
//!
//! go.mod is its own resolution: the required version is the resolved one.

use crate::domain::{Dependency, Ecosystem};
use crate::error::ManifestError;
use crate::manifest::{build_pattern, replace_with_patterns, ManifestParser};
use crate::parser::{GoVersionParser, VersionParser};
use regex::Regex;
use std::sync::LazyLock;

const FILE_NAME: &str = "go.mod";

/// Parser for go.mod files
pub struct GoModParser;

// require module/path v1.2.3 // comment
static SINGLE_REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^require\s+(\S+)\s+(v\d+\.\d+\.\d+\S*)\s*(//.*)?$").unwrap()
});

// module/path v1.2.3 // comment, inside a require ( ... ) block
static BLOCK_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(v\d+\.\d+\.\d+\S*)\s*(//.*)?$").unwrap());

impl ManifestParser for GoModParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let mut dependencies = Vec::new();
        let mut block: Option<&str> = None;

        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            if let Some(keyword) = trimmed.strip_suffix('(').map(str::trim) {
                block = Some(keyword);
                continue;
            }

            if trimmed == ")" {
                if block.is_none() {
                    return Err(ManifestError::syntax_error(
                        FILE_NAME,
                        format!("unexpected ')' on line {}", index + 1),
                    ));
                }
                block = None;
                continue;
            }

            let caps = match block {
                Some("require") => BLOCK_ENTRY_RE.captures(trimmed),
                Some(_) => continue,
                None => SINGLE_REQUIRE_RE.captures(trimmed),
            };

            if let Some(dep) = caps.and_then(|caps| parse_go_dependency(&caps)) {
                dependencies.push(dep);
            }
        }

        if block.is_some() {
            return Err(ManifestError::syntax_error(FILE_NAME, "unterminated block"));
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    fn file_name(&self) -> &'static str {
        FILE_NAME
    }

    fn update_requirement(
        &self,
        content: &str,
        package: &str,
        old: &str,
        new: &str,
    ) -> Result<String, ManifestError> {
        let pattern = format!(
            r"(?m)(^\s*(?:require\s+)?{}\s+){}(\s|$)",
            regex::escape(package),
            regex::escape(old)
        );
        let re = build_pattern(FILE_NAME, package, &pattern)?;

        replace_with_patterns(content, &[re], new)
            .ok_or_else(|| ManifestError::dependency_not_found(FILE_NAME, package))
    }
}

fn parse_go_dependency(caps: &regex::Captures) -> Option<Dependency> {
    let module = caps.get(1)?.as_str();
    let version = caps.get(2)?.as_str();
    let comment = caps.get(3).map(|m| m.as_str()).unwrap_or("");

    let raw = if comment.contains("pinned") {
        format!("{} {}", version, comment)
    } else {
        version.to_string()
    };
    let spec = GoVersionParser.parse(&raw)?;
    let resolved = spec.version.clone();

    let mut dep = Dependency::declared(module, spec, Ecosystem::GoModules, FILE_NAME)
        .with_version(resolved);
    dep.top_level = !comment.contains("indirect");
    Some(dep)
}
