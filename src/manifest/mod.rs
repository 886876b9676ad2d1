//! Manifest and lockfile parsing
//!
//! This module provides functionality to:
//! - Parse declared dependencies from each ecosystem's manifest
//! - Rewrite a requirement in place without disturbing formatting
//! - Read lockfiles into a snapshot of resolved versions and the
//!   requirements packages place on each other

mod cargo_toml;
mod composer_json;
mod gemfile;
mod go_mod;
pub mod lockfile;
mod package_json;
mod pyproject_toml;

pub use cargo_toml::CargoTomlParser;
pub use composer_json::ComposerJsonParser;
pub use gemfile::GemfileParser;
pub use go_mod::GoModParser;
pub use lockfile::{read_lockfile, Constraint, LockedPackage, LockfileSnapshot};
pub use package_json::PackageJsonParser;
pub use pyproject_toml::PyprojectTomlParser;

use crate::domain::{Dependency, Ecosystem};
use crate::error::ManifestError;
use regex::Regex;

/// Trait for parsing and editing manifest files
pub trait ManifestParser: Send + Sync {
    /// Parse declared dependencies from a manifest
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError>;

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;

    /// Returns the manifest file name
    fn file_name(&self) -> &'static str;

    /// Replace `package`'s requirement `old` with `new` in the manifest content
    fn update_requirement(
        &self,
        content: &str,
        package: &str,
        old: &str,
        new: &str,
    ) -> Result<String, ManifestError>;
}

/// Get a manifest parser for the specified ecosystem
pub fn get_parser(ecosystem: Ecosystem) -> Option<Box<dyn ManifestParser>> {
    match ecosystem {
        Ecosystem::NpmAndYarn => Some(Box::new(PackageJsonParser)),
        Ecosystem::Cargo => Some(Box::new(CargoTomlParser)),
        Ecosystem::Pip => Some(Box::new(PyprojectTomlParser)),
        Ecosystem::GoModules => Some(Box::new(GoModParser)),
        Ecosystem::Bundler => Some(Box::new(GemfileParser)),
        Ecosystem::Composer => Some(Box::new(ComposerJsonParser)),
        _ => None,
    }
}

/// Applies each pattern in turn, replacing the captured requirement
///
/// Every pattern must capture the text before the requirement as group 1 and
/// the text after it as group 2; the requirement itself sits between them.
/// Returns `None` when no pattern matched.
pub(crate) fn replace_with_patterns(content: &str, patterns: &[Regex], new: &str) -> Option<String> {
    let mut result = content.to_string();
    let mut updated = false;

    for re in patterns {
        if re.is_match(&result) {
            result = re
                .replace_all(&result, |caps: &regex::Captures| {
                    format!("{}{}{}", &caps[1], new, &caps[2])
                })
                .into_owned();
            updated = true;
        }
    }

    updated.then_some(result)
}

/// Builds a regex from a pattern template, mapping failures to a manifest error
pub(crate) fn build_pattern(file: &str, package: &str, pattern: &str) -> Result<Regex, ManifestError> {
    Regex::new(pattern).map_err(|e| {
        ManifestError::invalid_version_spec(file, package, format!("invalid regex pattern: {}", e))
    })
}

/// Shared requirement replacement for JSON manifests (`"name": "requirement"`)
pub(crate) fn update_json_requirement(
    file: &str,
    content: &str,
    package: &str,
    old: &str,
    new: &str,
) -> Result<String, ManifestError> {
    let pattern = format!(
        r#"("{}"\s*:\s*"){}(")"#,
        regex::escape(package),
        regex::escape(old)
    );
    let re = build_pattern(file, package, &pattern)?;
    replace_with_patterns(content, &[re], new)
        .ok_or_else(|| ManifestError::dependency_not_found(file, package))
}
