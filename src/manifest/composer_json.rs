//! composer.json parser for PHP projects
//!
//! Handles:
//! - require section dependencies
//! - require-dev section dependencies
//!
//! Platform requirements (`php`, `ext-*`, `lib-*`, `composer-*`) are not
//! packages and are skipped.

use crate::domain::{Dependency, Ecosystem};
use crate::error::ManifestError;
use crate::manifest::{update_json_requirement, ManifestParser};
use crate::parser::{PhpVersionParser, VersionParser};
use serde_json::Value;

const FILE_NAME: &str = "composer.json";

/// Parser for composer.json files
pub struct ComposerJsonParser;

impl ComposerJsonParser {
    /// Returns true for real packages (`vendor/name`), false for platform requirements
    pub fn is_package_name(name: &str) -> bool {
        name.contains('/')
    }
}

impl ManifestParser for ComposerJsonParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(FILE_NAME, e.to_string()))?;

        let mut dependencies = Vec::new();

        for (section, is_dev) in [("require", false), ("require-dev", true)] {
            let Some(deps) = json.get(section).and_then(|v| v.as_object()) else {
                continue;
            };
            for (name, value) in deps {
                if !Self::is_package_name(name) {
                    continue;
                }
                let Some(spec) = value.as_str().and_then(|v| PhpVersionParser.parse(v)) else {
                    continue;
                };
                let dep = Dependency::declared(name.clone(), spec, Ecosystem::Composer, FILE_NAME);
                dependencies.push(if is_dev { dep.dev() } else { dep });
            }
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
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
        update_json_requirement(FILE_NAME, content, package, old, new)
    }
}
