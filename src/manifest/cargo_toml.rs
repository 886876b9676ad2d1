//! Cargo.toml parser for Rust projects
//!
//! Handles:
//! - [dependencies], [dev-dependencies], [build-dependencies]
//! - target-specific dependency tables
//! - [workspace.dependencies]
//! - simple strings, inline tables and dotted `[dependencies.name]` tables
//!
//! Git, path and `workspace = true` entries carry no version and are skipped.

use crate::domain::{Dependency, Ecosystem};
use crate::error::ManifestError;
use crate::manifest::{build_pattern, replace_with_patterns, ManifestParser};
use crate::parser::{RustVersionParser, VersionParser};
use toml::{Table, Value};

const FILE_NAME: &str = "Cargo.toml";

/// Parser for Cargo.toml files
pub struct CargoTomlParser;

impl ManifestParser for CargoTomlParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let toml: Table = toml::from_str(content)
            .map_err(|e: toml::de::Error| ManifestError::toml_parse_error(FILE_NAME, e.to_string()))?;

        let mut dependencies = Vec::new();

        collect_tables(&toml, &mut dependencies);

        if let Some(target) = toml.get("target").and_then(|t| t.as_table()) {
            for target_config in target.values().filter_map(|t| t.as_table()) {
                collect_tables(target_config, &mut dependencies);
            }
        }

        if let Some(deps) = toml
            .get("workspace")
            .and_then(|w| w.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            parse_cargo_dependencies(deps, false, &mut dependencies);
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
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
        let name = regex::escape(package);
        let old = regex::escape(old);

        let patterns = [
            // serde = "1.0"
            format!(r#"(?m)(^\s*{name}\s*=\s*"){old}(")"#),
            // serde = { version = "1.0", features = [...] }
            format!(r#"(?m)(^\s*{name}\s*=\s*\{{[^}}\n]*\bversion\s*=\s*"){old}(")"#),
            // [dependencies.serde] followed by version = "1.0"
            format!(
                r#"(?m)(^\[(?:[^\]\n]*\.)?(?:dependencies|dev-dependencies|build-dependencies)\.{name}\][^\[]*?\bversion\s*=\s*"){old}(")"#
            ),
        ]
        .iter()
        .map(|p| build_pattern(FILE_NAME, package, p))
        .collect::<Result<Vec<_>, _>>()?;

        replace_with_patterns(content, &patterns, new)
            .ok_or_else(|| ManifestError::dependency_not_found(FILE_NAME, package))
    }
}

fn collect_tables(table: &Table, output: &mut Vec<Dependency>) {
    for (section, is_dev) in [
        ("dependencies", false),
        ("dev-dependencies", true),
        ("build-dependencies", true),
    ] {
        if let Some(deps) = table.get(section).and_then(|d| d.as_table()) {
            parse_cargo_dependencies(deps, is_dev, output);
        }
    }
}

fn parse_cargo_dependencies(deps: &Table, is_dev: bool, output: &mut Vec<Dependency>) {
    for (name, value) in deps {
        let version_str = match value {
            Value::String(s) => Some(s.as_str()),
            Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
            _ => None,
        };

        // Renamed dependencies (`json = { package = "serde_json", ... }`) are tracked by crate name
        let crate_name = value
            .get("package")
            .and_then(|p| p.as_str())
            .unwrap_or(name);

        if output.iter().any(|d| d.name == crate_name) {
            continue;
        }

        if let Some(spec) = version_str.and_then(|v| RustVersionParser.parse(v)) {
            let dep = Dependency::declared(crate_name, spec, Ecosystem::Cargo, FILE_NAME);
            output.push(if is_dev { dep.dev() } else { dep });
        }
    }
}
