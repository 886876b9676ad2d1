//! pyproject.toml parser for Python projects
//!
//! Handles:
//! - project.dependencies (PEP 621)
//! - project.optional-dependencies (PEP 621)
//! - tool.poetry.dependencies (Poetry)
//! - tool.poetry.dev-dependencies and tool.poetry.group.*.dependencies

use crate::domain::{Dependency, Ecosystem, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::{build_pattern, replace_with_patterns, ManifestParser};
use crate::parser::{PythonVersionParser, VersionParser};
use regex::Regex;
use std::sync::LazyLock;
use toml::{Table, Value};

const FILE_NAME: &str = "pyproject.toml";

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

// PEP 508 specifier: name, optional extras, then the version requirement
static PEP508_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*([^;@]*)").unwrap()
});

impl ManifestParser for PyprojectTomlParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let toml: Table = toml::from_str(content)
            .map_err(|e: toml::de::Error| ManifestError::toml_parse_error(FILE_NAME, e.to_string()))?;

        let mut dependencies = Vec::new();
        let project = toml.get("project");

        if let Some(deps) = project
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array())
        {
            for dep in deps.iter().filter_map(|d| d.as_str()) {
                push_unique(&mut dependencies, parse_pep508_dependency(dep, false));
            }
        }

        if let Some(optional) = project
            .and_then(|p| p.get("optional-dependencies"))
            .and_then(|d| d.as_table())
        {
            for (group, deps) in optional {
                let is_dev = is_dev_group(group);
                for dep in deps.as_array().into_iter().flatten().filter_map(|d| d.as_str()) {
                    push_unique(&mut dependencies, parse_pep508_dependency(dep, is_dev));
                }
            }
        }

        let poetry = toml.get("tool").and_then(|t| t.get("poetry"));

        if let Some(deps) = poetry
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            for (name, value) in deps {
                // The interpreter constraint is not a package
                if name == "python" {
                    continue;
                }
                push_unique(&mut dependencies, parse_poetry_dependency(name, value, false));
            }
        }

        if let Some(deps) = poetry
            .and_then(|p| p.get("dev-dependencies"))
            .and_then(|d| d.as_table())
        {
            for (name, value) in deps {
                push_unique(&mut dependencies, parse_poetry_dependency(name, value, true));
            }
        }

        if let Some(groups) = poetry
            .and_then(|p| p.get("group"))
            .and_then(|g| g.as_table())
        {
            for (group_name, group) in groups {
                let is_dev = is_dev_group(group_name);
                if let Some(deps) = group.get("dependencies").and_then(|d| d.as_table()) {
                    for (name, value) in deps {
                        push_unique(&mut dependencies, parse_poetry_dependency(name, value, is_dev));
                    }
                }
            }
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
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
            // "requests[security]>=2.28 ; python_version >= '3.8'"
            format!(r#"(["'](?i:{name})\s*(?:\[[^\]]*\])?\s*){old}(\s*(?:;[^"'\n]*)?["'])"#),
            // requests = "^2.28"
            format!(r#"(?m)(^\s*(?i:{name})\s*=\s*["']){old}(["'])"#),
            // requests = { version = "^2.28", extras = [...] }
            format!(r#"(?m)(^\s*(?i:{name})\s*=\s*\{{[^}}\n]*\bversion\s*=\s*["']){old}(["'])"#),
        ]
        .iter()
        .map(|p| build_pattern(FILE_NAME, package, p))
        .collect::<Result<Vec<_>, _>>()?;

        replace_with_patterns(content, &patterns, new)
            .ok_or_else(|| ManifestError::dependency_not_found(FILE_NAME, package))
    }
}

fn is_dev_group(group: &str) -> bool {
    matches!(group, "dev" | "test" | "tests" | "lint" | "typing")
}

fn push_unique(output: &mut Vec<Dependency>, dep: Option<Dependency>) {
    if let Some(dep) = dep {
        if !output.iter().any(|d| d.name.eq_ignore_ascii_case(&dep.name)) {
            output.push(dep);
        }
    }
}

fn declared(name: &str, spec: VersionSpec, is_dev: bool) -> Dependency {
    let dep = Dependency::declared(name, spec, Ecosystem::Pip, FILE_NAME);
    if is_dev {
        dep.dev()
    } else {
        dep
    }
}

/// Parses a PEP 508 string such as `requests>=2.28` or `numpy`
fn parse_pep508_dependency(dep_str: &str, is_dev: bool) -> Option<Dependency> {
    let caps = PEP508_RE.captures(dep_str.trim())?;
    let name = caps.get(1)?.as_str();
    let requirement = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    let spec = if requirement.is_empty() {
        VersionSpec::any()
    } else {
        PythonVersionParser.parse(requirement)?
    };

    Some(declared(name, spec, is_dev))
}

/// Parses a Poetry entry: a string or a table with a `version` key
fn parse_poetry_dependency(name: &str, value: &Value, is_dev: bool) -> Option<Dependency> {
    let version_str = match value {
        Value::String(s) => s.as_str(),
        Value::Table(t) => t.get("version")?.as_str()?,
        _ => return None,
    };

    Some(declared(name, PythonVersionParser.parse(version_str)?, is_dev))
}
