//! Lockfile reading
//!
//! A lockfile pins the resolved version of every package and, for most
//! ecosystems, records the requirements packages place on each other. Both are
//! needed to decide whether an update fits the existing resolution.

use crate::domain::{DependencyFile, Ecosystem, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::ComposerJsonParser;
use crate::parser;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// A package pinned by a lockfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    /// Requirements this package places on others: (dependency name, requirement)
    pub requirements: Vec<(String, String)>,
}

impl LockedPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requirements: Vec::new(),
        }
    }

    pub fn requires(mut self, name: impl Into<String>, requirement: impl Into<String>) -> Self {
        self.requirements.push((name.into(), requirement.into()));
        self
    }
}

/// A requirement some other locked package places on a dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub dependent: String,
    pub dependent_version: String,
    pub requirement: VersionSpec,
}

/// Resolved packages read from one lockfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileSnapshot {
    ecosystem: Ecosystem,
    packages: Vec<LockedPackage>,
}

impl LockfileSnapshot {
    pub fn new(ecosystem: Ecosystem, packages: Vec<LockedPackage>) -> Self {
        Self { ecosystem, packages }
    }

    pub fn empty(ecosystem: Ecosystem) -> Self {
        Self::new(ecosystem, Vec::new())
    }

    pub fn packages(&self) -> &[LockedPackage] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Resolved version of `name`; hoisted entries come first, so they win
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.packages
            .iter()
            .find(|p| same_name(self.ecosystem, &p.name, name))
            .map(|p| p.version.as_str())
    }

    /// Every requirement other locked packages place on `name`
    ///
    /// Requirements that cannot be parsed are ignored.
    pub fn constraints_on(&self, name: &str) -> Vec<Constraint> {
        let Some(version_parser) = parser::get_parser(self.ecosystem) else {
            return Vec::new();
        };

        self.packages
            .iter()
            .filter(|p| !same_name(self.ecosystem, &p.name, name))
            .flat_map(|p| {
                p.requirements
                    .iter()
                    .filter(|(dep, _)| same_name(self.ecosystem, dep, name))
                    .filter_map(|(_, raw)| version_parser.parse(raw))
                    .map(|requirement| Constraint {
                        dependent: p.name.clone(),
                        dependent_version: p.version.clone(),
                        requirement,
                    })
            })
            .collect()
    }
}

/// Python package names compare case-insensitively with `-`, `_` and `.` equivalent
fn same_name(ecosystem: Ecosystem, a: &str, b: &str) -> bool {
    if ecosystem == Ecosystem::Pip {
        normalize_python_name(a) == normalize_python_name(b)
    } else {
        a == b
    }
}

fn normalize_python_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '.'], "-")
}

/// Reads a lockfile into a snapshot
///
/// Unrecognized lockfile names yield an empty snapshot.
pub fn read_lockfile(
    ecosystem: Ecosystem,
    file: &DependencyFile,
) -> Result<LockfileSnapshot, ManifestError> {
    let packages = match file.name.as_str() {
        "package-lock.json" => read_package_lock(&file.content)?,
        "Cargo.lock" => read_cargo_lock(&file.content)?,
        "composer.lock" => read_composer_lock(&file.content)?,
        "Gemfile.lock" => read_gemfile_lock(&file.content),
        "poetry.lock" => read_poetry_lock(&file.content)?,
        "uv.lock" => read_uv_lock(&file.content)?,
        _ => Vec::new(),
    };

    Ok(LockfileSnapshot::new(ecosystem, packages))
}

fn string_map(value: Option<&Value>) -> Vec<(String, String)> {
    value
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn read_package_lock(content: &str) -> Result<Vec<LockedPackage>, ManifestError> {
    const FILE: &str = "package-lock.json";
    let json: Value = serde_json::from_str(content)
        .map_err(|e| ManifestError::json_parse_error(FILE, e.to_string()))?;

    let mut hoisted = Vec::new();
    let mut nested = Vec::new();

    // lockfileVersion 2 and 3
    if let Some(packages) = json.get("packages").and_then(|p| p.as_object()) {
        for (path, entry) in packages {
            let Some((prefix, name)) = path.rsplit_once("node_modules/") else {
                continue;
            };
            if entry.get("link").and_then(|l| l.as_bool()).unwrap_or(false) {
                continue;
            }
            let Some(version) = entry.get("version").and_then(|v| v.as_str()) else {
                continue;
            };

            let mut package = LockedPackage::new(name, version);
            for section in ["dependencies", "optionalDependencies", "peerDependencies"] {
                package.requirements.extend(string_map(entry.get(section)));
            }

            if prefix.is_empty() {
                hoisted.push(package);
            } else {
                nested.push(package);
            }
        }
        hoisted.extend(nested);
        return Ok(hoisted);
    }

    // lockfileVersion 1
    if let Some(deps) = json.get("dependencies").and_then(|d| d.as_object()) {
        collect_v1_dependencies(deps, &mut hoisted);
    }
    Ok(hoisted)
}

fn collect_v1_dependencies(deps: &serde_json::Map<String, Value>, output: &mut Vec<LockedPackage>) {
    let mut children = Vec::new();

    for (name, entry) in deps {
        let Some(version) = entry.get("version").and_then(|v| v.as_str()) else {
            continue;
        };
        let mut package = LockedPackage::new(name.clone(), version);
        package.requirements = string_map(entry.get("requires"));
        output.push(package);

        if let Some(nested) = entry.get("dependencies").and_then(|d| d.as_object()) {
            children.push(nested);
        }
    }

    for nested in children {
        collect_v1_dependencies(nested, output);
    }
}

fn read_cargo_lock(content: &str) -> Result<Vec<LockedPackage>, ManifestError> {
    let toml: toml::Table = toml::from_str(content)
        .map_err(|e: toml::de::Error| ManifestError::toml_parse_error("Cargo.lock", e.to_string()))?;

    Ok(toml_packages(&toml)
        .filter_map(|p| {
            let name = p.get("name")?.as_str()?;
            let version = p.get("version")?.as_str()?;
            Some(LockedPackage::new(name, version))
        })
        .collect())
}

fn toml_packages(toml: &toml::Table) -> impl Iterator<Item = &toml::Table> {
    toml.get("package")
        .and_then(|p| p.as_array())
        .into_iter()
        .flatten()
        .filter_map(|p| p.as_table())
}

fn read_composer_lock(content: &str) -> Result<Vec<LockedPackage>, ManifestError> {
    const FILE: &str = "composer.lock";
    let json: Value = serde_json::from_str(content)
        .map_err(|e| ManifestError::json_parse_error(FILE, e.to_string()))?;

    let mut packages = Vec::new();
    for section in ["packages", "packages-dev"] {
        for entry in json.get(section).and_then(|p| p.as_array()).into_iter().flatten() {
            let (Some(name), Some(version)) = (
                entry.get("name").and_then(|n| n.as_str()),
                entry.get("version").and_then(|v| v.as_str()),
            ) else {
                continue;
            };

            let mut package = LockedPackage::new(name, version.trim_start_matches('v'));
            package.requirements = string_map(entry.get("require"))
                .into_iter()
                .filter(|(dep, _)| ComposerJsonParser::is_package_name(dep))
                .map(|(dep, req)| (dep, normalize_composer_or(&req)))
                .collect();
            packages.push(package);
        }
    }
    Ok(packages)
}

// Composer accepts a single `|` as an alternative to `||`
static COMPOSER_OR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\|{1,2}\s*").unwrap());

fn normalize_composer_or(requirement: &str) -> String {
    COMPOSER_OR_RE.replace_all(requirement, " || ").into_owned()
}

//     name (version)
static GEM_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^    ([^\s(]+) \(([^)]+)\)$").unwrap());

//       name (requirement)
static GEM_REQUIREMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^      ([^\s(]+)(?: \(([^)]+)\))?$").unwrap());

fn read_gemfile_lock(content: &str) -> Vec<LockedPackage> {
    let mut packages: Vec<LockedPackage> = Vec::new();
    let mut in_specs = false;

    for line in content.lines() {
        if !line.starts_with(' ') {
            in_specs = false;
            continue;
        }
        if line.trim() == "specs:" {
            in_specs = true;
            continue;
        }
        if !in_specs {
            continue;
        }

        if let Some(caps) = GEM_SPEC_RE.captures(line) {
            packages.push(LockedPackage::new(&caps[1], strip_gem_platform(&caps[2])));
        } else if let Some(caps) = GEM_REQUIREMENT_RE.captures(line) {
            let requirement = caps.get(2).map(|m| m.as_str()).unwrap_or(">= 0");
            if let Some(current) = packages.last_mut() {
                current.requirements.push((caps[1].to_string(), requirement.to_string()));
            }
        }
    }

    packages
}

/// `1.16.0-x86_64-linux` is version 1.16.0 built for a platform
fn strip_gem_platform(version: &str) -> &str {
    version.split_once('-').map(|(v, _)| v).unwrap_or(version)
}

fn read_poetry_lock(content: &str) -> Result<Vec<LockedPackage>, ManifestError> {
    let toml: toml::Table = toml::from_str(content)
        .map_err(|e: toml::de::Error| ManifestError::toml_parse_error("poetry.lock", e.to_string()))?;

    Ok(toml_packages(&toml)
        .filter_map(|p| {
            let name = p.get("name")?.as_str()?;
            let version = p.get("version")?.as_str()?;
            let mut package = LockedPackage::new(name, version);

            for (dep, value) in p.get("dependencies").and_then(|d| d.as_table()).into_iter().flatten() {
                let requirement = match value {
                    toml::Value::String(s) => Some(s.as_str()),
                    toml::Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
                    _ => None,
                };
                if let Some(requirement) = requirement {
                    package.requirements.push((dep.clone(), requirement.to_string()));
                }
            }
            Some(package)
        })
        .collect())
}

fn read_uv_lock(content: &str) -> Result<Vec<LockedPackage>, ManifestError> {
    let toml: toml::Table = toml::from_str(content)
        .map_err(|e: toml::de::Error| ManifestError::toml_parse_error("uv.lock", e.to_string()))?;

    Ok(toml_packages(&toml)
        .filter_map(|p| {
            let name = p.get("name")?.as_str()?;
            let version = p.get("version")?.as_str()?;
            let mut package = LockedPackage::new(name, version);

            let requires = p
                .get("metadata")
                .and_then(|m| m.get("requires-dist"))
                .and_then(|r| r.as_array());
            for entry in requires.into_iter().flatten() {
                if let (Some(dep), Some(specifier)) = (
                    entry.get("name").and_then(|n| n.as_str()),
                    entry.get("specifier").and_then(|s| s.as_str()),
                ) {
                    package.requirements.push((dep.to_string(), specifier.to_string()));
                }
            }
            Some(package)
        })
        .collect())
}
