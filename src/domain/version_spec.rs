//! Version requirement types for the supported ecosystems
//!
//! Handles requirements like:
//! - npm: `^1.2.3`, `~1.2.3`, `>=1.0.0`, `1.2.3`, `>=1.0.0 <2.0.0`
//! - Cargo: `1.2.3` (caret), `~1.2`, `=1.2.3`
//! - Python: `==1.2.3`, `~=1.4`, `>=1.2`
//! - Ruby: `~> 1.4`, `>= 2.0`
//! - Composer: `^1.2`, `~1.2`, `1.2.*`
//! - Go: `v1.2.3`, with `// pinned` comment

use super::version::{component_count, parse_version};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of version requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpecKind {
    /// Exact version (`1.2.3` for npm, `==1.2.3` for Python, `=1.2.3` for Rust)
    Exact,
    /// Caret range (`^1.2.3`), compatible with the left-most non-zero component
    Caret,
    /// Tilde range (`~1.2.3`), compatible with the minor version
    Tilde,
    /// Pessimistic operator (`~> 1.4`, `~=1.4`, Composer `~1.4`)
    Compatible,
    /// Greater than or equal (`>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (`>1.2.3`)
    Greater,
    /// Less than or equal (`<=1.2.3`)
    LessOrEqual,
    /// Less than (`<1.2.3`)
    Less,
    /// Wildcard (`1.2.*`, `1.x`, `*`)
    Wildcard,
    /// Compound requirement (`>=1.0.0 <2.0.0`, `>=1.0,<2.0`, `^1 || ^2`)
    Range,
    /// Go module version with a `// pinned` comment
    GoPinned,
    /// No requirement written (`gem 'rails'`)
    Any,
}

impl VersionSpecKind {
    /// Returns true if a requirement of this kind can be rewritten for a new
    /// version without changing its meaning
    pub fn is_rewritable(&self) -> bool {
        !matches!(
            self,
            VersionSpecKind::GoPinned
                | VersionSpecKind::Range
                | VersionSpecKind::Wildcard
                | VersionSpecKind::Less
                | VersionSpecKind::LessOrEqual
        )
    }
}

/// A version requirement with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The kind of requirement
    pub kind: VersionSpecKind,
    /// The raw requirement as it appears in the manifest
    pub raw: String,
    /// The version number without operator or suffix
    pub version: String,
    /// Operator to preserve during updates (e.g., `^`, `~> `, `>=`)
    pub prefix: Option<String>,
    /// Trailing text to preserve (e.g., ` // pinned`)
    pub suffix: Option<String>,
}

impl VersionSpec {
    /// Creates a new VersionSpec
    pub fn new(kind: VersionSpecKind, raw: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: version.into(),
            prefix: None,
            suffix: None,
        }
    }

    /// Creates a requirement that admits every version
    pub fn any() -> Self {
        Self::new(VersionSpecKind::Any, "", "")
    }

    /// Creates a new VersionSpec with prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Creates a new VersionSpec with suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Returns true if this requirement can be rewritten for a new version
    pub fn is_rewritable(&self) -> bool {
        self.kind.is_rewritable()
    }

    /// Returns true if the given version satisfies this requirement
    pub fn admits(&self, candidate: &str) -> bool {
        let Some(candidate) = parse_version(candidate) else {
            return false;
        };

        match self.kind {
            VersionSpecKind::Any => true,
            VersionSpecKind::Range => constraint_admits(&self.raw, &candidate),
            VersionSpecKind::Wildcard => wildcard_admits(&self.version, &candidate),
            _ => {
                let Some(base) = parse_version(&self.version) else {
                    return false;
                };
                let precision = component_count(&self.version);
                match self.kind {
                    VersionSpecKind::Exact | VersionSpecKind::GoPinned => candidate == base,
                    VersionSpecKind::Caret => {
                        candidate >= base && candidate < caret_upper(&base, precision)
                    }
                    VersionSpecKind::Tilde => {
                        candidate >= base && candidate < tilde_upper(&base, precision)
                    }
                    VersionSpecKind::Compatible => {
                        candidate >= base && candidate < compatible_upper(&base, precision)
                    }
                    VersionSpecKind::GreaterOrEqual => candidate >= base,
                    VersionSpecKind::Greater => candidate > base,
                    VersionSpecKind::LessOrEqual => candidate <= base,
                    VersionSpecKind::Less => candidate < base,
                    VersionSpecKind::Any | VersionSpecKind::Range | VersionSpecKind::Wildcard => {
                        true
                    }
                }
            }
        }
    }

    /// Formats a new version while preserving the original format
    ///
    /// Pessimistic requirements keep their written precision, so `~> 1.4`
    /// becomes `~> 2.1` rather than `~> 2.1.0`.
    pub fn format_updated(&self, new_version: &str) -> String {
        let mut result = String::new();

        if let Some(ref prefix) = self.prefix {
            result.push_str(prefix);
        }

        if self.kind == VersionSpecKind::Compatible {
            result.push_str(&truncate_components(
                new_version,
                component_count(&self.version),
            ));
        } else {
            result.push_str(new_version);
        }

        if let Some(ref suffix) = self.suffix {
            result.push_str(suffix);
        }

        result
    }
}

impl VersionSpec {
    /// The same requirement re-rendered around a new version
    pub fn updated(&self, new_version: &str) -> VersionSpec {
        let version = if self.kind == VersionSpecKind::Compatible {
            truncate_components(new_version, component_count(&self.version))
        } else {
            new_version.to_string()
        };
        VersionSpec {
            kind: self.kind,
            raw: self.format_updated(new_version),
            version,
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn caret_upper(base: &Version, precision: usize) -> Version {
    if base.major > 0 || precision == 1 {
        Version::new(base.major + 1, 0, 0)
    } else if base.minor > 0 || precision == 2 {
        Version::new(0, base.minor + 1, 0)
    } else {
        Version::new(0, 0, base.patch + 1)
    }
}

fn tilde_upper(base: &Version, precision: usize) -> Version {
    if precision <= 1 {
        Version::new(base.major + 1, 0, 0)
    } else {
        Version::new(base.major, base.minor + 1, 0)
    }
}

fn compatible_upper(base: &Version, precision: usize) -> Version {
    if precision <= 2 {
        Version::new(base.major + 1, 0, 0)
    } else {
        Version::new(base.major, base.minor + 1, 0)
    }
}

fn wildcard_admits(pattern: &str, candidate: &Version) -> bool {
    let fixed: Vec<u64> = pattern
        .split('.')
        .take_while(|p| !matches!(*p, "*" | "x" | "X" | ""))
        .map_while(|p| p.parse().ok())
        .collect();
    let actual = [candidate.major, candidate.minor, candidate.patch];
    fixed.iter().zip(actual.iter()).all(|(a, b)| a == b)
}

/// Evaluates a compound requirement such as `>=1.0.0 <2.0.0` or `^1 || ^2`
fn constraint_admits(raw: &str, candidate: &Version) -> bool {
    raw.split("||").any(|alternative| {
        if let Some((low, high)) = alternative.split_once(" - ") {
            return single_admits(&format!(">={}", low.trim()), candidate)
                && single_admits(&format!("<={}", high.trim()), candidate);
        }
        let mut comparators = Vec::new();
        let mut pending_op: Option<&str> = None;
        for token in alternative.split([' ', ',']).filter(|t| !t.is_empty()) {
            // `>= 1.0` written with a space between operator and version
            if token.chars().all(|c| "<>=~^!".contains(c)) {
                pending_op = Some(token);
                continue;
            }
            match pending_op.take() {
                Some(op) => comparators.push(format!("{op}{token}")),
                None => comparators.push(token.to_string()),
            }
        }
        !comparators.is_empty()
            && comparators
                .iter()
                .all(|comparator| single_admits(comparator, candidate))
    })
}

fn single_admits(comparator: &str, candidate: &Version) -> bool {
    const OPERATORS: [&str; 11] = ["~>", "~=", "===", "==", "!=", ">=", "<=", "^", "~", ">", "<"];

    let (op, version) = OPERATORS
        .iter()
        .find_map(|op| comparator.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or_else(|| match comparator.strip_prefix('=') {
            Some(rest) => ("=", rest),
            None => ("", comparator),
        });
    let version = version.trim();

    if version.contains(['*', 'x', 'X']) || version.is_empty() {
        return wildcard_admits(version, candidate);
    }

    let kind = match op {
        "~>" | "~=" => VersionSpecKind::Compatible,
        "^" => VersionSpecKind::Caret,
        "~" => VersionSpecKind::Tilde,
        ">=" => VersionSpecKind::GreaterOrEqual,
        ">" => VersionSpecKind::Greater,
        "<=" => VersionSpecKind::LessOrEqual,
        "<" => VersionSpecKind::Less,
        "!=" => {
            return parse_version(version).is_none_or(|excluded| *candidate != excluded);
        }
        _ => VersionSpecKind::Exact,
    };
    VersionSpec::new(kind, comparator, version).admits(&candidate.to_string())
}

fn truncate_components(version: &str, count: usize) -> String {
    if count == 0 {
        return version.to_string();
    }
    match parse_version(version) {
        Some(v) => [v.major, v.minor, v.patch]
            .iter()
            .take(count.min(3))
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("."),
        None => version.to_string(),
    }
}
