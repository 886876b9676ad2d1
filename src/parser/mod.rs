//! Version requirement parsers for the supported ecosystems
//!
//! This module provides parsers for requirements written in:
//! - Node.js (npm/yarn)
//! - Rust (cargo)
//! - Python (pip/poetry)
//! - Go (go mod)
//! - Ruby (bundler)
//! - PHP (composer)
//!
//! Every ecosystem shares the same grammar of `operator version`, compound
//! ranges and wildcards; they differ in which operators exist and in what a
//! bare version means.

mod go;
mod node;
mod php;
mod python;
mod ruby;
mod rust;

pub use go::GoVersionParser;
pub use node::NodeVersionParser;
pub use php::PhpVersionParser;
pub use python::PythonVersionParser;
pub use ruby::RubyVersionParser;
pub use rust::RustVersionParser;

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use regex::Regex;
use std::sync::LazyLock;

/// Trait for parsing version requirements
pub trait VersionParser: Send + Sync {
    /// Parse a version requirement string
    fn parse(&self, version_str: &str) -> Option<VersionSpec>;

    /// Returns the ecosystem this parser handles
    fn ecosystem(&self) -> Ecosystem;
}

/// Get a version parser for the specified ecosystem
pub fn get_parser(ecosystem: Ecosystem) -> Option<Box<dyn VersionParser>> {
    match ecosystem {
        Ecosystem::NpmAndYarn => Some(Box::new(NodeVersionParser)),
        Ecosystem::Cargo => Some(Box::new(RustVersionParser)),
        Ecosystem::Pip => Some(Box::new(PythonVersionParser)),
        Ecosystem::GoModules => Some(Box::new(GoVersionParser)),
        Ecosystem::Bundler => Some(Box::new(RubyVersionParser)),
        Ecosystem::Composer => Some(Box::new(PhpVersionParser)),
        _ => None,
    }
}

// A single `operator version` requirement; the operator may be followed by spaces
static SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(~>|~=|===|==|!=|>=|<=|\^|~|>|<|=)?\s*(v?)(\d+(?:\.\d+)*(?:-[0-9A-Za-z.]+|\.?[A-Za-z][0-9A-Za-z.]*)?)$",
    )
    .unwrap()
});

// `*`, `1.x`, `1.2.*`, optionally behind `=` or `==`
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:==?\s*)?(?:\d+\.)*[xX*]$").unwrap());

static FIRST_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)*").unwrap());

/// Parses a requirement with an ecosystem's operator table
///
/// `operators` maps each accepted operator to its kind; `bare` is the kind of
/// a version written without an operator. Requirements combining several
/// comparators become [`VersionSpecKind::Range`].
pub(crate) fn parse_requirement(
    version_str: &str,
    operators: &[(&str, VersionSpecKind)],
    bare: VersionSpecKind,
) -> Option<VersionSpec> {
    let trimmed = version_str.trim();

    if trimmed.is_empty() {
        return None;
    }

    if WILDCARD_RE.is_match(trimmed) {
        let pattern = trimmed.trim_start_matches(['=', ' ']);
        return Some(VersionSpec::new(VersionSpecKind::Wildcard, trimmed, pattern));
    }

    if let Some(caps) = SINGLE_RE.captures(trimmed) {
        let version = caps.get(3)?;
        let kind = match caps.get(1).map(|m| m.as_str()) {
            None => bare,
            Some("!=") => VersionSpecKind::Range,
            Some(op) => operators.iter().find(|(o, _)| *o == op)?.1,
        };
        if kind == VersionSpecKind::Range {
            return Some(VersionSpec::new(kind, trimmed, version.as_str()));
        }
        let prefix = &trimmed[..version.start()];
        let spec = VersionSpec::new(kind, trimmed, version.as_str());
        return Some(if prefix.is_empty() {
            spec
        } else {
            spec.with_prefix(prefix)
        });
    }

    if trimmed.contains(['<', '>', '=', '^', '~', ',', '|', '-', ' ']) {
        let first = FIRST_VERSION_RE.find(trimmed)?.as_str();
        return Some(VersionSpec::new(VersionSpecKind::Range, trimmed, first));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_parser_supported() {
        for ecosystem in [
            Ecosystem::NpmAndYarn,
            Ecosystem::Cargo,
            Ecosystem::Pip,
            Ecosystem::GoModules,
            Ecosystem::Bundler,
            Ecosystem::Composer,
        ] {
            let parser = get_parser(ecosystem).unwrap();
            assert_eq!(parser.ecosystem(), ecosystem);
        }
    }

    #[test]
    fn test_get_parser_unsupported() {
        assert!(get_parser(Ecosystem::Docker).is_none());
        assert!(get_parser(Ecosystem::Maven).is_none());
    }

    #[test]
    fn test_parse_requirement_keeps_operator_spacing() {
        let spec = parse_requirement(
            "~> 1.4",
            &[("~>", VersionSpecKind::Compatible)],
            VersionSpecKind::Exact,
        )
        .unwrap();
        assert_eq!(spec.prefix.as_deref(), Some("~> "));
        assert_eq!(spec.version, "1.4");
    }

    #[test]
    fn test_parse_requirement_rejects_unknown_operator() {
        assert!(parse_requirement("~> 1.4", &[], VersionSpecKind::Exact).is_none());
    }

    #[test]
    fn test_parse_requirement_not_a_version() {
        assert!(parse_requirement("latest", &[], VersionSpecKind::Exact).is_none());
        assert!(parse_requirement("", &[], VersionSpecKind::Exact).is_none());
    }
}
