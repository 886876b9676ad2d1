//! Node.js (npm/yarn) version requirement parser
//!
//! Handles version formats:
//! - Exact: `1.2.3`, `=1.2.3`
//! - Caret: `^1.2.3`
//! - Tilde: `~1.2.3`
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcard: `*`, `1.x`, `1.2.*`
//! - Range: `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`, `^1 || ^2`
//!
//! Git URLs, tarballs, `file:`/`npm:` aliases and dist-tags are not versions.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{parse_requirement, VersionParser};

/// Node.js version requirement parser
pub struct NodeVersionParser;

const OPERATORS: &[(&str, VersionSpecKind)] = &[
    ("^", VersionSpecKind::Caret),
    ("~", VersionSpecKind::Tilde),
    (">=", VersionSpecKind::GreaterOrEqual),
    (">", VersionSpecKind::Greater),
    ("<=", VersionSpecKind::LessOrEqual),
    ("<", VersionSpecKind::Less),
    ("=", VersionSpecKind::Exact),
];

impl VersionParser for NodeVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();
        if trimmed.contains([':', '/', '#']) {
            return None;
        }
        parse_requirement(trimmed, OPERATORS, VersionSpecKind::Exact)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::NpmAndYarn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Option<VersionSpec> {
        NodeVersionParser.parse(s)
    }

    #[test]
    fn test_parse_exact_version() {
        let spec = parse("1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.prefix, None);
    }

    #[test]
    fn test_parse_caret_version() {
        let spec = parse("^1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert_eq!(spec.prefix.as_deref(), Some("^"));
        assert_eq!(spec.format_updated("1.3.0"), "^1.3.0");
    }

    #[test]
    fn test_parse_tilde_version() {
        let spec = parse("~1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Tilde);
    }

    #[test]
    fn test_parse_explicit_exact() {
        let spec = parse("=2.0.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.format_updated("3.0.0"), "=3.0.0");
    }

    #[test]
    fn test_parse_comparisons() {
        assert_eq!(parse(">=1.0.0").unwrap().kind, VersionSpecKind::GreaterOrEqual);
        assert_eq!(parse(">1.0.0").unwrap().kind, VersionSpecKind::Greater);
        assert_eq!(parse("<=1.0.0").unwrap().kind, VersionSpecKind::LessOrEqual);
        assert_eq!(parse("<1.0.0").unwrap().kind, VersionSpecKind::Less);
    }

    #[test]
    fn test_parse_prerelease() {
        let spec = parse("^6.0.0-beta.1").unwrap();
        assert_eq!(spec.version, "6.0.0-beta.1");
    }

    #[test]
    fn test_parse_wildcards() {
        assert_eq!(parse("*").unwrap().kind, VersionSpecKind::Wildcard);
        assert_eq!(parse("1.x").unwrap().kind, VersionSpecKind::Wildcard);
        assert_eq!(parse("1.2.*").unwrap().kind, VersionSpecKind::Wildcard);
    }

    #[test]
    fn test_parse_ranges() {
        let spec = parse(">=1.0.0 <2.0.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert_eq!(spec.version, "1.0.0");
        assert!(spec.admits("1.9.9"));

        assert_eq!(parse("1.0.0 - 2.0.0").unwrap().kind, VersionSpecKind::Range);
        assert_eq!(parse("^1.0.0 || ^2.0.0").unwrap().kind, VersionSpecKind::Range);
    }

    #[test]
    fn test_parse_non_versions() {
        assert!(parse("latest").is_none());
        assert!(parse("github:user/repo").is_none());
        assert!(parse("file:../lib").is_none());
        assert!(parse("git+https://github.com/user/repo.git#v1.0.0").is_none());
        assert!(parse("").is_none());
    }
}
