//! Rust (cargo) version requirement parser
//!
//! A bare version in Cargo.toml is a caret requirement: `1.2` means `^1.2`.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{parse_requirement, VersionParser};

/// Parser for Cargo version requirements
pub struct RustVersionParser;

const OPERATORS: &[(&str, VersionSpecKind)] = &[
    ("^", VersionSpecKind::Caret),
    ("~", VersionSpecKind::Tilde),
    ("=", VersionSpecKind::Exact),
    (">=", VersionSpecKind::GreaterOrEqual),
    (">", VersionSpecKind::Greater),
    ("<=", VersionSpecKind::LessOrEqual),
    ("<", VersionSpecKind::Less),
];

impl VersionParser for RustVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        parse_requirement(version_str, OPERATORS, VersionSpecKind::Caret)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_version_is_caret() {
        let spec = RustVersionParser.parse("1.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert_eq!(spec.prefix, None);
        assert!(spec.admits("1.9.0"));
        assert!(!spec.admits("2.0.0"));
        assert_eq!(spec.format_updated("2.0.1"), "2.0.1");
    }

    #[test]
    fn test_parse_exact() {
        let spec = RustVersionParser.parse("=1.2.3").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.prefix.as_deref(), Some("="));
    }

    #[test]
    fn test_parse_tilde() {
        let spec = RustVersionParser.parse("~1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Tilde);
        assert!(spec.admits("1.2.9"));
        assert!(!spec.admits("1.3.0"));
    }

    #[test]
    fn test_parse_compound() {
        let spec = RustVersionParser.parse(">=0.4, <0.6").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
        assert!(spec.admits("0.5.2"));
    }

    #[test]
    fn test_parse_wildcard() {
        let spec = RustVersionParser.parse("0.3.*").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Wildcard);
    }
}
