//! PHP (composer) version requirement parser
//!
//! Composer's `~1.2` is the pessimistic operator (`>=1.2 <2.0`), not npm's
//! tilde. A bare version is exact; `v` prefixes are kept when rewriting.
//! Branch requirements (`dev-main`) and stability flags are not versions.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{parse_requirement, VersionParser};

/// Parser for Composer version requirements
pub struct PhpVersionParser;

const OPERATORS: &[(&str, VersionSpecKind)] = &[
    ("^", VersionSpecKind::Caret),
    ("~", VersionSpecKind::Compatible),
    ("==", VersionSpecKind::Exact),
    ("=", VersionSpecKind::Exact),
    (">=", VersionSpecKind::GreaterOrEqual),
    (">", VersionSpecKind::Greater),
    ("<=", VersionSpecKind::LessOrEqual),
    ("<", VersionSpecKind::Less),
];

impl VersionParser for PhpVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();
        if trimmed.starts_with("dev-") || trimmed.contains('@') {
            return None;
        }
        parse_requirement(trimmed, OPERATORS, VersionSpecKind::Exact)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Option<VersionSpec> {
        PhpVersionParser.parse(s)
    }

    #[test]
    fn test_parse_caret() {
        let spec = parse("^7.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert!(spec.admits("7.4.1"));
    }

    #[test]
    fn test_parse_tilde_is_pessimistic() {
        let spec = parse("~1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Compatible);
        assert!(spec.admits("1.9.0"));
        assert!(!spec.admits("2.0.0"));
    }

    #[test]
    fn test_parse_v_prefix() {
        let spec = parse("v2.1.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "2.1.0");
        assert_eq!(spec.format_updated("2.2.0"), "v2.2.0");
    }

    #[test]
    fn test_parse_or_range() {
        let spec = parse("^1.0 || ^2.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Range);
    }

    #[test]
    fn test_parse_wildcard() {
        assert_eq!(parse("1.2.*").unwrap().kind, VersionSpecKind::Wildcard);
    }

    #[test]
    fn test_parse_branches() {
        assert!(parse("dev-main").is_none());
        assert!(parse("1.0.x-dev@dev").is_none());
    }
}
