//! Python version requirement parser
//!
//! Handles PEP 440 specifiers (`==1.2.3`, `~=1.4`, `>=1.2`, `>=1.0,<2.0`,
//! `!=1.5`) and Poetry's `^`/`~` shorthands. A bare version is exact.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{parse_requirement, VersionParser};

/// Parser for Python version requirements
pub struct PythonVersionParser;

const OPERATORS: &[(&str, VersionSpecKind)] = &[
    ("==", VersionSpecKind::Exact),
    ("===", VersionSpecKind::Exact),
    ("~=", VersionSpecKind::Compatible),
    (">=", VersionSpecKind::GreaterOrEqual),
    (">", VersionSpecKind::Greater),
    ("<=", VersionSpecKind::LessOrEqual),
    ("<", VersionSpecKind::Less),
    ("^", VersionSpecKind::Caret),
    ("~", VersionSpecKind::Tilde),
];

impl VersionParser for PythonVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        // Environment markers (`; python_version < "3.8"`) are not part of the version
        let without_marker = version_str.split(';').next().unwrap_or("");
        parse_requirement(without_marker, OPERATORS, VersionSpecKind::Exact)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Option<VersionSpec> {
        PythonVersionParser.parse(s)
    }

    #[test]
    fn test_parse_pinned() {
        let spec = parse("==2.31.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.format_updated("2.32.0"), "==2.32.0");
    }

    #[test]
    fn test_parse_compatible_release() {
        let spec = parse("~=1.4").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Compatible);
        assert!(spec.admits("1.9"));
        assert!(!spec.admits("2.0"));
        assert_eq!(spec.format_updated("2.1.0"), "~=2.1");
    }

    #[test]
    fn test_parse_minimum() {
        let spec = parse(">=1.2").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::GreaterOrEqual);
    }

    #[test]
    fn test_parse_compound_and_exclusion() {
        assert_eq!(parse(">=1.0,<2.0").unwrap().kind, VersionSpecKind::Range);
        assert_eq!(parse("!=1.5").unwrap().kind, VersionSpecKind::Range);
    }

    #[test]
    fn test_parse_poetry_caret() {
        let spec = parse("^0.23").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Caret);
        assert!(spec.admits("0.23.4"));
        assert!(!spec.admits("0.24.0"));
    }

    #[test]
    fn test_parse_prerelease_and_marker() {
        assert_eq!(parse("==2.0rc1").unwrap().version, "2.0rc1");
        let spec = parse(">=1.0 ; python_version < \"3.8\"").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::GreaterOrEqual);
        assert_eq!(spec.version, "1.0");
    }
}
