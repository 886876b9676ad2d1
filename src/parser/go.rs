//! Go module version parser
//!
//! Go requirements are always exact module versions (`v1.2.3`). A trailing
//! `// pinned` comment marks a version that must not be rewritten.

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::VersionParser;
use regex::Regex;
use std::sync::LazyLock;

/// Parser for go.mod versions
pub struct GoVersionParser;

static GO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+incompatible)?)(\s*//\s*pinned.*)?$")
        .unwrap()
});

impl VersionParser for GoVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        let trimmed = version_str.trim();
        let caps = GO_VERSION_RE.captures(trimmed)?;
        let version = caps.get(1)?.as_str();

        let spec = VersionSpec::new(VersionSpecKind::Exact, trimmed, version).with_prefix("v");
        Some(match caps.get(2) {
            Some(pinned) => VersionSpec {
                kind: VersionSpecKind::GoPinned,
                ..spec.with_suffix(pinned.as_str())
            },
            None => spec,
        })
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_version() {
        let spec = GoVersionParser.parse("v1.9.0").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::Exact);
        assert_eq!(spec.version, "1.9.0");
        assert_eq!(spec.format_updated("1.10.0"), "v1.10.0");
    }

    #[test]
    fn test_parse_pinned() {
        let spec = GoVersionParser.parse("v1.2.3 // pinned").unwrap();
        assert_eq!(spec.kind, VersionSpecKind::GoPinned);
        assert!(!spec.is_rewritable());
        assert_eq!(spec.format_updated("1.3.0"), "v1.3.0 // pinned");
    }

    #[test]
    fn test_parse_pseudo_version() {
        let spec = GoVersionParser.parse("v0.0.0-20240101120000-abcdef123456").unwrap();
        assert_eq!(spec.version, "0.0.0-20240101120000-abcdef123456");
    }

    #[test]
    fn test_parse_incompatible() {
        let spec = GoVersionParser.parse("v2.0.0+incompatible").unwrap();
        assert_eq!(spec.version, "2.0.0+incompatible");
    }

    #[test]
    fn test_parse_rejects_missing_prefix() {
        assert!(GoVersionParser.parse("1.2.3").is_none());
    }
}
