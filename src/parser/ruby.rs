//! Ruby version requirement parser
//!
//! Handles:
//! - Fixed versions: `= 1.2.3`, `1.2.3`
//! - Pessimistic constraints: `~> 1.2`, `~> 1.2.3`
//! - Comparison operators: `>=`, `<`, `>`, `<=`
//! - Compound constraints: `>= 1.0, < 2.0`, `!= 1.5`

use crate::domain::{Ecosystem, VersionSpec, VersionSpecKind};
use crate::parser::{parse_requirement, VersionParser};

/// Parser for Ruby version requirements
pub struct RubyVersionParser;

const OPERATORS: &[(&str, VersionSpecKind)] = &[
    ("~>", VersionSpecKind::Compatible),
    ("=", VersionSpecKind::Exact),
    (">=", VersionSpecKind::GreaterOrEqual),
    (">", VersionSpecKind::Greater),
    ("<=", VersionSpecKind::LessOrEqual),
    ("<", VersionSpecKind::Less),
];

impl VersionParser for RubyVersionParser {
    fn parse(&self, version_str: &str) -> Option<VersionSpec> {
        parse_requirement(version_str, OPERATORS, VersionSpecKind::Exact)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Bundler
    }
}
