//! Gemfile parser for Ruby projects
//!
//! Handles:
//! - gem declarations with zero, one or several requirements
//! - development/test groups, both as blocks and as `group:` options
//! - pessimistic version constraints (`~>`)
//!
//! Gems sourced from git, GitHub or a local path carry no registry version and
//! are skipped.

use crate::domain::{Dependency, Ecosystem, VersionSpec, VersionSpecKind};
use crate::error::ManifestError;
use crate::manifest::{build_pattern, replace_with_patterns, ManifestParser};
use crate::parser::{RubyVersionParser, VersionParser};
use regex::Regex;
use std::sync::LazyLock;

const FILE_NAME: &str = "Gemfile";

/// Parser for Gemfile files
pub struct GemfileParser;

// gem "name", "req", "req", option: value
static GEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^gem\s*\(?\s*["']([^"']+)["']((?:\s*,\s*["'][^"']*["'])*)(.*)$"#).unwrap()
});

static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["']([^"']*)["']"#).unwrap());

static BLOCK_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\bdo(?:\s*\|[^|]*\|)?\s*$)|^(?:if|unless|case|begin)\b").unwrap());

impl ManifestParser for GemfileParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let mut dependencies = Vec::new();
        // One entry per open block: whether it is a development/test group
        let mut blocks: Vec<bool> = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let trimmed = line.split('#').next().unwrap_or("").trim();

            if trimmed.is_empty() {
                continue;
            }

            if trimmed == "end" {
                if blocks.pop().is_none() {
                    return Err(ManifestError::syntax_error(
                        FILE_NAME,
                        format!("unexpected 'end' on line {}", index + 1),
                    ));
                }
                continue;
            }

            if BLOCK_START_RE.is_match(trimmed) {
                let dev_group = trimmed.starts_with("group") && is_dev_group(trimmed);
                blocks.push(dev_group);
                continue;
            }

            let Some(caps) = GEM_RE.captures(trimmed) else {
                continue;
            };
            let name = &caps[1];
            let options = caps.get(3).map(|m| m.as_str()).unwrap_or("");

            if ["git:", "github:", "path:", ":git", ":github", ":path"]
                .iter()
                .any(|o| options.contains(o))
            {
                continue;
            }

            let requirements: Vec<&str> = QUOTED_RE
                .captures_iter(caps.get(2).map(|m| m.as_str()).unwrap_or(""))
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();

            let Some(spec) = requirement_spec(&requirements) else {
                continue;
            };

            let is_dev = blocks.iter().any(|dev| *dev)
                || (options.contains("group") && is_dev_group(options));

            let dep = Dependency::declared(name, spec, Ecosystem::Bundler, FILE_NAME);
            dependencies.push(if is_dev { dep.dev() } else { dep });
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Bundler
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
        let pattern = format!(
            r#"(?m)(^\s*gem\s*\(?\s*["']{}["']\s*,\s*["']){}(["'])"#,
            regex::escape(package),
            regex::escape(old)
        );
        let re = build_pattern(FILE_NAME, package, &pattern)?;

        replace_with_patterns(content, &[re], new)
            .ok_or_else(|| ManifestError::dependency_not_found(FILE_NAME, package))
    }
}

fn is_dev_group(text: &str) -> bool {
    text.contains(":development") || text.contains(":test")
}

/// Builds the requirement from the quoted strings following the gem name
///
/// Several requirements (`"> 1.0", "< 3"`) combine into one range.
fn requirement_spec(requirements: &[&str]) -> Option<VersionSpec> {
    match requirements {
        [] => Some(VersionSpec::any()),
        [single] => RubyVersionParser.parse(single),
        several => {
            let raw = several.join(", ");
            let first = RubyVersionParser.parse(several[0])?;
            Some(VersionSpec::new(VersionSpecKind::Range, raw, first.version))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEMFILE: &str = r#"source "https://rubygems.org"

ruby "3.3.0"

gem "rails", "~> 7.1.0"
gem 'pg', '>= 0.18', '< 2.0'
gem "puma"
gem "internal", git: "https://github.com/acme/internal"

group :development, :test do
  gem "rspec-rails", "~> 6.1" # specs
end

gem "bootsnap", require: false
gem "debug", "1.9.1", group: :development
"#;

    fn find<'a>(deps: &'a [Dependency], name: &str) -> &'a Dependency {
        deps.iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn test_parse_gems() {
        let deps = GemfileParser.parse(GEMFILE).unwrap();
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["rails", "pg", "puma", "rspec-rails", "bootsnap", "debug"]
        );
    }

    #[test]
    fn test_parse_requirement_kinds() {
        let deps = GemfileParser.parse(GEMFILE).unwrap();

        let rails = find(&deps, "rails").requirement.clone().unwrap();
        assert_eq!(rails.kind, VersionSpecKind::Compatible);
        assert_eq!(rails.raw, "~> 7.1.0");

        let pg = find(&deps, "pg").requirement.clone().unwrap();
        assert_eq!(pg.kind, VersionSpecKind::Range);
        assert_eq!(pg.raw, ">= 0.18, < 2.0");
        assert!(pg.admits("1.5.4"));

        let puma = find(&deps, "puma").requirement.clone().unwrap();
        assert_eq!(puma.kind, VersionSpecKind::Any);
    }

    #[test]
    fn test_parse_groups() {
        let deps = GemfileParser.parse(GEMFILE).unwrap();
        assert!(find(&deps, "rspec-rails").is_dev);
        assert!(find(&deps, "debug").is_dev);
        assert!(!find(&deps, "bootsnap").is_dev);
        assert!(!find(&deps, "rails").is_dev);
    }

    #[test]
    fn test_parse_unbalanced_end() {
        let result = GemfileParser.parse("gem 'rails'\nend\n");
        assert!(matches!(result, Err(ManifestError::SyntaxError { .. })));
    }

    #[test]
    fn test_update_requirement() {
        let result = GemfileParser
            .update_requirement(GEMFILE, "rails", "~> 7.1.0", "~> 8.0.1")
            .unwrap();
        assert!(result.contains(r#"gem "rails", "~> 8.0.1""#));
    }

    #[test]
    fn test_update_requirement_single_quotes() {
        let result = GemfileParser
            .update_requirement(GEMFILE, "debug", "1.9.1", "1.10.0")
            .unwrap();
        assert!(result.contains(r#"gem "debug", "1.10.0", group: :development"#));
    }

    #[test]
    fn test_update_requirement_not_found() {
        assert!(GemfileParser
            .update_requirement(GEMFILE, "sidekiq", "~> 7.0", "~> 8.0")
            .is_err());
    }
}
