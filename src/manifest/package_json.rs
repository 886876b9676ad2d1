//! package.json parser for Node.js projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - peerDependencies
//! - optionalDependencies

use crate::domain::{Dependency, Ecosystem};
use crate::error::ManifestError;
use crate::manifest::{update_json_requirement, ManifestParser};
use crate::parser::{NodeVersionParser, VersionParser};
use serde_json::{Map, Value};

const FILE_NAME: &str = "package.json";

/// Parser for package.json files
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(FILE_NAME, e.to_string()))?;

        let mut dependencies = Vec::new();

        for (section, is_dev) in [
            ("dependencies", false),
            ("devDependencies", true),
            ("peerDependencies", false),
            ("optionalDependencies", false),
        ] {
            if let Some(deps) = json.get(section).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, is_dev, &mut dependencies);
            }
        }

        Ok(dependencies)
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::NpmAndYarn
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
        update_json_requirement(FILE_NAME, content, package, old, new)
    }
}

fn parse_dependency_object(deps: &Map<String, Value>, is_dev: bool, output: &mut Vec<Dependency>) {
    for (name, version_value) in deps {
        // The same package listed twice (e.g. dependencies and peerDependencies) is one dependency
        if output.iter().any(|d| &d.name == name) {
            continue;
        }
        let Some(spec) = version_value.as_str().and_then(|v| NodeVersionParser.parse(v)) else {
            continue;
        };
        let dep = Dependency::declared(name.clone(), spec, Ecosystem::NpmAndYarn, FILE_NAME);
        output.push(if is_dev { dep.dev() } else { dep });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    fn parse(content: &str) -> Result<Vec<Dependency>, ManifestError> {
        PackageJsonParser.parse(content)
    }

    fn kind(dep: &Dependency) -> VersionSpecKind {
        dep.requirement.as_ref().unwrap().kind
    }

    #[test]
    fn test_parse_simple_dependencies() {
        let content = r#"{
            "dependencies": {
                "lodash": "^4.17.21",
                "express": "~4.18.2"
            }
        }"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);

        let lodash = deps.iter().find(|d| d.name == "lodash").unwrap();
        assert_eq!(kind(lodash), VersionSpecKind::Caret);
        assert!(lodash.top_level);
        assert!(!lodash.is_dev);
        assert_eq!(lodash.manifest.as_deref(), Some("package.json"));

        let express = deps.iter().find(|d| d.name == "express").unwrap();
        assert_eq!(kind(express), VersionSpecKind::Tilde);
    }

    #[test]
    fn test_parse_mixed_dependencies() {
        let content = r#"{
            "dependencies": {
                "react": "^18.2.0"
            },
            "devDependencies": {
                "typescript": "^5.0.0"
            }
        }"#;

        let deps = parse(content).unwrap();
        let react = deps.iter().find(|d| d.name == "react").unwrap();
        assert!(!react.is_dev);
        let ts = deps.iter().find(|d| d.name == "typescript").unwrap();
        assert!(ts.is_dev);
    }

    #[test]
    fn test_parse_duplicate_sections_once() {
        let content = r#"{
            "dependencies": { "react": "^18.2.0" },
            "peerDependencies": { "react": "^18.0.0" }
        }"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].requirement.as_ref().unwrap().raw, "^18.2.0");
    }

    #[test]
    fn test_parse_skips_non_registry_sources() {
        let content = r#"{
            "dependencies": {
                "local": "file:../local",
                "forked": "github:me/forked",
                "tagged": "latest",
                "real": "1.0.0"
            }
        }"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "real");
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse("not json"),
            Err(ManifestError::JsonParseError { .. })
        ));
    }

    #[test]
    fn test_update_requirement_preserves_key_order() {
        let content = r#"{
  "name": "test-package",
  "version": "1.0.0",
  "dependencies": {
    "zod": "^3.0.0",
    "axios": "^1.0.0",
    "lodash": "^4.17.21"
  }
}"#;

        let result = PackageJsonParser
            .update_requirement(content, "axios", "^1.0.0", "^1.5.0")
            .unwrap();
        assert_eq!(result, content.replace("^1.0.0", "^1.5.0"));
    }

    #[test]
    fn test_update_requirement_scoped_package() {
        let content = r#"{
  "dependencies": {
    "@types/node": "^20.0.0",
    "@scope/package": "^1.0.0"
  }
}"#;

        let result = PackageJsonParser
            .update_requirement(content, "@types/node", "^20.0.0", "^20.10.0")
            .unwrap();
        assert!(result.contains("\"@types/node\": \"^20.10.0\""));
        assert!(result.contains("\"@scope/package\": \"^1.0.0\""));
    }

    #[test]
    fn test_update_requirement_preserves_spacing() {
        let content = r#"{"dependencies": { "lodash" : "4.17.21" }}"#;
        let result = PackageJsonParser
            .update_requirement(content, "lodash", "4.17.21", "4.18.0")
            .unwrap();
        assert!(result.contains("\"lodash\" : \"4.18.0\""));
    }

    #[test]
    fn test_update_requirement_not_found() {
        let content = r#"{"dependencies": {}}"#;
        let result = PackageJsonParser.update_requirement(content, "nonexistent", "1.0.0", "2.0.0");
        assert!(result.is_err());
    }
}
