//! Packagist metadata adapter
//!
//! Fetches package version information from Packagist.
//! API endpoint: https://repo.packagist.org/p2/{vendor}/{package}.json
//!
//! The p2 metadata is minified: each version lists only the fields that
//! differ from the previous one, and `"__unset"` removes an inherited field.

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::manifest::ComposerJsonParser;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::{by_version, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Packagist metadata base URL
const PACKAGIST_URL: &str = "https://repo.packagist.org/p2";

const UNSET: &str = "__unset";

/// Packagist adapter
pub struct PackagistAdapter {
    client: HttpClient,
}

impl PackagistAdapter {
    /// Create a new Packagist adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn build_url(&self, package: &str) -> String {
        format!("{}/{}.json", PACKAGIST_URL, package.to_lowercase())
    }
}

/// Expands minified version entries into complete ones
fn expand_minified(entries: &[Value]) -> Vec<Map<String, Value>> {
    let mut current = Map::new();
    let mut expanded = Vec::with_capacity(entries.len());

    for entry in entries.iter().filter_map(|e| e.as_object()) {
        for (key, value) in entry {
            if value.as_str() == Some(UNSET) {
                current.remove(key);
            } else {
                current.insert(key.clone(), value.clone());
            }
        }
        expanded.push(current.clone());
    }

    expanded
}

fn versions_from_response(package: &str, response: &Value) -> Vec<VersionInfo> {
    let entries = response
        .get("packages")
        .and_then(|p| p.get(package))
        .and_then(|p| p.as_array())
        .map(|entries| expand_minified(entries))
        .unwrap_or_default();

    let mut versions: Vec<VersionInfo> = entries
        .iter()
        .filter_map(|entry| {
            let version = entry.get("version")?.as_str()?;
            // Branch aliases are not releases
            if version.starts_with("dev-") || version.ends_with("-dev") {
                return None;
            }
            let version = version.trim_start_matches('v');

            let requirements: BTreeMap<String, String> = entry
                .get("require")
                .and_then(|r| r.as_object())
                .into_iter()
                .flatten()
                .filter(|(name, _)| ComposerJsonParser::is_package_name(name))
                .filter_map(|(name, req)| Some((name.clone(), req.as_str()?.to_string())))
                .collect();

            let released_at = entry
                .get("time")
                .and_then(|t| t.as_str())
                .and_then(|t| t.parse::<DateTime<Utc>>().ok());

            let info = match released_at {
                Some(released_at) => VersionInfo::new(version, released_at),
                None => VersionInfo::undated(version),
            };
            Some(info.with_requirements(requirements))
        })
        .collect();

    versions.sort_by(by_version);
    versions
}

#[async_trait]
impl RegistryAdapter for PackagistAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }

    async fn fetch_versions(
        &self,
        package: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(package);
        let response: Value = self
            .client
            .get_json(&url, credentials)
            .await
            .map_err(|e| RegistryError::from_http(package, self.registry_name(), e))?;

        let versions = versions_from_response(&package.to_lowercase(), &response);
        if versions.is_empty() && response.get("packages").is_none() {
            return Err(RegistryError::invalid_response(
                package,
                self.registry_name(),
                "missing packages key",
            ));
        }
        Ok(versions)
    }
}
