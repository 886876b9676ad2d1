//! npm Registry adapter
//!
//! Fetches package version information from the npm registry.
//! API endpoint: https://registry.npmjs.org/{package}
//!
//! The packument lists every version's dependencies, so releases carry the
//! requirements they place on other packages.

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::{by_version, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// npm registry base URL
const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry adapter
pub struct NpmAdapter {
    client: HttpClient,
}

/// npm package metadata response
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    /// Version time information
    #[serde(default)]
    time: HashMap<String, String>,
    /// Available versions
    #[serde(default)]
    versions: HashMap<String, NpmVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NpmVersion {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, String>,
}

impl NpmAdapter {
    /// Create a new npm adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build the URL for a package; the scope separator is escaped
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}", NPM_REGISTRY_URL, package.replace('/', "%2F"))
    }
}

fn versions_from_response(response: NpmPackageResponse) -> Vec<VersionInfo> {
    let mut versions: Vec<VersionInfo> = response
        .versions
        .into_iter()
        .map(|(version, meta)| {
            let mut requirements = meta.optional_dependencies;
            requirements.extend(meta.peer_dependencies);
            requirements.extend(meta.dependencies);

            let info = match response
                .time
                .get(&version)
                .and_then(|t| t.parse::<DateTime<Utc>>().ok())
            {
                Some(released_at) => VersionInfo::new(&version, released_at),
                None => VersionInfo::undated(&version),
            };
            info.with_requirements(requirements)
        })
        .collect();

    versions.sort_by(by_version);
    versions
}

#[async_trait]
impl RegistryAdapter for NpmAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::NpmAndYarn
    }

    async fn fetch_versions(
        &self,
        package: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(package);
        let response: NpmPackageResponse = self
            .client
            .get_json(&url, credentials)
            .await
            .map_err(|e| RegistryError::from_http(package, self.registry_name(), e))?;

        Ok(versions_from_response(response))
    }
}
