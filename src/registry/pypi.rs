//! PyPI JSON API adapter
//!
//! Fetches package version information from PyPI.
//! API endpoint: https://pypi.org/pypi/{package}/json

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::{by_version, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI API base URL
const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    /// Release files keyed by version
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    upload_time_iso_8601: Option<String>,
    #[serde(default)]
    yanked: bool,
}

impl PyPIAdapter {
    /// Create a new PyPI adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", PYPI_API_URL, package)
    }
}

/// A release is dated by its earliest file and yanked when every file is
fn versions_from_response(response: PyPIResponse) -> Vec<VersionInfo> {
    let mut versions: Vec<VersionInfo> = response
        .releases
        .into_iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(version, files)| {
            let earliest = files
                .iter()
                .filter_map(|f| f.upload_time_iso_8601.as_deref())
                .filter_map(|t| t.parse::<DateTime<Utc>>().ok())
                .min();

            let info = match earliest {
                Some(released_at) => VersionInfo::new(&version, released_at),
                None => VersionInfo::undated(&version),
            };
            if files.iter().all(|f| f.yanked) {
                info.yanked()
            } else {
                info
            }
        })
        .collect();

    versions.sort_by(by_version);
    versions
}

#[async_trait]
impl RegistryAdapter for PyPIAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pip
    }

    async fn fetch_versions(
        &self,
        package: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(package);
        let response: PyPIResponse = self
            .client
            .get_json(&url, credentials)
            .await
            .map_err(|e| RegistryError::from_http(package, self.registry_name(), e))?;

        Ok(versions_from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_build_url() {
        let adapter = PyPIAdapter::new(HttpClient::new().unwrap());
        assert_eq!(
            adapter.build_url("flask-restful"),
            "https://pypi.org/pypi/flask-restful/json"
        );
    }

    #[test]
    fn test_versions_from_response() {
        let response: PyPIResponse = serde_json::from_str(
            r#"{
  "info": { "name": "requests" },
  "releases": {
    "2.31.0": [
      { "upload_time_iso_8601": "2023-05-22T15:12:44.175Z", "yanked": false },
      { "upload_time_iso_8601": "2023-05-22T15:10:00.000Z", "yanked": false }
    ],
    "2.32.0": [
      { "upload_time_iso_8601": "2024-05-20T00:00:00.000Z", "yanked": true }
    ],
    "3.0.0": []
  }
}"#,
        )
        .unwrap();

        let versions = versions_from_response(response);
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version, "2.31.0");
        assert_eq!(
            versions[0].released_at,
            Some(Utc.with_ymd_and_hms(2023, 5, 22, 15, 10, 0).unwrap())
        );
        assert!(versions[1].yanked);
    }
}
