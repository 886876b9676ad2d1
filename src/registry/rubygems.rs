//! RubyGems API adapter
//!
//! Fetches gem version information from rubygems.org.
//! API endpoint: https://rubygems.org/api/v1/versions/{gem}.json
//!
//! Platform-specific builds of the same version are reported once.

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::{by_version, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// RubyGems API base URL
const RUBYGEMS_API_URL: &str = "https://rubygems.org/api/v1/versions";

/// RubyGems adapter
pub struct RubyGemsAdapter {
    client: HttpClient,
}

#[derive(Debug, Deserialize)]
struct GemVersion {
    number: String,
    created_at: Option<String>,
}

impl RubyGemsAdapter {
    /// Create a new RubyGems adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn build_url(&self, gem: &str) -> String {
        format!("{}/{}.json", RUBYGEMS_API_URL, gem)
    }
}

fn versions_from_response(response: Vec<GemVersion>) -> Vec<VersionInfo> {
    let mut versions: Vec<VersionInfo> = Vec::new();

    for gem in response {
        if versions.iter().any(|v| v.version == gem.number) {
            continue;
        }
        let released_at = gem
            .created_at
            .as_deref()
            .and_then(|t| t.parse::<DateTime<Utc>>().ok());
        versions.push(match released_at {
            Some(released_at) => VersionInfo::new(gem.number, released_at),
            None => VersionInfo::undated(gem.number),
        });
    }

    versions.sort_by(by_version);
    versions
}

#[async_trait]
impl RegistryAdapter for RubyGemsAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Bundler
    }

    async fn fetch_versions(
        &self,
        gem: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        let url = self.build_url(gem);
        let response: Vec<GemVersion> = self
            .client
            .get_json(&url, credentials)
            .await
            .map_err(|e| RegistryError::from_http(gem, self.registry_name(), e))?;

        Ok(versions_from_response(response))
    }
}
