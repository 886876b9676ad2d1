//! crates.io API adapter
//!
//! Fetches crate version information from crates.io.
//! API endpoint: https://crates.io/api/v1/crates/{crate}
//!
//! Note: crates.io requires a User-Agent header (handled by HttpClient)
//! and has rate limiting (1 request/second).

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::{by_version, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// crates.io API base URL
const CRATES_IO_API_URL: &str = "https://crates.io/api/v1/crates";

/// Rate limit: 1 request per second
const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

/// crates.io adapter with rate limiting
pub struct CratesIoAdapter {
    client: HttpClient,
    last_request: Mutex<Option<Instant>>,
}

/// crates.io crate response
#[derive(Debug, Deserialize)]
struct CratesIoResponse {
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    created_at: String,
    yanked: bool,
}

impl CratesIoAdapter {
    /// Create a new crates.io adapter
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            last_request: Mutex::new(None),
        }
    }

    /// Build the URL for a crate
    fn build_url(&self, crate_name: &str) -> String {
        format!("{}/{}", CRATES_IO_API_URL, crate_name)
    }

    /// Wait until a second has passed since the previous request
    async fn apply_rate_limit(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(elapsed) = last_request.map(|t| t.elapsed()) {
            if elapsed < RATE_LIMIT_INTERVAL {
                tokio::time::sleep(RATE_LIMIT_INTERVAL - elapsed).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

fn versions_from_response(response: CratesIoResponse) -> Vec<VersionInfo> {
    let mut versions: Vec<VersionInfo> = response
        .versions
        .into_iter()
        .map(|v| {
            let info = match v.created_at.parse::<DateTime<Utc>>() {
                Ok(released_at) => VersionInfo::new(&v.num, released_at),
                Err(_) => VersionInfo::undated(&v.num),
            };
            if v.yanked {
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
impl RegistryAdapter for CratesIoAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    async fn fetch_versions(
        &self,
        crate_name: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        self.apply_rate_limit().await;

        let url = self.build_url(crate_name);
        let response: CratesIoResponse = self
            .client
            .get_json(&url, credentials)
            .await
            .map_err(|e| RegistryError::from_http(crate_name, self.registry_name(), e))?;

        Ok(versions_from_response(response))
    }
}
