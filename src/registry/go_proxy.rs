//! Go Module Proxy adapter
//!
//! Fetches module version information from the Go Module Proxy.
//! API endpoints:
//! - List versions: https://proxy.golang.org/{module}/@v/list
//! - Version info: https://proxy.golang.org/{module}/@v/{version}.info
//!
//! Versions are reported without the leading `v`, matching how go.mod
//! requirements are parsed.

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::{by_version, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Go Module Proxy base URL
const GO_PROXY_URL: &str = "https://proxy.golang.org";

/// Go Module Proxy adapter
pub struct GoProxyAdapter {
    client: HttpClient,
}

/// Version info response
#[derive(Debug, Deserialize)]
struct VersionInfoResponse {
    #[serde(rename = "Time")]
    time: String,
}

impl GoProxyAdapter {
    /// Create a new Go Proxy adapter
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Build the URL for listing versions
    fn build_list_url(&self, module: &str) -> String {
        format!("{}/@v/list", Self::encode_module_path(module))
    }

    /// Build the URL for version info
    fn build_info_url(&self, module: &str, version: &str) -> String {
        format!("{}/@v/{}.info", Self::encode_module_path(module), version)
    }

    /// Encode module path for the Go Proxy URL
    ///
    /// Uppercase letters become `!` followed by the lowercase letter.
    fn encode_module_path(module: &str) -> String {
        let mut encoded = String::with_capacity(module.len() + GO_PROXY_URL.len() + 1);
        encoded.push_str(GO_PROXY_URL);
        encoded.push('/');

        for ch in module.chars() {
            if ch.is_uppercase() {
                encoded.push('!');
                encoded.extend(ch.to_lowercase());
            } else {
                encoded.push(ch);
            }
        }

        encoded
    }
}

/// Tags listed by the proxy, one per line
fn parse_version_list(list: &str) -> Vec<&str> {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[async_trait]
impl RegistryAdapter for GoProxyAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    async fn fetch_versions(
        &self,
        module: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError> {
        let list_url = self.build_list_url(module);
        let version_list = self
            .client
            .get(&list_url, credentials)
            .await
            .map_err(|e| RegistryError::from_http(module, self.registry_name(), e))?;

        let mut versions = Vec::new();

        for tag in parse_version_list(&version_list) {
            let version = tag.trim_start_matches('v');
            let info_url = self.build_info_url(module, tag);

            // A missing .info only loses the release date
            let released_at = match self
                .client
                .get_json::<VersionInfoResponse>(&info_url, credentials)
                .await
            {
                Ok(info) => info.time.parse::<DateTime<Utc>>().ok(),
                Err(e) => {
                    tracing::debug!(module, tag, error = %e, "no version info");
                    None
                }
            };

            versions.push(match released_at {
                Some(released_at) => VersionInfo::new(version, released_at),
                None => VersionInfo::undated(version),
            });
        }

        versions.sort_by(by_version);
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_module_path_simple() {
        assert_eq!(
            GoProxyAdapter::encode_module_path("github.com/gin-gonic/gin"),
            "https://proxy.golang.org/github.com/gin-gonic/gin"
        );
    }

    #[test]
    fn test_encode_module_path_with_uppercase() {
        assert_eq!(
            GoProxyAdapter::encode_module_path("github.com/Azure/azure-sdk-for-go"),
            "https://proxy.golang.org/github.com/!azure/azure-sdk-for-go"
        );
    }

    #[test]
    fn test_build_urls() {
        let adapter = GoProxyAdapter::new(HttpClient::new().unwrap());
        assert_eq!(
            adapter.build_list_url("github.com/gin-gonic/gin"),
            "https://proxy.golang.org/github.com/gin-gonic/gin/@v/list"
        );
        assert_eq!(
            adapter.build_info_url("github.com/gin-gonic/gin", "v1.9.0"),
            "https://proxy.golang.org/github.com/gin-gonic/gin/@v/v1.9.0.info"
        );
    }

    #[test]
    fn test_parse_version_list() {
        assert_eq!(
            parse_version_list("v1.9.0\nv1.8.2\n\nv2.0.0+incompatible\n"),
            vec!["v1.9.0", "v1.8.2", "v2.0.0+incompatible"]
        );
    }
}
