//! Registry adapters for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm Registry adapter
//! - PyPI JSON API adapter
//! - crates.io API adapter
//! - Go Module Proxy adapter
//! - RubyGems API adapter
//! - Packagist metadata adapter

mod client;
mod crates_io;
mod go_proxy;
mod npm;
mod packagist;
mod pypi;
mod rubygems;

pub use client::{HttpClient, RequestOptions};
pub use crates_io::CratesIoAdapter;
pub use go_proxy::GoProxyAdapter;
pub use npm::NpmAdapter;
pub use packagist::PackagistAdapter;
pub use pypi::PyPIAdapter;
pub use rubygems::RubyGemsAdapter;

use crate::domain::{Credentials, Ecosystem};
use crate::error::RegistryError;
use crate::update::VersionInfo;
use async_trait::async_trait;

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the ecosystem this adapter handles
    fn ecosystem(&self) -> Ecosystem;

    /// Get the registry name
    fn registry_name(&self) -> &'static str {
        RegistryError::registry_name(self.ecosystem())
    }

    /// Fetch available versions for a package, sorted ascending
    async fn fetch_versions(
        &self,
        package: &str,
        credentials: &Credentials,
    ) -> Result<Vec<VersionInfo>, RegistryError>;
}

/// Create a registry adapter for the given ecosystem
pub fn create_adapter(ecosystem: Ecosystem, client: HttpClient) -> Option<Box<dyn RegistryAdapter>> {
    match ecosystem {
        Ecosystem::NpmAndYarn => Some(Box::new(NpmAdapter::new(client))),
        Ecosystem::Pip => Some(Box::new(PyPIAdapter::new(client))),
        Ecosystem::Cargo => Some(Box::new(CratesIoAdapter::new(client))),
        Ecosystem::GoModules => Some(Box::new(GoProxyAdapter::new(client))),
        Ecosystem::Bundler => Some(Box::new(RubyGemsAdapter::new(client))),
        Ecosystem::Composer => Some(Box::new(PackagistAdapter::new(client))),
        _ => None,
    }
}
