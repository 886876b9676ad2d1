//! Error types for depbot
//!
//! This module defines all error types used throughout the application:
//! - HttpError: transport failures shared by registries and GitHub
//! - RegistryError: issues with package registry communication
//! - ManifestError: issues parsing or editing manifest files
//! - SourceError: issues fetching dependency files
//! - ResolutionError: the update decision could not be computed
//! - RewriteError: updated manifests or lockfiles could not be produced
//! - SubmissionError: the change could not be submitted
//! - ConfigError: invalid command-line configuration (fatal)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Ecosystem;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Transport-level HTTP failures
#[derive(Error, Debug)]
pub enum HttpError {
    /// 404 Not Found
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Non-success status other than 404 and 429
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// 429 Too Many Requests after every retry
    #[error("rate limit exceeded for {url}")]
    RateLimited { url: String },

    #[error("timeout while requesting {url}")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Body could not be decoded
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// The client itself could not be built
    #[error("failed to create HTTP client: {message}")]
    Client { message: String },
}

impl HttpError {
    /// Returns the HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::NotFound { .. } => Some(404),
            HttpError::Status { status, .. } => Some(*status),
            HttpError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Required manifest file missing from the fetched files
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// JSON parsing error (package.json, composer.json, lockfiles)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// TOML parsing error (pyproject.toml, Cargo.toml, Cargo.lock)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// Line-oriented format error (go.mod, Gemfile, Gemfile.lock)
    #[error("failed to parse {path}: {message}")]
    SyntaxError { path: PathBuf, message: String },

    /// Invalid version specification
    #[error("invalid version specification '{spec}' in {path}: {message}")]
    InvalidVersionSpec {
        path: PathBuf,
        spec: String,
        message: String,
    },

    /// Dependency is not declared where an edit was requested
    #[error("dependency '{package}' not found in {path}")]
    DependencyNotFound { path: PathBuf, package: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Request failed
    #[error("failed to fetch package '{package}' from {registry}: {source}")]
    Http {
        package: String,
        registry: String,
        #[source]
        source: HttpError,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },
}

/// Errors raised while fetching dependency files
#[derive(Error, Debug)]
pub enum SourceError {
    /// The ecosystem's manifest does not exist in the directory
    #[error("{file} not found in {repository}{directory}")]
    ManifestNotFound {
        repository: String,
        directory: String,
        file: String,
    },

    /// The branch could not be resolved to a commit
    #[error("branch '{branch}' not found in {repository}")]
    BranchNotFound { repository: String, branch: String },

    #[error("failed to fetch from {repository}: {source}")]
    Http {
        repository: String,
        #[source]
        source: HttpError,
    },

    /// A provider SDK call failed
    #[error("failed to fetch from {repository}: {message}")]
    Api { repository: String, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The update decision could not be computed for a dependency
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A version string could not be interpreted
    #[error("invalid version '{version}' for '{package}'")]
    InvalidVersion { package: String, version: String },

    /// The checker could not produce a target for an unlock scope it accepted
    #[error("no update target for '{package}' at unlock scope {scope}")]
    NoTarget { package: String, scope: String },
}

/// Updated files could not be produced
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The package-manager command regenerating a lockfile failed
    #[error("{ecosystem} lockfile regeneration failed running `{command}`: {message}")]
    Lockfile {
        ecosystem: Ecosystem,
        command: String,
        message: String,
    },

    /// Rewriting produced no change
    #[error("no files changed while updating {dependencies}")]
    NothingChanged { dependencies: String },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The change could not be submitted
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("{action} failed: {source}")]
    Http {
        action: String,
        #[source]
        source: HttpError,
    },

    /// The provider answered but refused the change
    #[error("{action} rejected: {message}")]
    Rejected { action: String, message: String },

    /// A provider SDK call failed
    #[error("{action} failed: {message}")]
    Api { action: String, message: String },

    #[error("no access token for {host}; set GITHUB_ACCESS_TOKEN")]
    MissingToken { host: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more requested package managers are not known
    #[error("invalid package manager(s): {}; supported: {supported}", .invalid.join(", "))]
    InvalidEcosystems {
        invalid: Vec<String>,
        supported: String,
    },

    /// Nothing to do
    #[error("no package managers selected")]
    NoEcosystems,

    /// Invalid duration format
    #[error("invalid duration format '{value}': expected format like '2w', '10d', '1m'")]
    InvalidDuration { value: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },

    /// A token is required to read from or write to the host
    #[error("GITHUB_ACCESS_TOKEN is required for {host} unless --dry-run is given")]
    MissingToken { host: String },

    /// The codecommit provider has no region to address the repository in
    #[error("AWS_REGION is required for the codecommit provider")]
    MissingRegion,
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new SyntaxError
    pub fn syntax_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::SyntaxError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidVersionSpec error
    pub fn invalid_version_spec(
        path: impl Into<PathBuf>,
        spec: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidVersionSpec {
            path: path.into(),
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Creates a new DependencyNotFound error
    pub fn dependency_not_found(path: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        ManifestError::DependencyNotFound {
            path: path.into(),
            package: package.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Wraps a transport error, turning 404 into PackageNotFound
    pub fn from_http(package: impl Into<String>, registry: impl Into<String>, source: HttpError) -> Self {
        let package = package.into();
        let registry = registry.into();
        match source {
            HttpError::NotFound { .. } => RegistryError::PackageNotFound { package, registry },
            source => RegistryError::Http {
                package,
                registry,
                source,
            },
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Returns the registry name for this ecosystem
    pub fn registry_name(ecosystem: Ecosystem) -> &'static str {
        match ecosystem {
            Ecosystem::NpmAndYarn => "npm",
            Ecosystem::Pip => "PyPI",
            Ecosystem::Cargo => "crates.io",
            Ecosystem::GoModules => "Go Proxy",
            Ecosystem::Bundler => "RubyGems",
            Ecosystem::Composer => "Packagist",
            _ => "unsupported",
        }
    }
}

impl SubmissionError {
    pub fn http(action: impl Into<String>, source: HttpError) -> Self {
        SubmissionError::Http {
            action: action.into(),
            source,
        }
    }
}
