//! Credentials handed to collaborators

use std::fmt;

/// What a credential is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Access to the source-control host
    GitSource,
    /// Access to a package registry
    Registry,
}

/// A single host credential
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub kind: CredentialKind,
    pub host: String,
    pub username: String,
    password: String,
}

impl Credential {
    /// Creates a source-control credential using the `x-access-token` user
    pub fn git_source(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::GitSource,
            host: host.into(),
            username: "x-access-token".to_string(),
            password: token.into(),
        }
    }

    /// Creates a registry credential
    pub fn registry(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::Registry,
            host: host.into(),
            username: String::new(),
            password: token.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Ordered list of credentials, passed opaquely down to the HTTP layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    entries: Vec<Credential>,
}

impl Credentials {
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.entries.iter()
    }

    /// Returns the token of the first credential whose host matches
    ///
    /// `github.com` credentials also cover `api.github.com`, which is where the
    /// REST API lives.
    pub fn token_for_host(&self, host: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| c.host == host || format!("api.{}", c.host) == host)
            .map(|c| c.password())
            .filter(|p| !p.is_empty())
    }

    /// Returns the token for the source-control host
    pub fn source_token(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| c.kind == CredentialKind::GitSource)
            .map(|c| c.password())
            .filter(|p| !p.is_empty())
    }
}
