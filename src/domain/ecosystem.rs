//! Package-manager ecosystems known to depbot

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported package-manager ecosystems
///
/// The identifiers match the ones accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    /// Ruby (Gemfile / Gemfile.lock)
    Bundler,
    /// Python (pyproject.toml)
    Pip,
    /// Node.js (package.json / package-lock.json)
    NpmAndYarn,
    /// Java (pom.xml)
    Maven,
    /// Java/Kotlin (build.gradle)
    Gradle,
    /// Rust (Cargo.toml / Cargo.lock)
    Cargo,
    /// Elixir (mix.exs)
    Hex,
    /// PHP (composer.json / composer.lock)
    Composer,
    /// .NET (*.csproj)
    Nuget,
    /// Go dep (Gopkg.toml)
    Dep,
    /// Go modules (go.mod / go.sum)
    GoModules,
    /// Elm (elm.json)
    Elm,
    /// Git submodules (.gitmodules)
    Submodules,
    /// Docker base images (Dockerfile)
    Docker,
    /// Terraform modules (*.tf)
    Terraform,
    /// GitHub Actions workflows
    GithubActions,
}

/// Error returned when a string is not a known ecosystem identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEcosystem(pub String);

impl fmt::Display for UnknownEcosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown package manager '{}'", self.0)
    }
}

impl std::error::Error for UnknownEcosystem {}

impl Ecosystem {
    /// Returns every known ecosystem in canonical order
    pub fn all() -> &'static [Ecosystem] {
        &[
            Ecosystem::Bundler,
            Ecosystem::Pip,
            Ecosystem::NpmAndYarn,
            Ecosystem::Maven,
            Ecosystem::Gradle,
            Ecosystem::Cargo,
            Ecosystem::Hex,
            Ecosystem::Composer,
            Ecosystem::Nuget,
            Ecosystem::Dep,
            Ecosystem::GoModules,
            Ecosystem::Elm,
            Ecosystem::Submodules,
            Ecosystem::Docker,
            Ecosystem::Terraform,
            Ecosystem::GithubActions,
        ]
    }

    /// Returns the command-line identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Bundler => "bundler",
            Ecosystem::Pip => "pip",
            Ecosystem::NpmAndYarn => "npm_and_yarn",
            Ecosystem::Maven => "maven",
            Ecosystem::Gradle => "gradle",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Hex => "hex",
            Ecosystem::Composer => "composer",
            Ecosystem::Nuget => "nuget",
            Ecosystem::Dep => "dep",
            Ecosystem::GoModules => "go_modules",
            Ecosystem::Elm => "elm",
            Ecosystem::Submodules => "submodules",
            Ecosystem::Docker => "docker",
            Ecosystem::Terraform => "terraform",
            Ecosystem::GithubActions => "github_actions",
        }
    }

    /// Returns the human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Bundler => "Bundler",
            Ecosystem::Pip => "pip",
            Ecosystem::NpmAndYarn => "npm/yarn",
            Ecosystem::Maven => "Maven",
            Ecosystem::Gradle => "Gradle",
            Ecosystem::Cargo => "Cargo",
            Ecosystem::Hex => "Hex",
            Ecosystem::Composer => "Composer",
            Ecosystem::Nuget => "NuGet",
            Ecosystem::Dep => "dep",
            Ecosystem::GoModules => "Go modules",
            Ecosystem::Elm => "Elm",
            Ecosystem::Submodules => "Git submodules",
            Ecosystem::Docker => "Docker",
            Ecosystem::Terraform => "Terraform",
            Ecosystem::GithubActions => "GitHub Actions",
        }
    }

    /// Space separated list of every identifier, for error messages
    pub fn identifiers() -> String {
        Self::all()
            .iter()
            .map(|e| e.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromStr for Ecosystem {
    type Err = UnknownEcosystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ecosystem::all()
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownEcosystem(s.to_string()))
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ecosystems() {
        let all = Ecosystem::all();
        assert_eq!(all.len(), 16);
        assert_eq!(all[0], Ecosystem::Bundler);
        assert_eq!(all[15], Ecosystem::GithubActions);
    }

    #[test]
    fn test_identifiers_round_trip_through_from_str() {
        for ecosystem in Ecosystem::all() {
            assert_eq!(ecosystem.as_str().parse::<Ecosystem>(), Ok(*ecosystem));
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "yarn".parse::<Ecosystem>().unwrap_err();
        assert_eq!(err, UnknownEcosystem("yarn".to_string()));
        assert!(err.to_string().contains("unknown package manager 'yarn'"));
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert!("Cargo".parse::<Ecosystem>().is_err());
    }

    #[test]
    fn test_identifiers_list() {
        let ids = Ecosystem::identifiers();
        assert!(ids.starts_with("bundler pip npm_and_yarn"));
        assert!(ids.ends_with("terraform github_actions"));
    }

    #[test]
    fn test_display_uses_identifier() {
        assert_eq!(Ecosystem::NpmAndYarn.to_string(), "npm_and_yarn");
        assert_eq!(Ecosystem::GoModules.display_name(), "Go modules");
    }

    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&Ecosystem::GithubActions).unwrap();
        assert_eq!(json, "\"github_actions\"");

        let parsed: Ecosystem = serde_json::from_str("\"go_modules\"").unwrap();
        assert_eq!(parsed, Ecosystem::GoModules);
    }
}
