//! Per-ecosystem backends
//!
//! An [`EcosystemBackend`] bundles what the orchestrator needs for one
//! package manager: which files to fetch, how to parse them, how to check a
//! dependency for updates and how to rewrite the files. [`BackendRegistry`]
//! maps ecosystem identifiers to backends; identifiers without one are
//! reported as unsupported.

use crate::domain::{
    Credentials, Dependency, DependencyFile, Ecosystem, FetchedFiles, FileLayout,
    UpdatedDependency,
};
use crate::error::{ManifestError, RewriteError};
use crate::manifest::{self, read_lockfile, LockfileSnapshot, ManifestParser};
use crate::registry::{create_adapter, HttpClient, RegistryAdapter};
use crate::rewrite::{manifest_updater, FileUpdater, LockfileRegenerator, ManifestFileUpdater};
use crate::update::{RegistryUpdateChecker, UpdateChecker, UpdateFilter};
use async_trait::async_trait;
use std::sync::Arc;

/// Everything needed to update one ecosystem
#[async_trait]
pub trait EcosystemBackend: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// Files to fetch from the source directory
    fn layout(&self) -> FileLayout;

    /// Parse the fetched files into dependencies, with resolved versions filled in
    fn parse(&self, files: &FetchedFiles) -> Result<Vec<Dependency>, ManifestError>;

    /// Build the update checker for one dependency
    ///
    /// `dependencies` is the full parse result, used to find the
    /// requirements of dependents.
    fn checker(
        &self,
        dependency: &Dependency,
        dependencies: &[Dependency],
        files: &FetchedFiles,
        credentials: &Credentials,
        filter: &UpdateFilter,
    ) -> Result<Box<dyn UpdateChecker>, ManifestError>;

    /// Rewrite the files for a set of updates
    async fn updated_files(
        &self,
        updates: &[UpdatedDependency],
        files: &FetchedFiles,
    ) -> Result<Vec<DependencyFile>, RewriteError>;
}

/// Manifest and lockfile names per ecosystem
pub fn file_layout(ecosystem: Ecosystem) -> Option<FileLayout> {
    let (manifest, optional): (&'static str, &'static [&'static str]) = match ecosystem {
        Ecosystem::NpmAndYarn => ("package.json", &["package-lock.json"]),
        Ecosystem::Cargo => ("Cargo.toml", &["Cargo.lock"]),
        Ecosystem::Pip => ("pyproject.toml", &["uv.lock", "poetry.lock"]),
        Ecosystem::GoModules => ("go.mod", &["go.sum"]),
        Ecosystem::Bundler => ("Gemfile", &["Gemfile.lock"]),
        Ecosystem::Composer => ("composer.json", &["composer.lock"]),
        _ => return None,
    };
    Some(FileLayout { manifest, optional })
}

/// Backend built from a manifest parser, a registry adapter and a file updater
pub struct StandardBackend {
    parser: Box<dyn ManifestParser>,
    layout: FileLayout,
    registry: Arc<dyn RegistryAdapter>,
    updater: ManifestFileUpdater,
}

impl StandardBackend {
    /// Create the backend for an ecosystem, if it has one
    pub fn new(
        ecosystem: Ecosystem,
        client: HttpClient,
        regenerator: Arc<dyn LockfileRegenerator>,
    ) -> Option<Self> {
        let registry: Arc<dyn RegistryAdapter> = Arc::from(create_adapter(ecosystem, client)?);
        Self::with_registry(ecosystem, registry, regenerator)
    }

    /// Create the backend around a given registry adapter
    pub fn with_registry(
        ecosystem: Ecosystem,
        registry: Arc<dyn RegistryAdapter>,
        regenerator: Arc<dyn LockfileRegenerator>,
    ) -> Option<Self> {
        let layout = file_layout(ecosystem)?;
        Some(Self {
            parser: manifest::get_parser(ecosystem)?,
            layout,
            registry,
            updater: manifest_updater(ecosystem, layout, regenerator)?,
        })
    }

    fn lockfile(&self, files: &FetchedFiles) -> Result<LockfileSnapshot, ManifestError> {
        match files.first_of(self.layout.optional) {
            Some(file) => read_lockfile(self.ecosystem(), file),
            None => Ok(LockfileSnapshot::empty(self.ecosystem())),
        }
    }
}

#[async_trait]
impl EcosystemBackend for StandardBackend {
    fn ecosystem(&self) -> Ecosystem {
        self.parser.ecosystem()
    }

    fn layout(&self) -> FileLayout {
        self.layout
    }

    fn parse(&self, files: &FetchedFiles) -> Result<Vec<Dependency>, ManifestError> {
        let manifest = files
            .get(self.layout.manifest)
            .ok_or_else(|| ManifestError::not_found(self.layout.manifest))?;
        let mut dependencies = self.parser.parse(&manifest.content)?;
        let lockfile = self.lockfile(files)?;

        for dep in dependencies.iter_mut().filter(|d| d.version.is_none()) {
            if let Some(version) = lockfile.version_of(&dep.name) {
                dep.version = Some(version.to_string());
            }
        }

        for package in lockfile.packages() {
            if !dependencies.iter().any(|d| d.name == package.name) {
                dependencies.push(Dependency::transitive(
                    package.name.clone(),
                    package.version.clone(),
                    self.ecosystem(),
                ));
            }
        }

        tracing::debug!(
            ecosystem = %self.ecosystem(),
            count = dependencies.len(),
            "parsed dependencies"
        );

        Ok(dependencies)
    }

    fn checker(
        &self,
        dependency: &Dependency,
        dependencies: &[Dependency],
        files: &FetchedFiles,
        credentials: &Credentials,
        filter: &UpdateFilter,
    ) -> Result<Box<dyn UpdateChecker>, ManifestError> {
        let declared = dependencies.iter().filter(|d| d.top_level).cloned().collect();
        Ok(Box::new(RegistryUpdateChecker::new(
            dependency.clone(),
            declared,
            self.lockfile(files)?,
            Arc::clone(&self.registry),
            credentials.clone(),
            filter.clone(),
        )))
    }

    async fn updated_files(
        &self,
        updates: &[UpdatedDependency],
        files: &FetchedFiles,
    ) -> Result<Vec<DependencyFile>, RewriteError> {
        self.updater.updated_files(updates, files).await
    }
}

/// Maps ecosystems to their backends
#[derive(Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn EcosystemBackend>>,
}

impl BackendRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Backends for every ecosystem this tool supports
    pub fn standard(client: HttpClient, regenerator: Arc<dyn LockfileRegenerator>) -> Self {
        let backends = Ecosystem::all()
            .iter()
            .filter_map(|&eco| StandardBackend::new(eco, client.clone(), Arc::clone(&regenerator)))
            .map(|backend| Arc::new(backend) as Arc<dyn EcosystemBackend>)
            .collect();
        Self { backends }
    }

    /// Add or replace the backend for its ecosystem (builder pattern)
    pub fn with(mut self, backend: Arc<dyn EcosystemBackend>) -> Self {
        self.backends.retain(|b| b.ecosystem() != backend.ecosystem());
        self.backends.push(backend);
        self
    }

    pub fn get(&self, ecosystem: Ecosystem) -> Option<Arc<dyn EcosystemBackend>> {
        self.backends
            .iter()
            .find(|b| b.ecosystem() == ecosystem)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::rewrite::SystemLockfileRegenerator;
    use crate::update::VersionInfo;

    struct NoRegistry(Ecosystem);

    #[async_trait]
    impl RegistryAdapter for NoRegistry {
        fn ecosystem(&self) -> Ecosystem {
            self.0
        }

        async fn fetch_versions(
            &self,
            package: &str,
            _credentials: &Credentials,
        ) -> Result<Vec<VersionInfo>, RegistryError> {
            Err(RegistryError::package_not_found(package, "test"))
        }
    }

    fn backend(ecosystem: Ecosystem) -> StandardBackend {
        StandardBackend::with_registry(
            ecosystem,
            Arc::new(NoRegistry(ecosystem)),
            Arc::new(SystemLockfileRegenerator::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_layouts() {
        assert_eq!(file_layout(Ecosystem::Cargo).unwrap().manifest, "Cargo.toml");
        assert_eq!(
            file_layout(Ecosystem::Pip).unwrap().optional,
            &["uv.lock", "poetry.lock"]
        );
        assert!(file_layout(Ecosystem::Docker).is_none());
    }

    #[test]
    fn test_standard_registry() {
        let registry = BackendRegistry::standard(
            HttpClient::new().unwrap(),
            Arc::new(SystemLockfileRegenerator::new()),
        );
        for eco in [
            Ecosystem::NpmAndYarn,
            Ecosystem::Cargo,
            Ecosystem::Pip,
            Ecosystem::GoModules,
            Ecosystem::Bundler,
            Ecosystem::Composer,
        ] {
            assert_eq!(registry.get(eco).unwrap().ecosystem(), eco);
        }
        assert!(registry.get(Ecosystem::Docker).is_none());
        assert!(registry.get(Ecosystem::Maven).is_none());
    }

    #[test]
    fn test_with_replaces_backend() {
        let registry = BackendRegistry::empty()
            .with(Arc::new(backend(Ecosystem::Cargo)))
            .with(Arc::new(backend(Ecosystem::Cargo)));
        assert_eq!(registry.backends.len(), 1);
    }

    #[test]
    fn test_parse_fills_versions_from_lockfile() {
        let files = FetchedFiles::new(
            vec![
                DependencyFile::new(
                    "Cargo.toml",
                    "[package]\nname = \"app\"\nversion = \"0.1.0\"\n\n[dependencies]\nserde = \"1.0\"\n",
                ),
                DependencyFile::new(
                    "Cargo.lock",
                    "version = 3\n\n[[package]]\nname = \"serde\"\nversion = \"1.0.190\"\n\n[[package]]\nname = \"serde_derive\"\nversion = \"1.0.190\"\n",
                ),
            ],
            "abc",
        );

        let deps = backend(Ecosystem::Cargo).parse(&files).unwrap();
        let serde = deps.iter().find(|d| d.name == "serde").unwrap();
        assert!(serde.top_level);
        assert_eq!(serde.version.as_deref(), Some("1.0.190"));

        let derive = deps.iter().find(|d| d.name == "serde_derive").unwrap();
        assert!(!derive.top_level);
    }

    #[test]
    fn test_parse_requires_manifest() {
        let files = FetchedFiles::new(Vec::new(), "abc");
        assert!(matches!(
            backend(Ecosystem::NpmAndYarn).parse(&files),
            Err(ManifestError::NotFound { .. })
        ));
    }
}
