//! Update checking against a package registry
//!
//! [`UpdateChecker`] is the capability the decision procedure queries.
//! [`RegistryUpdateChecker`] answers those queries from the dependency's
//! releases, its own requirement and the requirements other locked packages
//! place on it.

use crate::domain::version::compare_versions;
use crate::domain::{Credentials, Dependency, UnlockScope, UpdatedDependency, VersionSpec};
use crate::error::ResolutionError;
use crate::manifest::{Constraint, LockfileSnapshot};
use crate::parser;
use crate::registry::RegistryAdapter;
use crate::update::{by_version, RequirementOn, UpdateFilter, VersionInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Read-only queries about one dependency's update options
#[async_trait]
pub trait UpdateChecker: Send + Sync {
    /// The dependency is already at the latest eligible release
    async fn up_to_date(&self) -> Result<bool, ResolutionError>;

    /// The dependency's own requirement already allows an update or can be rewritten to
    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, ResolutionError>;

    /// An update above the current version exists at this scope
    async fn can_update(&self, scope: UnlockScope) -> Result<bool, ResolutionError>;

    /// The dependencies that change when updating at this scope
    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<UpdatedDependency>, ResolutionError>;
}

/// A newer release of a dependent that lifts its constraint
#[derive(Debug, Clone)]
struct DependentUpdate {
    name: String,
    from: String,
    to: String,
}

/// Checker backed by registry releases and the lockfile's requirement graph
pub struct RegistryUpdateChecker {
    dependency: Dependency,
    /// Every dependency declared in the manifest, to find dependents' requirements
    declared: Vec<Dependency>,
    lockfile: LockfileSnapshot,
    registry: Arc<dyn RegistryAdapter>,
    credentials: Credentials,
    filter: UpdateFilter,
    now: DateTime<Utc>,
    releases: OnceCell<Vec<VersionInfo>>,
    dependent_releases: Mutex<HashMap<String, Vec<VersionInfo>>>,
}

impl RegistryUpdateChecker {
    pub fn new(
        dependency: Dependency,
        declared: Vec<Dependency>,
        lockfile: LockfileSnapshot,
        registry: Arc<dyn RegistryAdapter>,
        credentials: Credentials,
        filter: UpdateFilter,
    ) -> Self {
        Self {
            dependency,
            declared,
            lockfile,
            registry,
            credentials,
            filter,
            now: Utc::now(),
            releases: OnceCell::new(),
            dependent_releases: Mutex::new(HashMap::new()),
        }
    }

    /// Use a fixed current time for release age checks
    pub fn with_time(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    fn current_version(&self) -> Option<&str> {
        self.dependency.version.as_deref()
    }

    /// The version updates are measured against: the resolved version, or the
    /// requirement's base version when nothing is locked
    fn baseline_version(&self) -> Option<&str> {
        self.current_version().or_else(|| {
            self.dependency
                .requirement
                .as_ref()
                .map(|r| r.version.as_str())
                .filter(|v| !v.is_empty())
        })
    }

    /// Releases that may be updated to, ascending
    async fn eligible_releases(&self) -> Result<Vec<&VersionInfo>, ResolutionError> {
        let releases = self
            .releases
            .get_or_try_init(|| async {
                tracing::debug!(package = %self.dependency.name, "fetching releases");
                self.registry
                    .fetch_versions(&self.dependency.name, &self.credentials)
                    .await
            })
            .await?;

        let allow_prerelease = self
            .baseline_version()
            .is_some_and(crate::domain::version::is_prerelease);

        Ok(releases
            .iter()
            .filter(|r| self.is_eligible(r, allow_prerelease))
            .collect())
    }

    fn is_eligible(&self, release: &VersionInfo, allow_prerelease: bool) -> bool {
        !release.yanked
            && (allow_prerelease || !release.is_prerelease())
            && crate::domain::version::parse_version(&release.version).is_some()
            && self.filter.is_old_enough(release, self.now)
    }

    async fn latest(&self) -> Result<Option<String>, ResolutionError> {
        Ok(self
            .eligible_releases()
            .await?
            .into_iter()
            .max_by(|a, b| by_version(a, b))
            .map(|r| r.version.clone()))
    }

    fn is_above_current(&self, version: &str) -> bool {
        match self.baseline_version() {
            Some(current) => compare_versions(version, current) == Ordering::Greater,
            None => false,
        }
    }

    fn constraints(&self) -> Vec<Constraint> {
        self.lockfile.constraints_on(&self.dependency.name)
    }

    /// Highest eligible release above the current version that every
    /// constraint admits, plus the own requirement unless it is relaxed
    async fn highest_admitted(&self, include_own: bool) -> Result<Option<String>, ResolutionError> {
        let constraints = self.constraints();
        let own = self.dependency.requirement.as_ref().filter(|_| include_own);

        Ok(self
            .eligible_releases()
            .await?
            .into_iter()
            .rev()
            .map(|r| r.version.as_str())
            .find(|v| {
                own.is_none_or(|req| req.admits(v))
                    && constraints.iter().all(|c| c.requirement.admits(v))
            })
            .filter(|v| self.is_above_current(v))
            .map(str::to_string))
    }

    async fn releases_of(&self, package: &str) -> Result<Vec<VersionInfo>, ResolutionError> {
        let mut cache = self.dependent_releases.lock().await;
        if let Some(releases) = cache.get(package) {
            return Ok(releases.clone());
        }
        tracing::debug!(package, dependent_of = %self.dependency.name, "fetching dependent releases");
        let releases = self.registry.fetch_versions(package, &self.credentials).await?;
        cache.insert(package.to_string(), releases.clone());
        Ok(releases)
    }

    /// Newer releases of every dependent whose constraint blocks `target`
    ///
    /// Returns `None` when some blocking dependent has no release that lifts
    /// its constraint.
    async fn dependent_updates(
        &self,
        target: &str,
    ) -> Result<Option<Vec<DependentUpdate>>, ResolutionError> {
        let Some(version_parser) = parser::get_parser(self.dependency.ecosystem) else {
            return Ok(None);
        };

        let mut updates: Vec<DependentUpdate> = Vec::new();

        for constraint in self.constraints() {
            if constraint.requirement.admits(target)
                || updates.iter().any(|u| u.name == constraint.dependent)
            {
                continue;
            }

            let releases = self.releases_of(&constraint.dependent).await?;
            let lifting = releases
                .iter()
                .rev()
                .filter(|r| {
                    !r.yanked
                        && !r.is_prerelease()
                        && self.filter.is_old_enough(r, self.now)
                        && compare_versions(&r.version, &constraint.dependent_version)
                            == Ordering::Greater
                })
                .find(|r| match r.requirement_on(&self.dependency.name) {
                    RequirementOn::Absent => true,
                    RequirementOn::Requires(raw) => version_parser
                        .parse(raw)
                        .is_some_and(|req| req.admits(target)),
                    RequirementOn::Unknown => false,
                });

            let Some(release) = lifting else {
                tracing::debug!(
                    package = %self.dependency.name,
                    dependent = %constraint.dependent,
                    "no dependent release lifts the constraint"
                );
                return Ok(None);
            };

            if let Some(declared) = self.declared_requirement(&constraint.dependent) {
                if !declared.admits(&release.version) && !declared.is_rewritable() {
                    return Ok(None);
                }
            }

            updates.push(DependentUpdate {
                name: constraint.dependent.clone(),
                from: constraint.dependent_version.clone(),
                to: release.version.clone(),
            });
        }

        Ok(Some(updates))
    }

    fn declared_requirement(&self, name: &str) -> Option<&VersionSpec> {
        self.declared
            .iter()
            .find(|d| d.name == name && d.top_level)
            .and_then(|d| d.requirement.as_ref())
    }

    async fn target(&self, scope: UnlockScope) -> Result<Option<String>, ResolutionError> {
        match scope {
            // without a locked version there is nothing to relock
            UnlockScope::None if self.current_version().is_none() => Ok(None),
            UnlockScope::None => self.highest_admitted(true).await,
            UnlockScope::Own => self.highest_admitted(false).await,
            UnlockScope::All => {
                let Some(latest) = self.latest().await? else {
                    return Ok(None);
                };
                if !self.is_above_current(&latest) {
                    return Ok(None);
                }
                let dependents = self.dependent_updates(&latest).await?;
                Ok(dependents.map(|_| latest))
            }
            UnlockScope::UpdateNotPossible => Ok(None),
        }
    }

    fn updated(
        &self,
        name: &str,
        previous_version: Option<String>,
        version: String,
        previous_requirement: Option<VersionSpec>,
        rewrite: bool,
        top_level: bool,
    ) -> UpdatedDependency {
        let requirement = match &previous_requirement {
            Some(req) if rewrite && !req.admits(&version) => Some(req.updated(&version)),
            other => other.clone(),
        };
        UpdatedDependency {
            name: name.to_string(),
            ecosystem: self.dependency.ecosystem,
            previous_version,
            version,
            previous_requirement,
            requirement,
            top_level,
        }
    }
}

#[async_trait]
impl UpdateChecker for RegistryUpdateChecker {
    async fn up_to_date(&self) -> Result<bool, ResolutionError> {
        let Some(latest) = self.latest().await? else {
            return Ok(true);
        };

        Ok(match (self.current_version(), &self.dependency.requirement) {
            (Some(current), _) => compare_versions(current, &latest) != Ordering::Less,
            (None, Some(requirement)) => requirement.admits(&latest),
            (None, None) => true,
        })
    }

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, ResolutionError> {
        if self.filter.lockfile_only {
            return Ok(false);
        }
        let Some(requirement) = &self.dependency.requirement else {
            return Ok(false);
        };
        if !requirement.is_rewritable() {
            return Ok(false);
        }
        Ok(match self.latest().await? {
            Some(latest) => !requirement.admits(&latest),
            None => false,
        })
    }

    async fn can_update(&self, scope: UnlockScope) -> Result<bool, ResolutionError> {
        let target = self.target(scope).await?;
        tracing::debug!(
            package = %self.dependency.name,
            scope = %scope,
            target = ?target,
            "checked unlock scope"
        );
        Ok(target.is_some())
    }

    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<UpdatedDependency>, ResolutionError> {
        let target = self
            .target(scope)
            .await?
            .ok_or_else(|| ResolutionError::NoTarget {
                package: self.dependency.name.clone(),
                scope: scope.to_string(),
            })?;

        let mut updates = vec![self.updated(
            &self.dependency.name,
            self.dependency.version.clone(),
            target.clone(),
            self.dependency.requirement.clone(),
            scope != UnlockScope::None,
            self.dependency.top_level,
        )];

        if scope == UnlockScope::All {
            for dependent in self.dependent_updates(&target).await?.unwrap_or_default() {
                let requirement = self.declared_requirement(&dependent.name).cloned();
                let top_level = requirement.is_some();
                updates.push(self.updated(
                    &dependent.name,
                    Some(dependent.from),
                    dependent.to,
                    requirement,
                    true,
                    top_level,
                ));
            }
        }

        Ok(updates)
    }
}
