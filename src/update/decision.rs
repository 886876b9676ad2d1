//! The update-eligibility and unlock-scope decision
//!
//! Scopes are tried from least to most permissive and the first that permits
//! an update wins:
//!
//! 1. already at the latest release → up to date
//! 2. own requirement cannot or need not be unlocked → `none`, else not possible
//! 3. otherwise → `own`, then `all`, else not possible

use crate::domain::{Decision, UnlockScope};
use crate::error::ResolutionError;
use crate::update::UpdateChecker;

/// Decide whether and how a dependency can be updated
///
/// Only read-only queries are made; a checker failure is returned as an
/// error rather than folded into "update not possible".
pub async fn decide(checker: &dyn UpdateChecker) -> Result<Decision, ResolutionError> {
    if checker.up_to_date().await? {
        return Ok(Decision::UpToDate);
    }

    if !checker.requirements_unlocked_or_can_be().await? {
        let scope = if checker.can_update(UnlockScope::None).await? {
            UnlockScope::None
        } else {
            UnlockScope::UpdateNotPossible
        };
        return Ok(Decision::Scope(scope));
    }

    for scope in [UnlockScope::Own, UnlockScope::All] {
        if checker.can_update(scope).await? {
            return Ok(Decision::Scope(scope));
        }
    }

    Ok(Decision::Scope(UnlockScope::UpdateNotPossible))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UpdatedDependency;
    use crate::error::RegistryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted checker that records every query
    #[derive(Default)]
    struct ScriptedChecker {
        up_to_date: bool,
        unlockable: bool,
        allowed: Vec<UnlockScope>,
        fail_up_to_date: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedChecker {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpdateChecker for ScriptedChecker {
        async fn up_to_date(&self) -> Result<bool, ResolutionError> {
            self.record("up_to_date");
            if self.fail_up_to_date {
                return Err(RegistryError::package_not_found("foo", "npm").into());
            }
            Ok(self.up_to_date)
        }

        async fn requirements_unlocked_or_can_be(&self) -> Result<bool, ResolutionError> {
            self.record("unlockable");
            Ok(self.unlockable)
        }

        async fn can_update(&self, scope: UnlockScope) -> Result<bool, ResolutionError> {
            self.record(format!("can_update:{}", scope));
            Ok(self.allowed.contains(&scope))
        }

        async fn updated_dependencies(
            &self,
            _scope: UnlockScope,
        ) -> Result<Vec<UpdatedDependency>, ResolutionError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_up_to_date_short_circuits() {
        let checker = ScriptedChecker {
            up_to_date: true,
            ..Default::default()
        };
        assert_eq!(decide(&checker).await.unwrap(), Decision::UpToDate);
        assert_eq!(checker.calls(), vec!["up_to_date"]);
    }

    #[tokio::test]
    async fn test_locked_requirement_uses_none() {
        let checker = ScriptedChecker {
            allowed: vec![UnlockScope::None, UnlockScope::Own],
            ..Default::default()
        };
        assert_eq!(
            decide(&checker).await.unwrap(),
            Decision::Scope(UnlockScope::None)
        );
        assert_eq!(
            checker.calls(),
            vec!["up_to_date", "unlockable", "can_update:none"]
        );
    }

    #[tokio::test]
    async fn test_locked_requirement_without_update() {
        let checker = ScriptedChecker::default();
        assert_eq!(
            decide(&checker).await.unwrap(),
            Decision::Scope(UnlockScope::UpdateNotPossible)
        );
    }

    #[tokio::test]
    async fn test_own_before_all() {
        let checker = ScriptedChecker {
            unlockable: true,
            allowed: vec![UnlockScope::Own, UnlockScope::All],
            ..Default::default()
        };
        assert_eq!(
            decide(&checker).await.unwrap(),
            Decision::Scope(UnlockScope::Own)
        );
        assert!(!checker.calls().contains(&"can_update:all".to_string()));
        assert!(!checker.calls().contains(&"can_update:none".to_string()));
    }

    #[tokio::test]
    async fn test_falls_back_to_all() {
        let checker = ScriptedChecker {
            unlockable: true,
            allowed: vec![UnlockScope::All],
            ..Default::default()
        };
        assert_eq!(
            decide(&checker).await.unwrap(),
            Decision::Scope(UnlockScope::All)
        );
        assert_eq!(
            checker.calls(),
            vec!["up_to_date", "unlockable", "can_update:own", "can_update:all"]
        );
    }

    #[tokio::test]
    async fn test_unlockable_without_update() {
        let checker = ScriptedChecker {
            unlockable: true,
            ..Default::default()
        };
        assert_eq!(
            decide(&checker).await.unwrap(),
            Decision::Scope(UnlockScope::UpdateNotPossible)
        );
    }

    #[tokio::test]
    async fn test_checker_failure_is_an_error() {
        let checker = ScriptedChecker {
            fail_up_to_date: true,
            ..Default::default()
        };
        assert!(decide(&checker).await.is_err());
    }

    #[tokio::test]
    async fn test_repeated_decisions_agree() {
        let checker = ScriptedChecker {
            unlockable: true,
            allowed: vec![UnlockScope::All],
            ..Default::default()
        };
        let first = decide(&checker).await.unwrap();
        let second = decide(&checker).await.unwrap();
        assert_eq!(first, second);
    }
}
