//! Update decisions for dependencies
//!
//! This module provides:
//! - Update filter configuration from CLI args
//! - Version info from registry with release date and requirements
//! - The update checker that answers eligibility queries from a registry
//! - The decision procedure that picks an unlock scope

mod checker;
mod decision;
mod filter;
mod version_info;

pub use checker::{RegistryUpdateChecker, UpdateChecker};
pub use decision::decide;
pub use filter::{parse_duration, UpdateFilter};
pub use version_info::{by_version, RequirementOn, VersionInfo};
