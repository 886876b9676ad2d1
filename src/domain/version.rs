//! Lenient version parsing shared by every ecosystem
//!
//! Registries and manifests do not all speak strict semver: Go prefixes a
//! `v`, Python writes `1.2rc1`, Ruby and Composer accept two-component
//! versions. Everything is normalized to [`semver::Version`] here so the rest
//! of the crate can compare versions with one ordering.

use semver::{BuildMetadata, Prerelease, Version};
use std::cmp::Ordering;

/// Parse a version string leniently into a semver version
///
/// - strips a leading `v`/`V` and surrounding whitespace
/// - pads missing minor/patch components with zero
/// - ignores components beyond the third (`1.2.3.4` → `1.2.3`)
/// - keeps any trailing qualifier (`-beta.1`, `rc1`, `.dev0`) as a prerelease
/// - drops `+build` metadata
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(version) = Version::parse(trimmed) {
        return Some(Version {
            build: BuildMetadata::EMPTY,
            ..version
        });
    }

    let numeric_end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let (numeric, rest) = trimmed.split_at(numeric_end);
    let numeric = numeric.trim_end_matches('.');
    if numeric.is_empty() {
        return None;
    }

    let mut parts = numeric.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = match parts.next() {
        Some(part) => part.ok()?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(part) => part.ok()?,
        None => 0,
    };

    let qualifier = rest.split('+').next().unwrap_or("");
    let qualifier = qualifier.trim_start_matches(['-', '.', '_']);

    let pre = if qualifier.is_empty() {
        Prerelease::EMPTY
    } else {
        let sanitized: String = qualifier
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '.' })
            .collect();
        let sanitized = sanitized.trim_matches('.').replace("..", ".");
        Prerelease::new(&sanitized).unwrap_or_else(|_| {
            Prerelease::new("pre").unwrap_or(Prerelease::EMPTY)
        })
    };

    Some(Version {
        major,
        minor,
        patch,
        pre,
        build: BuildMetadata::EMPTY,
    })
}

/// Returns true when the version carries a prerelease qualifier
pub fn is_prerelease(raw: &str) -> bool {
    parse_version(raw).is_some_and(|v| !v.pre.is_empty())
}

/// Compare two version strings
///
/// Unparseable versions sort below every parseable one and compare equal to
/// each other.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Number of dot separated numeric components written in a version string
pub fn component_count(raw: &str) -> usize {
    let trimmed = raw.trim().trim_start_matches(['v', 'V']);
    trimmed
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or("")
        .split('.')
        .filter(|p| !p.is_empty())
        .count()
}
