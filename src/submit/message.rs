//! Pull-request titles, bodies and branch names

use crate::domain::{DependencySource, Ecosystem, UnlockScope, UpdatedDependency};
use std::fmt::Write;

/// Prefix of every branch this tool pushes
pub const BRANCH_PREFIX: &str = "depbot";

/// `Bump foo from 1.2.0 to 1.3.0`, or `Bump a, b and c` for several
pub fn title(dependencies: &[UpdatedDependency], source: &DependencySource) -> String {
    let subject = match dependencies {
        [single] => match single.from_version() {
            Some(from) => format!("Bump {} from {} to {}", single.name, from, single.version),
            None => format!("Bump {} to {}", single.name, single.version),
        },
        _ => format!("Bump {}", join_names(dependencies)),
    };

    if source.is_root_directory() {
        subject
    } else {
        format!("{} in {}", subject, source.directory)
    }
}

fn join_names(dependencies: &[UpdatedDependency]) -> String {
    let names: Vec<&str> = dependencies.iter().map(|d| d.name.as_str()).collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// Lists each change and the unlock scope that allowed it
pub fn body(dependencies: &[UpdatedDependency], ecosystem: Ecosystem, scope: UnlockScope) -> String {
    let mut body = format!("Updates the following {} dependencies:\n\n", ecosystem);

    for dep in dependencies {
        let _ = match dep.from_version() {
            Some(from) => write!(body, "- `{}` from {} to {}", dep.name, from, dep.version),
            None => write!(body, "- `{}` to {}", dep.name, dep.version),
        };
        if dep.requirement_changed() {
            if let (Some(old), Some(new)) = (&dep.previous_requirement, &dep.requirement) {
                let _ = write!(body, " (requirement `{}` to `{}`)", old.raw, new.raw);
            }
        }
        body.push('\n');
    }

    let _ = write!(body, "\nUnlock scope: `{}`\n", scope);
    body
}

/// `depbot/<ecosystem>/<dir>/<name>-<version>`, one segment per updated dependency
pub fn branch_name(
    ecosystem: Ecosystem,
    source: &DependencySource,
    dependencies: &[UpdatedDependency],
) -> String {
    let mut segments = vec![BRANCH_PREFIX.to_string(), ecosystem.to_string()];
    let dir = source.directory.trim_matches('/');
    if !dir.is_empty() {
        segments.push(sanitize(dir));
    }

    let leaf = dependencies
        .iter()
        .map(|d| sanitize(&format!("{}-{}", d.name, d.version)))
        .collect::<Vec<_>>()
        .join("-and-");
    segments.push(leaf);

    segments.join("/")
}

/// Keeps characters valid in a git ref, turning the rest into `-`
fn sanitize(segment: &str) -> String {
    segment
        .trim_start_matches('@')
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' | '/' => c,
            _ => '-',
        })
        .collect::<String>()
        .replace("..", ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Provider, VersionSpec, VersionSpecKind};

    fn source(directory: &str) -> DependencySource {
        DependencySource::new(Provider::Github, "github.com", "acme/app", directory, "master")
    }

    fn dep(name: &str, from: Option<&str>, to: &str) -> UpdatedDependency {
        UpdatedDependency {
            name: name.to_string(),
            ecosystem: Ecosystem::NpmAndYarn,
            previous_version: from.map(str::to_string),
            version: to.to_string(),
            previous_requirement: None,
            requirement: None,
            top_level: true,
        }
    }

    #[test]
    fn test_single_title() {
        assert_eq!(
            title(&[dep("foo", Some("1.2.0"), "1.3.0")], &source("/")),
            "Bump foo from 1.2.0 to 1.3.0"
        );
        assert_eq!(title(&[dep("foo", None, "1.3.0")], &source("/")), "Bump foo to 1.3.0");
    }

    #[test]
    fn test_multiple_titles() {
        let a = dep("a", Some("1.0.0"), "2.0.0");
        let b = dep("b", Some("1.0.0"), "2.0.0");
        let c = dep("c", Some("1.0.0"), "2.0.0");
        assert_eq!(title(&[a.clone(), b.clone()], &source("/")), "Bump a and b");
        assert_eq!(title(&[a, b, c], &source("/")), "Bump a, b and c");
    }

    #[test]
    fn test_title_in_directory() {
        assert_eq!(
            title(&[dep("foo", Some("1.2.0"), "1.3.0")], &source("/frontend")),
            "Bump foo from 1.2.0 to 1.3.0 in /frontend"
        );
    }

    #[test]
    fn test_body_lists_changes() {
        let mut foo = dep("foo", Some("1.2.0"), "2.0.0");
        foo.previous_requirement = Some(VersionSpec::new(VersionSpecKind::Caret, "^1.2.0", "1.2.0"));
        foo.requirement = Some(VersionSpec::new(VersionSpecKind::Caret, "^2.0.0", "2.0.0"));

        let body = body(&[foo], Ecosystem::NpmAndYarn, UnlockScope::Own);
        assert!(body.contains("npm_and_yarn"));
        assert!(body.contains("- `foo` from 1.2.0 to 2.0.0 (requirement `^1.2.0` to `^2.0.0`)"));
        assert!(body.contains("Unlock scope: `own`"));
    }

    #[test]
    fn test_branch_name() {
        assert_eq!(
            branch_name(Ecosystem::NpmAndYarn, &source("/"), &[dep("foo", None, "1.3.0")]),
            "depbot/npm_and_yarn/foo-1.3.0"
        );
        assert_eq!(
            branch_name(
                Ecosystem::NpmAndYarn,
                &source("/web"),
                &[dep("@babel/core", None, "7.24.0"), dep("bar", None, "2.0.0")]
            ),
            "depbot/npm_and_yarn/web/babel/core-7.24.0-and-bar-2.0.0"
        );
    }
}
