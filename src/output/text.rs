//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-ecosystem outcome lists with colors
//! - Semantic version change type indication (major/minor/patch)
//! - Skipped dependencies in verbose mode
//! - A one-line summary of the run

use crate::domain::{
    DependencyReport, EcosystemReport, EcosystemStatus, Outcome, RunReport,
};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        let parse = |v: &str| -> Option<(u64, u64)> {
            let v = v.strip_prefix('v').unwrap_or(v);
            let mut parts = v.split(['.', '-']);
            let major = parts.next()?.parse().ok()?;
            let minor = match parts.next() {
                Some(minor) => minor.parse().ok()?,
                None => 0,
            };
            Some((major, minor))
        };

        match (parse(old), parse(new)) {
            (Some((old_major, old_minor)), Some((new_major, new_minor))) => {
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    dry_run: bool,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn dry_run_prefix(&self) -> String {
        match (self.dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    fn is_shown(&self, dependency: &DependencyReport) -> bool {
        match dependency.outcome {
            Outcome::Skipped { .. } => self.verbosity == Verbosity::Verbose,
            _ => self.verbosity != Verbosity::Quiet,
        }
    }

    fn format_dependency(
        &self,
        dependency: &DependencyReport,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let from = dependency.from.as_deref().unwrap_or("?");
        let name = format!("{:width$}", dependency.name, width = width);

        match &dependency.outcome {
            Outcome::Submitted { scope, to, location } => {
                let change = VersionChangeType::from_versions(from, to);
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {} {} [{}] {} {}",
                        name,
                        from.dimmed(),
                        "→".dimmed(),
                        to.bright_white().bold(),
                        change.colored_label(),
                        format!("({})", scope).dimmed(),
                        location.cyan()
                    )
                } else {
                    writeln!(
                        writer,
                        "  {} {} -> {} [{}] ({}) {}",
                        name,
                        from,
                        to,
                        change.label(),
                        scope,
                        location
                    )
                }
            }
            Outcome::NotSubmitted { scope, to, reason } => {
                let change = VersionChangeType::from_versions(from, to);
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {} {} [{}] {} {}",
                        name,
                        from.dimmed(),
                        "→".dimmed(),
                        to.bright_white(),
                        change.colored_label(),
                        format!("({})", scope).dimmed(),
                        reason.to_string().yellow()
                    )
                } else {
                    writeln!(
                        writer,
                        "  {} {} -> {} [{}] ({}) {}",
                        name,
                        from,
                        to,
                        change.label(),
                        scope,
                        reason
                    )
                }
            }
            Outcome::Skipped { reason } => {
                if self.color {
                    writeln!(writer, "  {} {}", name.dimmed(), format!("({})", reason).dimmed())
                } else {
                    writeln!(writer, "  {} ({})", name, reason)
                }
            }
            Outcome::Failed { stage, message } => {
                let text = format!("{} failed: {}", stage, message);
                if self.color {
                    writeln!(writer, "  {} {}", name, text.red())
                } else {
                    writeln!(writer, "  {} {}", name, text)
                }
            }
        }
    }

    fn format_ecosystem(
        &self,
        ecosystem: &EcosystemReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let header = ecosystem.ecosystem.display_name();
        match &ecosystem.status {
            EcosystemStatus::Unsupported => {
                if self.verbosity == Verbosity::Quiet {
                    return Ok(());
                }
                if self.color {
                    writeln!(writer, "{} {}", header.bold(), "(unsupported, skipped)".dimmed())?;
                } else {
                    writeln!(writer, "{} (unsupported, skipped)", header)?;
                }
                return Ok(());
            }
            EcosystemStatus::Failed { message } => {
                if self.color {
                    writeln!(writer, "{} {}", header.bold(), format!("failed: {}", message).red())?;
                } else {
                    writeln!(writer, "{} failed: {}", header, message)?;
                }
                return Ok(());
            }
            EcosystemStatus::Processed => {}
        }

        let shown: Vec<&DependencyReport> = ecosystem
            .dependencies
            .iter()
            .filter(|d| self.is_shown(d))
            .collect();
        if shown.is_empty() {
            return Ok(());
        }

        if self.color {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{}", header)?;
        }

        let width = shown.iter().map(|d| d.name.len()).max().unwrap_or(0).max(20);
        for dependency in shown {
            self.format_dependency(dependency, width, writer)?;
        }
        writeln!(writer)
    }

    fn format_summary(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let submitted = report.submitted_count();
        let not_submitted = report.not_submitted_count();
        let skipped = report.skipped_count();
        let failed = report.failed_count();

        if self.color {
            writeln!(
                writer,
                "{}{} submitted, {} not submitted, {} skipped, {} failed",
                prefix,
                submitted.to_string().green(),
                not_submitted.to_string().yellow(),
                skipped.to_string().dimmed(),
                if failed > 0 {
                    failed.to_string().red().to_string()
                } else {
                    failed.to_string()
                }
            )
        } else {
            writeln!(
                writer,
                "{}{} submitted, {} not submitted, {} skipped, {} failed",
                prefix, submitted, not_submitted, skipped, failed
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for ecosystem in &report.ecosystems {
            self.format_ecosystem(ecosystem, writer)?;
        }
        self.format_summary(report, writer)
    }
}
