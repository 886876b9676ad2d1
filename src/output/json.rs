//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run report
//! - Summary counts alongside per-ecosystem outcomes

use crate::domain::{DependencyReport, EcosystemStatus, Outcome, RunReport};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Skipped dependencies are only listed in verbose mode
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    repository: &'a str,
    dry_run: bool,
    summary: JsonSummary,
    ecosystems: Vec<JsonEcosystem<'a>>,
}

#[derive(Serialize)]
struct JsonSummary {
    submitted: usize,
    not_submitted: usize,
    skipped: usize,
    failed: usize,
}

#[derive(Serialize)]
struct JsonEcosystem<'a> {
    ecosystem: &'a str,
    status: &'a EcosystemStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<&'a DependencyReport>,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let ecosystems = report
            .ecosystems
            .iter()
            .map(|eco| JsonEcosystem {
                ecosystem: eco.ecosystem.as_str(),
                status: &eco.status,
                dependencies: eco
                    .dependencies
                    .iter()
                    .filter(|d| {
                        self.verbosity == Verbosity::Verbose
                            || !matches!(d.outcome, Outcome::Skipped { .. })
                    })
                    .collect(),
            })
            .collect();

        let output = JsonOutput {
            repository: &report.repository,
            dry_run: report.dry_run,
            summary: JsonSummary {
                submitted: report.submitted_count(),
                not_submitted: report.not_submitted_count(),
                skipped: report.skipped_count(),
                failed: report.failed_count(),
            },
            ecosystems,
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ecosystem, EcosystemReport, SkipReason, UnlockScope};
    use serde_json::Value;

    fn report() -> RunReport {
        let mut cargo = EcosystemReport::new(Ecosystem::Cargo, EcosystemStatus::Processed);
        cargo.record(
            "serde",
            Some("1.0.100".to_string()),
            Outcome::Submitted {
                scope: UnlockScope::None,
                to: "1.0.200".to_string(),
                location: "https://github.com/acme/app/pull/1".to_string(),
            },
        );
        cargo.record(
            "log",
            Some("0.4.22".to_string()),
            Outcome::Skipped {
                reason: SkipReason::UpToDate,
            },
        );

        let mut report = RunReport::new("acme/app", false);
        report.add(cargo);
        report.add(EcosystemReport::new(Ecosystem::Docker, EcosystemStatus::Unsupported));
        report
    }

    fn render(verbosity: Verbosity) -> Value {
        let mut out = Vec::new();
        JsonFormatter::new(verbosity).format(&report(), &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_json_output() {
        let json = render(Verbosity::Normal);
        assert_eq!(json["repository"], "acme/app");
        assert_eq!(json["summary"]["submitted"], 1);
        assert_eq!(json["summary"]["skipped"], 1);

        let cargo = &json["ecosystems"][0];
        assert_eq!(cargo["ecosystem"], "cargo");
        assert_eq!(cargo["status"]["state"], "processed");
        assert_eq!(cargo["dependencies"].as_array().unwrap().len(), 1);
        assert_eq!(cargo["dependencies"][0]["outcome"]["status"], "submitted");
        assert_eq!(cargo["dependencies"][0]["outcome"]["to"], "1.0.200");

        assert_eq!(json["ecosystems"][1]["status"]["state"], "unsupported");
    }

    #[test]
    fn test_verbose_lists_skipped() {
        let json = render(Verbosity::Verbose);
        let deps = json["ecosystems"][0]["dependencies"].as_array().unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[1]["outcome"]["reason"], "up_to_date");
    }
}
