//! Progress display for a run
//!
//! Prints one start line per ecosystem and one line per processed
//! dependency, with an indicatif spinner while waiting on the network.

use crate::domain::{Ecosystem, Outcome};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the orchestration loop
pub struct Progress {
    /// Whether progress display is enabled (disabled in quiet and JSON modes)
    enabled: bool,
    /// Current spinner
    bar: Option<ProgressBar>,
}

impl Progress {
    /// Create a new progress reporter
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner with a message for an indeterminate operation
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Finish and clear the current spinner
    pub fn finish_and_clear(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        self.bar = None;
    }

    /// Announce an ecosystem and spin while its files are fetched
    pub fn start_ecosystem(&mut self, ecosystem: Ecosystem, repository: &str) {
        self.println(fetching_line(ecosystem, repository).bold().to_string());
        self.spinner(&format!("Fetching {} files", ecosystem.display_name()));
    }

    /// Spin while a dependency is checked, rewritten and submitted
    pub fn start_dependency(&mut self, name: &str) {
        self.finish_and_clear();
        self.spinner(&format!("Updating {}", name));
    }

    /// Print the result line for a dependency
    pub fn dependency(&mut self, name: &str, from: Option<&str>, outcome: &Outcome) {
        self.finish_and_clear();
        let line = dependency_line(name, from, outcome);
        let line = match outcome {
            Outcome::Submitted { .. } => line.green().to_string(),
            Outcome::NotSubmitted { .. } => line.yellow().to_string(),
            Outcome::Skipped { .. } => line.dimmed().to_string(),
            Outcome::Failed { .. } => line.red().to_string(),
        };
        self.println(line);
    }

    /// Print a note about the current ecosystem
    pub fn note(&mut self, message: &str) {
        self.finish_and_clear();
        self.println(format!("  {}", message).dimmed().to_string());
    }

    pub fn done(&mut self) {
        self.finish_and_clear();
        self.println("Done".to_string());
    }

    fn println(&self, line: String) {
        if self.enabled {
            println!("{}", line);
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}

/// `Fetching <pm> dependency files for <repo>`
pub fn fetching_line(ecosystem: Ecosystem, repository: &str) -> String {
    format!("Fetching {} dependency files for {}", ecosystem, repository)
}

/// `  - Updating <name> (from <version>)… <outcome>`
pub fn dependency_line(name: &str, from: Option<&str>, outcome: &Outcome) -> String {
    let from = from.map(|v| format!(" (from {})", v)).unwrap_or_default();
    format!("  - Updating {}{}… {}", name, from, outcome)
}
