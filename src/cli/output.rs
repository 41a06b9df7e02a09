//! Report rendering for smoke-test outcomes
//!
//! Turns a [`RunOutcome`] into the human-readable console report, or into
//! JSON/YAML for machine consumption.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::runner::{RunOutcome, StepResult};

/// Title printed in the report banner
pub const REPORT_TITLE: &str = "Google Sheets API - Localhost Integration Test";

const BANNER_WIDTH: usize = 60;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => anyhow::bail!("Unsupported output format: '{}'. Use 'text', 'json', or 'yaml'.", s),
        }
    }
}

/// Serializable view of an outcome, with the derived verdict included
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    target: &'a str,
    started_at: DateTime<Utc>,
    passed: bool,
    failed: usize,
    skipped: Vec<u8>,
    steps: &'a [StepResult],
}

impl<'a> From<&'a RunOutcome> for RunReport<'a> {
    fn from(outcome: &'a RunOutcome) -> Self {
        Self {
            target: &outcome.target,
            started_at: outcome.started_at,
            passed: outcome.passed(),
            failed: outcome.failed_count(),
            skipped: outcome.skipped().map(|s| s.number()).collect(),
            steps: &outcome.steps,
        }
    }
}

/// Print the outcome in the requested format
pub fn print_outcome(outcome: &RunOutcome, format: OutputFormat, color: bool) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(outcome, color)),
        OutputFormat::Json => println!("{}", render_json(outcome)?),
        OutputFormat::Yaml => println!("{}", render_yaml(outcome)?),
    }
    Ok(())
}

pub fn render_json(outcome: &RunOutcome) -> Result<String> {
    serde_json::to_string_pretty(&RunReport::from(outcome)).context("Failed to serialize to JSON")
}

pub fn render_yaml(outcome: &RunOutcome) -> Result<String> {
    serde_yaml::to_string(&RunReport::from(outcome)).context("Failed to serialize to YAML")
}

fn mark(passed: bool, color: bool) -> String {
    match (passed, color) {
        (true, true) => "✓".green().to_string(),
        (true, false) => "✓".to_string(),
        (false, true) => "✗".red().to_string(),
        (false, false) => "✗".to_string(),
    }
}

/// Render the console report
pub fn render_text(outcome: &RunOutcome, color: bool) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let total = outcome.total_steps;
    let mut out = String::new();

    out.push_str(&format!("{}\n{}\n{}\n", rule, REPORT_TITLE, rule));
    out.push_str(&format!("Target: {}\n\n", outcome.target));

    for step in &outcome.steps {
        out.push_str(&format!("[{}/{}] {}...\n", step.step_number, total, step.description));
        out.push_str(&format!("{} {}\n\n", mark(step.passed, color), step.detail));
    }

    let skipped: Vec<_> = outcome.skipped().collect();
    for step in &skipped {
        out.push_str(&format!("[{}/{}] {}...\n", step.number(), total, step.description()));
        out.push_str("- skipped (no bearer token)\n\n");
    }

    out.push_str(&format!("{}\n", rule));
    if outcome.passed() {
        let verdict = if color {
            "ALL TESTS PASSED!".green().bold().to_string()
        } else {
            "ALL TESTS PASSED!".to_string()
        };
        out.push_str(&format!("{} {}\n{}\n", mark(true, color), verdict, rule));
        out.push_str("\nGoogle Sheets integration deployed successfully\n");
        out.push_str("- No existing functionality broken\n");
    } else {
        let mut summary = format!("{} of {} steps failed", outcome.failed_count(), total);
        if !skipped.is_empty() {
            summary.push_str(&format!(", {} skipped", skipped.len()));
        }
        let summary = if color { summary.red().bold().to_string() } else { summary };
        out.push_str(&format!("{} {}\n{}\n", mark(false, color), summary, rule));
    }

    out
}
