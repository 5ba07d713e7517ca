//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use lorekeeper_graph_expert::{SemanticStatus, ValidationReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full report as JSON
    Json,
    /// Findings table with a run summary
    Table,
    /// One line per finding: kind and title
    Quiet,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a validation report.
    pub fn format_report(&self, report: &ValidationReport, pretty: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Json => Ok(serde_json::to_string(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(self.format_report_quiet(report)),
        }
    }

    fn format_report_table(&self, report: &ValidationReport) -> String {
        let mut out = String::new();

        if report.findings.is_empty() {
            out.push_str(&self.success("No findings."));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["Kind", "Title", "Description"]);
            for finding in &report.findings {
                builder.push_record([
                    finding.kind().as_str(),
                    finding.title.as_str(),
                    finding.description.as_str(),
                ]);
            }

            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            out.push_str(&table.to_string());
        }
        out.push('\n');

        let meta = &report.metadata;
        out.push_str(&self.info(&format!(
            "Job {}: {} structural, {} semantic, {} suppressed by overrides ({}ms)",
            report.job_id,
            meta.structural_findings,
            meta.semantic_findings,
            meta.suppressed_by_overrides,
            meta.processing_time_ms
        )));

        let semantic = match &meta.semantic_status {
            SemanticStatus::Completed => "completed".to_string(),
            SemanticStatus::Skipped(reason) => format!("skipped ({})", reason),
            SemanticStatus::Failed(message) => format!("failed ({})", message),
            SemanticStatus::TimedOut => "timed out".to_string(),
        };
        out.push('\n');
        out.push_str(&self.info(&format!("Semantic check: {}", semantic)));

        if meta.skipped_suggestions > 0 {
            out.push('\n');
            out.push_str(&self.warning(&format!(
                "{} relationship suggestion(s) could not be parsed",
                meta.skipped_suggestions
            )));
        }
        if !meta.failed_checkers.is_empty() {
            let names: Vec<&str> = meta.failed_checkers.iter().map(|c| c.as_str()).collect();
            out.push('\n');
            out.push_str(&self.warning(&format!("Checks that failed: {}", names.join(", "))));
        }

        out
    }

    fn format_report_quiet(&self, report: &ValidationReport) -> String {
        report
            .findings
            .iter()
            .map(|f| format!("{}\t{}", f.kind(), f.title))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
