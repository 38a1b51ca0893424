//! Metricreport core library - aggregates code metrics XML results into an HTML report

#![deny(warnings)]

// Global invariants enforced in this crate:
// - No global mutable state; configuration is passed explicitly
// - A bad result file never aborts the batch
// - Result files are processed in sorted path order
// - Identical input yields byte-for-byte identical output

pub mod args;
pub mod config;
pub mod extract;
pub mod html;
pub mod locate;
pub mod report;

pub use args::{parse_args, Invocation};
pub use config::ReportConfig;
pub use report::{Extraction, FileFailure, MetricRecord, ReportCollection};

use anyhow::Result;

/// What a run produced
#[derive(Debug)]
pub enum RunOutcome {
    /// The directory exists but no file matched the pattern; nothing written
    NoMatchingFiles,
    /// The report was written; `extraction` holds the rows and skipped files
    Written { extraction: Extraction },
}

/// Locate and extract the result files described by `config`
///
/// Returns None when the directory holds no matching file. Nothing is written.
pub fn collect_reports(config: &ReportConfig) -> Result<Option<Extraction>> {
    let files = locate::locate_reports(&config.result_dir, &config.result_glob)?;
    if files.is_empty() {
        return Ok(None);
    }
    Ok(Some(extract::extract_reports(&files)))
}

/// Render `extraction` and write it to the configured report path
pub fn write_report(config: &ReportConfig, extraction: &Extraction) -> Result<()> {
    let html = html::render_html_report(&extraction.records, config.threshold, &config.title);
    html::write_html_report(&config.html_report, &html)?;
    tracing::debug!(
        report = %config.html_report.display(),
        rows = extraction.records.len(),
        skipped = extraction.failures.len(),
        "report written"
    );
    Ok(())
}

/// Locate, extract, render and write the report described by `config`
pub fn run(config: &ReportConfig) -> Result<RunOutcome> {
    match collect_reports(config)? {
        None => Ok(RunOutcome::NoMatchingFiles),
        Some(extraction) => {
            write_report(config, &extraction)?;
            Ok(RunOutcome::Written { extraction })
        }
    }
}
