//! HTML report generation
//!
//! Generates a single static HTML page: a heading and one table with a row
//! per parsed result file. The MaintainabilityIndex cell is colored by
//! comparing its value against the configured threshold.

use crate::report::{MetricRecord, PROJECT_NAME};
use anyhow::{Context, Result};
use std::path::Path;

pub const MAINTAINABILITY_INDEX: &str = "MaintainabilityIndex";

/// A rendered metric column: header label and the XML metric name it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub label: &'static str,
    pub metric: &'static str,
}

/// Metric columns in display order, after the project name column
pub const METRIC_COLUMNS: [Column; 6] = [
    Column {
        label: "Maintainability Index",
        metric: MAINTAINABILITY_INDEX,
    },
    Column {
        label: "Cyclomatic Complexity",
        metric: "CyclomaticComplexity",
    },
    Column {
        label: "Class Coupling",
        metric: "ClassCoupling",
    },
    Column {
        label: "Depth Of Inheritance",
        metric: "DepthOfInheritance",
    },
    Column {
        label: "Source Lines",
        metric: "SourceLines",
    },
    Column {
        label: "Executable Lines",
        metric: "ExecutableLines",
    },
];

/// Pass/fail state of a MaintainabilityIndex value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Failing,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Failing => "failing",
        }
    }

    fn background(&self) -> &'static str {
        match self {
            Health::Healthy => "rgb(154, 205, 50)",
            Health::Failing => "rgb(255, 0, 0)",
        }
    }
}

/// Healthy iff the value parses as a number and is at least `threshold`
///
/// Missing and unparsable values are failing.
pub fn classify_maintainability(value: Option<&str>, threshold: f64) -> Health {
    match value.and_then(|v| v.trim().parse::<f64>().ok()) {
        Some(v) if v >= threshold => Health::Healthy,
        _ => Health::Failing,
    }
}

/// Render the full report page
pub fn render_html_report(records: &[MetricRecord], threshold: f64, title: &str) -> String {
    let title = html_escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body>
    <h2>{title}</h2>
    <table border="1">
        {header}
{rows}    </table>
</body>
</html>
"#,
        title = title,
        header = render_header_row(),
        rows = render_rows(records, threshold),
    )
}

fn render_header_row() -> String {
    let cells: String = std::iter::once(PROJECT_NAME)
        .chain(METRIC_COLUMNS.iter().map(|c| c.label))
        .map(|label| format!("<th>{}</th>", html_escape(label)))
        .collect();
    format!(r##"<tr bgcolor="#92cddc">{}</tr>"##, cells)
}

fn render_rows(records: &[MetricRecord], threshold: f64) -> String {
    records
        .iter()
        .map(|record| format!("        {}\n", render_row(record, threshold)))
        .collect()
}

fn render_row(record: &MetricRecord, threshold: f64) -> String {
    let mut cells = format!("<td>{}</td>", html_escape(record.project_name()));

    for column in &METRIC_COLUMNS {
        let value = record.get(column.metric);
        let text = html_escape(value.unwrap_or_default());
        if column.metric == MAINTAINABILITY_INDEX {
            let health = classify_maintainability(value, threshold);
            cells.push_str(&format!(
                r#"<td class="{}" style="background-color: {};">{}</td>"#,
                health.as_str(),
                health.background(),
                text
            ));
        } else {
            cells.push_str(&format!("<td>{}</td>", text));
        }
    }

    format!("<tr>{}</tr>", cells)
}

/// Write HTML report to file with atomic write pattern
pub fn write_html_report(path: &Path, html: &str) -> Result<()> {
    use std::fs;

    // Create parent directories if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut temp_name = path
        .file_name()
        .with_context(|| format!("Invalid report path: {}", path.display()))?
        .to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    // Atomic write (temp + rename pattern)
    fs::write(&temp_path, html)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e)
            .with_context(|| format!("Failed to rename temporary file to: {}", path.display()));
    }

    Ok(())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(project: &str, metrics: &[(&str, &str)]) -> MetricRecord {
        let mut record = MetricRecord::new(project);
        for (name, value) in metrics {
            record.insert_metric(*name, *value).unwrap();
        }
        record
    }

    fn full_record(project: &str, mi: &str) -> MetricRecord {
        record(
            project,
            &[
                ("MaintainabilityIndex", mi),
                ("CyclomaticComplexity", "42"),
                ("ClassCoupling", "17"),
                ("DepthOfInheritance", "2"),
                ("SourceLines", "380"),
                ("ExecutableLines", "95"),
            ],
        )
    }

    #[test]
    fn test_classify_threshold_boundary() {
        assert_eq!(classify_maintainability(Some("80"), 80.0), Health::Healthy);
        assert_eq!(classify_maintainability(Some("79.99"), 80.0), Health::Failing);
        assert_eq!(classify_maintainability(Some("100"), 80.0), Health::Healthy);
        assert_eq!(classify_maintainability(Some(" 85 "), 80.0), Health::Healthy);
    }

    #[test]
    fn test_classify_unparsable_and_missing_fail() {
        assert_eq!(classify_maintainability(Some("n/a"), 0.0), Health::Failing);
        assert_eq!(classify_maintainability(Some(""), 0.0), Health::Failing);
        assert_eq!(classify_maintainability(Some("NaN"), 0.0), Health::Failing);
        assert_eq!(classify_maintainability(None, 0.0), Health::Failing);
    }

    #[test]
    fn test_header_lists_columns_in_order() {
        let html = render_html_report(&[], 80.0, "Code Metrics Report");
        let expected = "<th>Project Name</th><th>Maintainability Index</th>\
            <th>Cyclomatic Complexity</th><th>Class Coupling</th>\
            <th>Depth Of Inheritance</th><th>Source Lines</th><th>Executable Lines</th>";
        assert!(html.contains(expected), "header row missing in:\n{}", html);
        assert!(html.contains("<h2>Code Metrics Report</h2>"));
        assert!(!html.contains("<td"));
    }

    #[test]
    fn test_healthy_row() {
        let html = render_html_report(&[full_record("Foo", "90")], 80.0, "Report");
        assert!(html.contains(
            r#"<tr><td>Foo</td><td class="healthy" style="background-color: rgb(154, 205, 50);">90</td><td>42</td><td>17</td><td>2</td><td>380</td><td>95</td></tr>"#
        ));
    }

    #[test]
    fn test_failing_row() {
        let html = render_html_report(&[full_record("Foo", "50")], 80.0, "Report");
        assert!(html.contains(r#"style="background-color: rgb(255, 0, 0);">50</td>"#));
        assert!(!html.contains("rgb(154, 205, 50)"));
    }

    #[test]
    fn test_missing_metrics_render_empty_cells() {
        let html = render_html_report(&[record("Bare", &[])], 80.0, "Report");
        assert!(html.contains(
            r#"<tr><td>Bare</td><td class="failing" style="background-color: rgb(255, 0, 0);"></td><td></td><td></td><td></td><td></td><td></td></tr>"#
        ));
    }

    #[test]
    fn test_rows_follow_record_order() {
        let records = vec![full_record("Zeta", "90"), full_record("Alpha", "90")];
        let html = render_html_report(&records, 80.0, "Report");
        let zeta = html.find("<td>Zeta</td>").unwrap();
        let alpha = html.find("<td>Alpha</td>").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_text_is_escaped() {
        let records = vec![record("A<B>&\"C\"", &[("SourceLines", "<1>")])];
        let html = render_html_report(&records, 80.0, "Tom's <Report>");
        assert!(html.contains("<td>A&lt;B&gt;&amp;&quot;C&quot;</td>"));
        assert!(html.contains("<td>&lt;1&gt;</td>"));
        assert!(html.contains("<h2>Tom&#39;s &lt;Report&gt;</h2>"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let records = vec![full_record("Foo", "90"), full_record("Bar", "10")];
        assert_eq!(
            render_html_report(&records, 80.0, "Report"),
            render_html_report(&records, 80.0, "Report")
        );
    }

    #[test]
    fn test_write_creates_parents_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("report.html");

        write_html_report(&path, "first").unwrap();
        write_html_report(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp.path().join("nested").join("report.html.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        // An existing directory at the report path makes the rename fail
        let path = temp.path().join("report.html");
        std::fs::create_dir(&path).unwrap();

        let err = write_html_report(&path, "<html></html>").unwrap_err();
        assert!(err.to_string().contains("Failed to rename temporary file"));
        assert!(!temp.path().join("report.html.tmp").exists());
        assert!(path.is_dir());
    }
}
