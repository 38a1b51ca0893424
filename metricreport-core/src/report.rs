//! Per-project metric records and the collection handed to the renderer
//!
//! Global invariants enforced:
//! - Every record carries a `Project Name` entry
//! - Metric order within a record is the order found in the source XML
//! - Record order within a collection is file processing order

use anyhow::Result;
use indexmap::IndexMap;
use std::path::PathBuf;

/// Key under which the target's `Name` attribute is stored
pub const PROJECT_NAME: &str = "Project Name";

/// Ordered sequence of records, one per successfully parsed file
pub type ReportCollection = Vec<MetricRecord>;

/// Metrics extracted from a single result file
///
/// Keys are the metric names as written in the XML (`MaintainabilityIndex`,
/// `SourceLines`, ...). Keys beyond the rendered columns are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    values: IndexMap<String, String>,
}

impl MetricRecord {
    /// Create a record holding only the project name
    pub fn new(project_name: impl Into<String>) -> Self {
        let mut values = IndexMap::new();
        values.insert(PROJECT_NAME.to_string(), project_name.into());
        MetricRecord { values }
    }

    pub fn project_name(&self) -> &str {
        self.get(PROJECT_NAME).unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Add a metric value; a name already present is rejected
    pub fn insert_metric(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.values.contains_key(&name) {
            anyhow::bail!("duplicate metric name: {}", name);
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Number of entries, including the project name
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A result file that contributed no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of extracting every located file
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: ReportCollection,
    pub failures: Vec<FileFailure>,
}

impl Extraction {
    pub fn processed(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}
