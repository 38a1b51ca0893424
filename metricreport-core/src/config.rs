//! Report configuration
//!
//! Values come from three layers, highest precedence first:
//! 1. `/key:value` command-line arguments
//! 2. A JSON config file (`/config:<path>`, else `.metricreportrc.json` in
//!    the working directory when it exists)
//! 3. Built-in defaults (threshold 80, title "Code Metrics Report")
//!
//! The result directory, result pattern and HTML report path have no default
//! and must be supplied by one of the first two layers.

use crate::args::{
    ArgMap, ARG_CONFIG, ARG_HTML_REPORT, ARG_RESULT_DIR, ARG_RESULT_PATTERN, ARG_THRESHOLD,
    ARG_TITLE,
};
use crate::locate::compile_pattern;
use anyhow::{Context, Result};
use globset::GlobMatcher;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_TITLE: &str = "Code Metrics Report";

/// Config file picked up from the working directory when `/config` is absent
pub const CONFIG_FILE_NAME: &str = ".metricreportrc.json";

/// Config file contents; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FileConfig {
    /// MaintainabilityIndex pass threshold
    #[serde(default)]
    pub threshold: Option<f64>,

    #[serde(default)]
    pub metric_result_dir: Option<PathBuf>,

    #[serde(default)]
    pub metric_result_pattern: Option<String>,

    #[serde(default)]
    pub html_report: Option<PathBuf>,

    /// Report heading
    #[serde(default)]
    pub title: Option<String>,
}

impl FileConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: FileConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.threshold {
            if !threshold.is_finite() {
                anyhow::bail!("threshold must be a finite number (got {})", threshold);
            }
        }
        if let Some(pattern) = &self.metric_result_pattern {
            if pattern.is_empty() {
                anyhow::bail!("metricResultPattern must not be empty");
            }
        }
        Ok(())
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub threshold: f64,
    pub result_dir: PathBuf,
    pub result_pattern: String,
    /// Compiled form of `result_pattern`
    pub result_glob: GlobMatcher,
    pub html_report: PathBuf,
    pub title: String,
    /// Path the config file was loaded from (None if no file was used)
    pub config_path: Option<PathBuf>,
}

impl ReportConfig {
    /// Build a configuration from explicit values with the default title
    pub fn new(
        result_dir: impl Into<PathBuf>,
        result_pattern: impl Into<String>,
        html_report: impl Into<PathBuf>,
        threshold: f64,
    ) -> Result<Self> {
        let result_pattern = result_pattern.into();
        let result_glob = compile_pattern(&result_pattern)?;
        Ok(ReportConfig {
            threshold,
            result_dir: result_dir.into(),
            result_pattern,
            result_glob,
            html_report: html_report.into(),
            title: DEFAULT_TITLE.to_string(),
            config_path: None,
        })
    }
}

/// Parse a threshold value; anything other than a finite number is rejected
pub fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a number (got '{}')", ARG_THRESHOLD, raw))?;
    if !value.is_finite() {
        anyhow::bail!("{} must be a finite number (got '{}')", ARG_THRESHOLD, raw);
    }
    Ok(value)
}

/// Locate the config file to use, if any
///
/// An explicit path must exist. Without one, `CONFIG_FILE_NAME` in
/// `base_dir` is used when present.
pub fn find_config_file(base_dir: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let candidate = base_dir.join(CONFIG_FILE_NAME);
    Ok(candidate.is_file().then_some(candidate))
}

/// Merge command-line arguments over the config file and defaults
pub fn resolve(args: &ArgMap, base_dir: &Path) -> Result<ReportConfig> {
    let explicit = args.get(ARG_CONFIG).map(Path::new);
    let config_path = find_config_file(base_dir, explicit)?;
    let file = match &config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    if let Some(path) = &config_path {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    let threshold = match args.get(ARG_THRESHOLD) {
        Some(raw) => parse_threshold(raw)?,
        None => file.threshold.unwrap_or(DEFAULT_THRESHOLD),
    };

    let result_dir = args
        .get(ARG_RESULT_DIR)
        .map(PathBuf::from)
        .or(file.metric_result_dir)
        .with_context(|| format!("missing required argument {}", ARG_RESULT_DIR))?;
    let result_pattern = args
        .get(ARG_RESULT_PATTERN)
        .cloned()
        .or(file.metric_result_pattern)
        .with_context(|| format!("missing required argument {}", ARG_RESULT_PATTERN))?;
    let html_report = args
        .get(ARG_HTML_REPORT)
        .map(PathBuf::from)
        .or(file.html_report)
        .with_context(|| format!("missing required argument {}", ARG_HTML_REPORT))?;
    let title = args
        .get(ARG_TITLE)
        .cloned()
        .or(file.title)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let result_glob = compile_pattern(&result_pattern)?;

    Ok(ReportConfig {
        threshold,
        result_dir,
        result_pattern,
        result_glob,
        html_report,
        title,
        config_path,
    })
}
