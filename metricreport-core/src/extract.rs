//! Metric extraction from code metrics XML results
//!
//! Expected document shape:
//!
//! ```text
//! CodeMetricsReport
//!   Targets
//!     Target Name="..."
//!       Assembly
//!         Metrics
//!           Metric Name="..." Value="..."
//! ```
//!
//! Only the first `Target` is read. Only `Metric` elements directly under
//! `Assembly/Metrics` of that target count; namespace and type level metrics
//! deeper in the tree are ignored. The whole document must still be
//! well-formed for the file to be accepted.

use crate::report::{Extraction, FileFailure, MetricRecord};
use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const TARGET_PATH: [&[u8]; 2] = [b"CodeMetricsReport", b"Targets"];
const TARGET: &[u8] = b"Target";
const METRIC_PATH: [&[u8]; 2] = [b"Assembly", b"Metrics"];
const METRIC: &[u8] = b"Metric";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16_LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16_BE_BOM: &[u8] = b"\xFE\xFF";

/// Extract every file in order, keeping failures alongside the records
pub fn extract_reports(paths: &[PathBuf]) -> Extraction {
    let mut extraction = Extraction::default();

    for path in paths {
        match extract_file(path) {
            Ok(record) => {
                tracing::debug!(
                    file = %path.display(),
                    project = record.project_name(),
                    metrics = record.len() - 1,
                    "extracted metrics"
                );
                extraction.records.push(record);
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::debug!(file = %path.display(), %reason, "skipping result file");
                extraction.failures.push(FileFailure {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    extraction
}

/// Read one result file and extract its record
pub fn extract_file(path: &Path) -> Result<MetricRecord> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    parse_metrics_xml(&bytes)
}

/// Where the reader is relative to the first target
enum TargetState {
    Searching,
    /// Inside the target; holds the element depth of the `Target` itself
    Inside(usize),
    Done,
}

/// Extract the record from an in-memory XML document
pub fn parse_metrics_xml(bytes: &[u8]) -> Result<MetricRecord> {
    let document = decode_document(bytes)?;
    let mut reader = Reader::from_reader(document.as_ref());
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut state = TargetState::Searching;
    let mut record: Option<MetricRecord> = None;
    let mut extra_targets = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf).with_context(|| {
            format!("malformed XML at byte {}", reader.buffer_position())
        })?;
        match event {
            Event::Start(tag) | Event::Empty(tag) if stack.is_empty() && seen_root => {
                anyhow::bail!(
                    "multiple root elements (found <{}>)",
                    String::from_utf8_lossy(tag.name().as_ref())
                );
            }
            Event::Start(tag) => {
                seen_root = true;
                visit_element(&tag, &stack, &mut state, &mut record, &mut extra_targets)?;
                stack.push(tag.name().as_ref().to_vec());
                if let TargetState::Inside(0) = state {
                    state = TargetState::Inside(stack.len());
                }
            }
            Event::Empty(tag) => {
                seen_root = true;
                visit_element(&tag, &stack, &mut state, &mut record, &mut extra_targets)?;
                // A self-closing target has no metrics to collect
                if let TargetState::Inside(0) = state {
                    state = TargetState::Done;
                }
            }
            Event::End(tag) => {
                let Some(open) = stack.pop() else {
                    anyhow::bail!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(tag.name().as_ref())
                    );
                };
                if open.as_slice() != tag.name().as_ref() {
                    anyhow::bail!(
                        "mismatched closing tag </{}>, expected </{}>",
                        String::from_utf8_lossy(tag.name().as_ref()),
                        String::from_utf8_lossy(&open)
                    );
                }
                if let TargetState::Inside(depth) = state {
                    if stack.len() < depth {
                        state = TargetState::Done;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        anyhow::bail!(
            "unexpected end of document, <{}> is not closed",
            String::from_utf8_lossy(open)
        );
    }
    if !seen_root {
        anyhow::bail!("document has no root element");
    }
    if extra_targets > 0 {
        tracing::debug!(extra_targets, "ignoring additional Target elements");
    }

    record.context("node CodeMetricsReport/Targets/Target not found")
}

/// UTF-8 bytes of the document, transcoding UTF-16 input marked by a BOM
///
/// Any other encoding is passed through and must be ASCII compatible.
fn decode_document(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return Ok(Cow::Borrowed(rest));
    }
    let (rest, unit): (&[u8], fn([u8; 2]) -> u16) =
        if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
            (rest, u16::from_le_bytes)
        } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
            (rest, u16::from_be_bytes)
        } else {
            return Ok(Cow::Borrowed(bytes));
        };

    if rest.len() % 2 != 0 {
        anyhow::bail!("truncated UTF-16 document");
    }
    let units: Vec<u16> = rest
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).context("invalid UTF-16 document")?;
    Ok(Cow::Owned(text.into_bytes()))
}

/// Handle an opening (or self-closing) element at the position given by `stack`
///
/// Marks entry into the first target with `TargetState::Inside(0)`; the caller
/// fixes up the depth once the element is pushed.
fn visit_element(
    tag: &BytesStart<'_>,
    stack: &[Vec<u8>],
    state: &mut TargetState,
    record: &mut Option<MetricRecord>,
    extra_targets: &mut usize,
) -> Result<()> {
    let name = tag.name();
    let name = name.as_ref();

    if name == TARGET && path_is(stack, &TARGET_PATH) {
        match *state {
            TargetState::Searching => {
                let project_name = attribute_value(tag, b"Name")?.unwrap_or_default();
                *record = Some(MetricRecord::new(project_name));
                *state = TargetState::Inside(0);
            }
            _ => *extra_targets += 1,
        }
        return Ok(());
    }

    if let (TargetState::Inside(depth), Some(record)) = (&*state, record.as_mut()) {
        if name == METRIC && stack.len() >= *depth && path_is(&stack[*depth..], &METRIC_PATH) {
            let metric_name = attribute_value(tag, b"Name")?
                .context("Metric element is missing the Name attribute")?;
            let metric_value = attribute_value(tag, b"Value")?.unwrap_or_default();
            record.insert_metric(metric_name, metric_value)?;
        }
    }

    Ok(())
}

fn path_is(stack: &[Vec<u8>], expected: &[&[u8]]) -> bool {
    stack.len() == expected.len()
        && stack
            .iter()
            .zip(expected)
            .all(|(open, want)| open.as_slice() == *want)
}

/// Unescaped value of the attribute `name`, or None when absent
fn attribute_value(tag: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in tag.attributes() {
        let attr = attr.context("malformed attribute")?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value().with_context(|| {
                format!(
                    "invalid value for attribute {}",
                    String::from_utf8_lossy(name)
                )
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
