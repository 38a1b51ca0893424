//! Command-line token parsing
//!
//! Arguments arrive as `/key:value` tokens. The key keeps its leading `/`
//! and is matched case-sensitively; the value is everything after the first
//! `:` so Windows paths (`C:\temp\report.html`) survive intact.

use anyhow::Result;
use indexmap::IndexMap;

pub const ARG_HELP: &str = "/?";
pub const ARG_THRESHOLD: &str = "/threshold";
pub const ARG_RESULT_DIR: &str = "/metricResultDir";
pub const ARG_RESULT_PATTERN: &str = "/metricResultPattern";
pub const ARG_HTML_REPORT: &str = "/htmlReport";
pub const ARG_TITLE: &str = "/title";
pub const ARG_CONFIG: &str = "/config";

const KNOWN_KEYS: &[&str] = &[
    ARG_THRESHOLD,
    ARG_RESULT_DIR,
    ARG_RESULT_PATTERN,
    ARG_HTML_REPORT,
    ARG_TITLE,
    ARG_CONFIG,
];

pub const HELP_TEXT: &str = r"Code metrics reporter for Visual Studio metrics.exe results

Example: metricreport /metricResultDir:C:\metrics /metricResultPattern:*_metrics.xml /htmlReport:C:\temp\finalReport.html /threshold:80

Notes:
- Every file under /metricResultDir whose name matches /metricResultPattern is parsed (the directory is not searched recursively).
- Assembly level metrics of all parsed results are aggregated into one HTML table.
- A project whose MaintainabilityIndex is below the threshold is marked with a red background.

Arguments:
/threshold:<number>          Threshold for the MaintainabilityIndex metric. Optional, defaults to 80.
/metricResultDir:<path>      Directory holding the code metric results.
/metricResultPattern:<glob>  File name pattern of the metrics.exe results.
/htmlReport:<path>           HTML report file to write (overwritten if present).
/title:<text>                Report heading. Optional, defaults to 'Code Metrics Report'.
/config:<path>               JSON config file supplying defaults for the arguments above.
                             Optional; .metricreportrc.json in the working directory is used when present.";

/// Parsed `/key:value` pairs in the order given
pub type ArgMap = IndexMap<String, String>;

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run(ArgMap),
}

/// Message printed whenever the arguments cannot be turned into a configuration
pub fn usage_message() -> String {
    format!(
        "Invalid arguments. The following arguments are required: {}, {} and {}. Use {} for details.",
        ARG_HTML_REPORT, ARG_RESULT_DIR, ARG_RESULT_PATTERN, ARG_HELP
    )
}

/// Split the raw argument list into an [`Invocation`]
///
/// `/?` only means help when it is the sole argument. A token without `:`
/// or a key given twice is an error.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Invocation> {
    if let [only] = args {
        if only.as_ref() == ARG_HELP {
            return Ok(Invocation::Help);
        }
    }

    let mut map = ArgMap::new();
    for arg in args {
        let arg = arg.as_ref();
        let Some((key, value)) = arg.split_once(':') else {
            anyhow::bail!("argument is not in /key:value form: {}", arg);
        };
        if map.contains_key(key) {
            anyhow::bail!("argument given more than once: {}", key);
        }
        if !KNOWN_KEYS.contains(&key) {
            tracing::debug!(key, "ignoring unrecognized argument");
        }
        map.insert(key.to_string(), value.to_string());
    }

    Ok(Invocation::Run(map))
}
