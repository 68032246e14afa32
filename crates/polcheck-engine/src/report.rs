//! Human-readable and JSON batch reports.
//!
//! The text format is scraped by tooling; its status phrases must not change.

use std::io::{self, Write};

use polcheck_smt::backends::smtlib_printer::sanitize_comment;
use serde::Serialize;

use crate::result::{
    BatchResult, BatchSummary, Classification, ClassificationKind, ScenarioOutcome,
};

pub const STATUS_VALID: &str = "VALID (no violation)";
pub const STATUS_VIOLATION: &str = "INVALID: counterexample found";

/// Header line for one scenario. The name is flattened so a scenario can
/// never add lines of its own to the report.
pub fn header_line(outcome: &ScenarioOutcome) -> String {
    format!(
        "--- Checking {} ({}) ---",
        sanitize_comment(&outcome.name),
        outcome.case_label()
    )
}

/// Status line for one scenario.
pub fn status_line(classification: &Classification) -> String {
    match classification {
        Classification::Valid => STATUS_VALID.to_string(),
        Classification::Violation { .. } => STATUS_VIOLATION.to_string(),
        Classification::Rejected { cause } => format!("REJECTED: malformed policy ({cause})"),
        Classification::Error { cause } => format!("ERROR: SMT solver failed ({cause})"),
    }
}

/// Write one scenario block: header, status, model (verbose violations
/// only), blank separator.
pub fn write_outcome_text<W: Write>(
    out: &mut W,
    outcome: &ScenarioOutcome,
    verbose: bool,
) -> io::Result<()> {
    writeln!(out, "{}", header_line(outcome))?;
    writeln!(out, "{}", status_line(&outcome.classification))?;
    if verbose {
        if let Some(model) = outcome.classification.model() {
            writeln!(out, "{model}")?;
        }
    }
    writeln!(out)
}

pub fn write_text<W: Write>(out: &mut W, batch: &BatchResult, verbose: bool) -> io::Result<()> {
    for outcome in &batch.outcomes {
        write_outcome_text(out, outcome, verbose)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonOutcome<'a> {
    name: &'a str,
    case: Option<&'static str>,
    source: String,
    index: usize,
    status: ClassificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    results: Vec<JsonOutcome<'a>>,
    summary: BatchSummary,
    exit_code: i32,
}

/// Render the batch as one JSON document. Models are included only when
/// `verbose`.
pub fn to_json(batch: &BatchResult, verbose: bool) -> serde_json::Value {
    let results = batch
        .outcomes
        .iter()
        .map(|o| JsonOutcome {
            name: &o.name,
            case: o.case.map(|c| c.as_str()),
            source: o.source.display().to_string(),
            index: o.index,
            status: o.classification.kind(),
            cause: o.classification.cause(),
            model: if verbose { o.classification.model() } else { None },
        })
        .collect();
    let report = JsonReport {
        results,
        summary: batch.summary(),
        exit_code: batch.exit_code(),
    };
    serde_json::to_value(report).unwrap_or(serde_json::Value::Null)
}

pub fn write_json<W: Write>(out: &mut W, batch: &BatchResult, verbose: bool) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &to_json(batch, verbose))?;
    writeln!(out)
}
