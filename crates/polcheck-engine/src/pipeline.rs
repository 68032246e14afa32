//! Batch driver: case detection, encoding, solving and classification.
//!
//! Each scenario moves through `loaded -> case detected -> encoded ->
//! solved -> classified` on its own. Scenario-level failures end in
//! REJECTED, solver failures in ERROR, and neither stops the batch.

use std::fs;
use std::path::{Path, PathBuf};

use polcheck_smt::script::SmtScript;
use polcheck_smt::solver::SolverBackend;
use tracing::{debug, info, warn};

use crate::encoder::Invariant;
use crate::result::{BatchResult, Classification, ScenarioOutcome};
use crate::scenario::ScenarioDocument;

/// Per-run options that do not affect classification.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Also write every encoded script here.
    pub dump_dir: Option<PathBuf>,
}

/// Check every scenario in order.
pub fn run_batch(
    scenarios: &[ScenarioDocument],
    backend: &dyn SolverBackend,
    options: &CheckOptions,
) -> BatchResult {
    run_batch_with(scenarios, backend, options, |_| {})
}

/// Like [`run_batch`], handing each outcome to `on_outcome` as soon as it
/// is classified and before the next scenario starts.
pub fn run_batch_with<F>(
    scenarios: &[ScenarioDocument],
    backend: &dyn SolverBackend,
    options: &CheckOptions,
    mut on_outcome: F,
) -> BatchResult
where
    F: FnMut(&ScenarioOutcome),
{
    info!(
        scenarios = scenarios.len(),
        solver = backend.name(),
        "starting batch"
    );
    let mut outcomes = Vec::with_capacity(scenarios.len());
    for doc in scenarios {
        let outcome = check_scenario(doc, backend, options);
        on_outcome(&outcome);
        outcomes.push(outcome);
    }
    let batch = BatchResult { outcomes };
    let summary = batch.summary();
    info!(
        total = summary.total,
        valid = summary.valid,
        violations = summary.violations,
        rejected = summary.rejected,
        errors = summary.errors,
        "batch finished"
    );
    batch
}

/// Check one scenario. Never fails: every problem becomes a classification.
pub fn check_scenario(
    doc: &ScenarioDocument,
    backend: &dyn SolverBackend,
    options: &CheckOptions,
) -> ScenarioOutcome {
    let name = doc.name();
    let mut outcome = ScenarioOutcome {
        name,
        case: None,
        source: doc.source.clone(),
        index: doc.index,
        classification: Classification::Valid,
    };

    let case = match doc.detect_case() {
        Ok(case) => case,
        Err(e) => {
            debug!(scenario = %outcome.name, error = %e, "rejected at case detection");
            outcome.classification = Classification::Rejected {
                cause: e.to_string(),
            };
            return outcome;
        }
    };
    outcome.case = Some(case);

    let script = match Invariant::from_document(doc, case) {
        Ok(invariant) => invariant.to_script(&outcome.name),
        Err(e) => {
            debug!(scenario = %outcome.name, %case, error = %e, "rejected at encoding");
            outcome.classification = Classification::Rejected {
                cause: e.to_string(),
            };
            return outcome;
        }
    };

    if let Some(dir) = &options.dump_dir {
        dump_script(dir, doc, &outcome.name, &script);
    }

    outcome.classification = match backend.solve(&script) {
        Ok(verdict) if verdict.satisfiable => Classification::Violation {
            model: verdict.model,
        },
        Ok(_) => Classification::Valid,
        Err(e) => {
            debug!(scenario = %outcome.name, %case, error = %e, "solver failed");
            Classification::Error {
                cause: e.to_string(),
            }
        }
    };
    debug!(
        scenario = %outcome.name,
        %case,
        classification = %outcome.classification.kind(),
        "classified"
    );
    outcome
}

/// Dump file name: `<source stem>-<doc index>-<name>.smt2`.
pub fn dump_file_name(doc: &ScenarioDocument, name: &str) -> String {
    let stem = doc
        .source
        .file_stem()
        .map(|s| sanitize_file_component(&s.to_string_lossy()))
        .unwrap_or_else(|| "input".to_string());
    format!("{stem}-{}-{}.smt2", doc.index, sanitize_file_component(name))
}

fn sanitize_file_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn dump_script(dir: &Path, doc: &ScenarioDocument, name: &str, script: &SmtScript) {
    let path = dir.join(dump_file_name(doc, name));
    let written = fs::create_dir_all(dir).and_then(|()| fs::write(&path, script.to_smtlib()));
    match written {
        Ok(()) => debug!(path = %path.display(), "dumped script"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to dump script"),
    }
}
