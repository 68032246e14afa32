use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::scenario::CaseTag;

/// Final state of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// UNSAT: the invariant holds.
    Valid,
    /// SAT: the solver found a counterexample.
    Violation { model: Option<String> },
    /// The scenario itself is malformed.
    Rejected { cause: String },
    /// The solver misbehaved (no verdict, timeout, launch failure).
    Error { cause: String },
}

impl Classification {
    pub fn kind(&self) -> ClassificationKind {
        match self {
            Classification::Valid => ClassificationKind::Valid,
            Classification::Violation { .. } => ClassificationKind::Violation,
            Classification::Rejected { .. } => ClassificationKind::Rejected,
            Classification::Error { .. } => ClassificationKind::Error,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Classification::Valid)
    }

    pub fn cause(&self) -> Option<&str> {
        match self {
            Classification::Rejected { cause } | Classification::Error { cause } => Some(cause),
            _ => None,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Classification::Violation { model } => model.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClassificationKind {
    #[serde(rename = "VALID")]
    Valid,
    #[serde(rename = "VIOLATION")]
    Violation,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(rename = "ERROR")]
    Error,
}

impl ClassificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationKind::Valid => "VALID",
            ClassificationKind::Violation => "VIOLATION",
            ClassificationKind::Rejected => "REJECTED",
            ClassificationKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: String,
    /// `None` when the case tag could not be determined.
    pub case: Option<CaseTag>,
    pub source: PathBuf,
    pub index: usize,
    pub classification: Classification,
}

impl ScenarioOutcome {
    pub fn case_label(&self) -> &'static str {
        self.case.map_or("unknown", CaseTag::as_str)
    }
}

/// Per-classification counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub violations: usize,
    pub rejected: usize,
    pub errors: usize,
}

/// All outcomes of one run, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl BatchResult {
    /// True only if every scenario is VALID. Vacuously true when empty,
    /// but an empty batch never reaches this point: loading fails first.
    pub fn all_valid(&self) -> bool {
        self.outcomes.iter().all(|o| o.classification.is_valid())
    }

    /// Process exit status: 0 iff every scenario is VALID.
    pub fn exit_code(&self) -> i32 {
        if !self.outcomes.is_empty() && self.all_valid() {
            0
        } else {
            1
        }
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.outcomes.len(),
            ..BatchSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.classification.kind() {
                ClassificationKind::Valid => summary.valid += 1,
                ClassificationKind::Violation => summary.violations += 1,
                ClassificationKind::Rejected => summary.rejected += 1,
                ClassificationKind::Error => summary.errors += 1,
            }
        }
        summary
    }
}
