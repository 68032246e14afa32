use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use crate::script::SmtScript;

/// The solver's answer for one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub satisfiable: bool,
    /// Raw model dump; present only when `satisfiable`.
    pub model: Option<String>,
}

impl Verdict {
    pub fn sat(model: impl Into<String>) -> Self {
        Self {
            satisfiable: true,
            model: Some(model.into()),
        }
    }

    pub fn unsat() -> Self {
        Self {
            satisfiable: false,
            model: None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum SolverError {
    #[error("could not launch solver `{command}`: {source}")]
    #[diagnostic(
        code(polcheck::solver::launch),
        help("install z3 or point --solver / POLCHECK_SOLVER at an SMT-LIB2 solver")
    )]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("solver `{command}` exceeded the {}s deadline", .timeout.as_secs_f64())]
    #[diagnostic(code(polcheck::solver::timeout))]
    Timeout { command: String, timeout: Duration },

    #[error("unexpected solver output: {output}")]
    #[diagnostic(code(polcheck::solver::protocol))]
    Protocol { output: String },

    #[error("solver I/O error: {0}")]
    #[diagnostic(code(polcheck::solver::io))]
    Io(#[from] std::io::Error),
}

/// Something that can decide one script.
pub trait SolverBackend {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Decide `script`. Failures are returned, never panicked.
    fn solve(&self, script: &SmtScript) -> Result<Verdict, SolverError>;
}

/// Interpret raw solver output.
///
/// The first non-empty stdout line is the verdict token. Anything after a
/// `sat` token is the model.
pub fn parse_verdict(stdout: &str, stderr: &str) -> Result<Verdict, SolverError> {
    let mut lines = stdout.trim().lines();
    let token = match lines.next() {
        Some(line) => line.trim(),
        None => {
            return Err(SolverError::Protocol {
                output: format!("solver returned no output; stderr: {}", stderr.trim()),
            })
        }
    };
    match token {
        "sat" => {
            let model: Vec<&str> = lines.collect();
            Ok(Verdict::sat(model.join("\n")))
        }
        "unsat" => Ok(Verdict::unsat()),
        _ => Err(SolverError::Protocol {
            output: format!("`{token}`\nfull output:\n{}", stdout.trim_end()),
        }),
    }
}
