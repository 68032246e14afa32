//! The check command: load, run the batch, report, pick the exit status.

use std::io::Write;
use std::time::Duration;

use miette::{Diagnostic, IntoDiagnostic};

use polcheck_engine::loader::{load_scenarios, LoadError};
use polcheck_engine::pipeline::{run_batch, run_batch_with, CheckOptions};
use polcheck_engine::report;
use polcheck_smt::backends::external::ExternalSolver;

use crate::cli::{parse_output_format, Cli, OutputFormat};

/// Run the whole check and return the process exit status.
pub(crate) fn run_check_command(cli: &Cli) -> miette::Result<i32> {
    let format = parse_output_format(&cli.format);

    if cli.equivalence {
        tracing::warn!("--equivalence is reserved; no cross-model check is performed");
    }

    let scenarios = match load_scenarios(&cli.input) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            eprintln!("{}", load_failure_message(&e));
            if let Some(help) = e.help() {
                eprintln!("  help: {help}");
            }
            return Ok(1);
        }
    };

    let backend = ExternalSolver::new(cli.solver.clone())
        .with_timeout(Duration::from_secs(cli.timeout));
    let options = CheckOptions {
        dump_dir: cli.dump_smt.clone(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let batch = match format {
        OutputFormat::Text => {
            // Each block is flushed as soon as its scenario is classified.
            let mut written: std::io::Result<()> = Ok(());
            let batch = run_batch_with(&scenarios, &backend, &options, |outcome| {
                if written.is_ok() {
                    written = report::write_outcome_text(&mut out, outcome, cli.verbose)
                        .and_then(|()| out.flush());
                }
            });
            written.into_diagnostic()?;
            batch
        }
        OutputFormat::Json => {
            let batch = run_batch(&scenarios, &backend, &options);
            report::write_json(&mut out, &batch, cli.verbose).into_diagnostic()?;
            batch
        }
    };
    out.flush().into_diagnostic()?;

    Ok(batch.exit_code())
}

/// Diagnostic line for a fatal, pre-batch loading failure.
pub(crate) fn load_failure_message(err: &LoadError) -> String {
    match err {
        LoadError::Empty { path } => format!("No scenarios found in {}", path.display()),
        other => format!("REJECTED: malformed input ({other})"),
    }
}
