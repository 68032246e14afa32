//! CLI argument definitions.

use clap::Parser;
use std::path::PathBuf;

use polcheck_smt::backends::external::DEFAULT_SOLVER_COMMAND;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Prove or refute authorization-policy invariants with an SMT solver.\n\n\
    Each scenario document names a case (registry, wildcard, tenant) and the\n\
    literal values to check. polcheck encodes a search for a violation; the\n\
    solver answering `unsat` proves the invariant for that scenario.\n\n\
    Exit status is 0 only when every scenario is VALID.";

#[derive(Parser, Debug)]
#[command(name = "polcheck")]
#[command(about = "Prove authorization-policy invariants for test scenarios with an SMT solver")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    /// Scenario YAML file, or a directory of *.yaml / *.yml files
    #[arg(long, short = 'i')]
    pub(crate) input: PathBuf,

    /// Reserved for a cross-model equivalence check (currently no effect)
    #[arg(long, default_value_t = false)]
    pub(crate) equivalence: bool,

    /// Print the solver model for scenarios with a violation
    #[arg(long, short = 'v', default_value_t = false)]
    pub(crate) verbose: bool,

    /// SMT-LIB2 solver executable, invoked as `<solver> -smt2 <file>`
    #[arg(long, env = "POLCHECK_SOLVER", default_value = DEFAULT_SOLVER_COMMAND)]
    pub(crate) solver: String,

    /// Per-scenario solver wall-clock timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout: u64,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub(crate) format: String,

    /// Also write every generated SMT-LIB2 script into this directory
    #[arg(long)]
    pub(crate) dump_smt: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn parse_output_format(raw: &str) -> OutputFormat {
    match raw {
        "text" => OutputFormat::Text,
        "json" => OutputFormat::Json,
        other => {
            eprintln!("Unknown output format: {other}. Use 'text' or 'json'.");
            std::process::exit(1);
        }
    }
}
