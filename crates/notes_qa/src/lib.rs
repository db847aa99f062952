//! Quality checks for a markdown knowledge base (`notes-qa`).
//!
//! A run walks a content root and applies six independent checks: wikilink resolution, citation
//! consistency against `references.md`, glossary coverage, front-matter completeness, Mermaid
//! diagram types, and `$` delimiter parity. Findings are report content, never hard failures;
//! the process exits non-zero when any check produced an issue.
//!
//! [`docs`] owns the checks and the report, [`runtime`] owns configuration, errors, and logging,
//! and [`cli`] maps command-line flags onto a [`QaConfig`](runtime::config::QaConfig).

pub mod cli;
pub mod docs;
pub mod runtime;

use crate::cli::Cli;
use crate::docs::audit::Auditor;
use crate::runtime::error::QaResult;
use clap::Parser;

/// Run the checks selected by `cli`, print the report, and fail when any issue was found.
pub fn execute(cli: Cli) -> QaResult<()> {
    let config = cli.to_config()?;
    let auditor = Auditor::new(config)?;
    let report = auditor.run(&cli.checks);

    print!("{}", report.render());
    if let Some(output) = &cli.report {
        report.write_json(output)?;
        println!("Wrote audit report: {}", output.display());
    }
    report.fail_if_issues()
}

/// Binary entrypoint: install logging, parse process arguments, and run.
pub fn execute_from_env() -> QaResult<()> {
    runtime::logging::init();
    execute(Cli::parse())
}

/// Converts a run result into a process exit code.
///
/// Every failure, including a run that found issues, maps to exit code `1` after printing the
/// error to stderr.
pub fn exit_code(result: QaResult<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::from(1)
        }
    }
}
