use anyhow::Result;
use backend::{ProcessTable, ReapReport, Reaper, SystemProcessTable};
use clap::Parser;
use cli::Cli;
use config::Settings;
use runner::CargoRunner;
use std::io::Write;
use std::process::ExitCode;

mod cli;
mod config;
mod env_file;
mod logging;
mod runner;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Env file, reap, build, run. Returns the exit code of the last cargo step.
fn run(cli: &Cli) -> Result<i32> {
    let settings = Settings::resolve(cli)?;

    env_file::load(&settings.env_file)?;
    reap_leftovers(&settings, SystemProcessTable, std::io::stdout().lock());

    CargoRunner::new(&settings.cargo, &settings.project_dir).build_and_run()
}

/// The reap outcome never changes the exit code, so failures end here.
/// Returns the report of the pass, if one ran.
fn reap_leftovers<T: ProcessTable, W: Write>(
    settings: &Settings,
    table: T,
    out: W,
) -> Option<ReapReport> {
    if settings.skip_reap {
        tracing::info!("reaping skipped");
        return None;
    }

    let mut reaper = Reaper::new(table, out);
    match reaper.reap(settings.patterns.as_slice()) {
        Ok(report) => {
            tracing::info!(
                matched = report.matched.len(),
                killed = report.killed.len(),
                failed = report.failed.len(),
                "reaping done"
            );
            Some(report)
        }
        Err(err) => {
            tracing::error!(error = %err, "could not scan processes, nothing killed");
            None
        }
    }
}
