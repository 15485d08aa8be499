//! Release build and run of the target project through cargo.

use anyhow::{Context, Result};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

pub struct CargoRunner {
    cargo: String,
    project_dir: PathBuf,
}

impl CargoRunner {
    pub fn new(cargo: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            cargo: cargo.into(),
            project_dir: project_dir.into(),
        }
    }

    /// `cargo build --release`, then `cargo run --release` if the build
    /// succeeded. Returns the exit code of the last step that ran.
    pub fn build_and_run(&self) -> Result<i32> {
        let build = self.invoke("build")?;
        if !build.success() {
            tracing::error!(status = %build, "release build failed, not running");
            return Ok(exit_code(build));
        }

        let run = self.invoke("run")?;
        tracing::info!(status = %run, "program exited");
        Ok(exit_code(run))
    }

    fn invoke(&self, subcommand: &str) -> Result<ExitStatus> {
        tracing::info!(
            cargo = %self.cargo,
            dir = %self.project_dir.display(),
            "cargo {} --release",
            subcommand
        );
        Command::new(&self.cargo)
            .args([subcommand, "--release"])
            .current_dir(&self.project_dir)
            .status()
            .with_context(|| {
                format!(
                    "Failed to start `{} {} --release` in {}",
                    self.cargo,
                    subcommand,
                    self.project_dir.display()
                )
            })
    }
}

/// Exit code a shell would report for `status`: the code itself, or
/// 128 + signal number when the child was killed.
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}
