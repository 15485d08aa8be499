//! Command-line arguments. Every flag is optional.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(
    name = "reaprun",
    version,
    about = "Kill leftover processes matching a pattern, then build and run a project in release mode"
)]
pub struct Cli {
    /// Substring a command line must contain to be killed. Repeat to require several.
    #[arg(short, long = "pattern", env = "REAPRUN_PATTERNS", value_delimiter = ',')]
    pub patterns: Vec<String>,

    /// Directory of the project to build and run.
    #[arg(long, env = "REAPRUN_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Env file loaded before building. Defaults to `.env` in the project directory.
    #[arg(long, env = "REAPRUN_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Config file. Defaults to `reaprun.toml` in the working directory, if present.
    #[arg(short, long, env = "REAPRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Go straight to the build without killing anything.
    #[arg(long)]
    pub skip_reap: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
