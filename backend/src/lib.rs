//! UI-agnostic process reaping library for Linux.
//!
//! Provides functions for listing processes and force-killing them, plus a
//! [`Reaper`] that kills every process whose command line contains all of a
//! set of patterns. Uses `nix` and `procfs` for system interaction.

mod process_kill;
mod process_list;
mod reaper;
mod types;

pub use process_kill::kill_pid;
pub use process_list::list_processes;
pub use reaper::{ReapReport, Reaper};
pub use types::{ProcError, ProcessRecord, ProcessTable, SystemProcessTable};
