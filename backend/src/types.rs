//! Data types, the process-table seam and error definitions.

use thiserror::Error;

/// A process as seen by one scan of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: i32,
    pub ppid: i32,
    pub command_line: String,
}

impl ProcessRecord {
    pub fn new(pid: i32, ppid: i32, command_line: impl Into<String>) -> Self {
        Self {
            pid,
            ppid,
            command_line: command_line.into(),
        }
    }

    /// True when the command line contains every pattern.
    pub fn matches_all<S: AsRef<str>>(&self, patterns: &[S]) -> bool {
        patterns
            .iter()
            .all(|pattern| self.command_line.contains(pattern.as_ref()))
    }
}

/// Errors that can occur during process management.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcError {
    #[error("Failed to read the process table: {0}")]
    Enumeration(String),
    #[error("Permission denied for PID {0}")]
    PermissionDenied(i32),
    #[error("Process {0} not found")]
    NotFound(i32),
    #[error("Failed to send signal to PID {0}: {1}")]
    SignalError(i32, String),
}

impl From<procfs::ProcError> for ProcError {
    fn from(err: procfs::ProcError) -> Self {
        ProcError::Enumeration(format!("Failed to read /proc: {}", err))
    }
}

/// Access to the host's live process table.
pub trait ProcessTable {
    /// Snapshot of every process currently running.
    fn list_processes(&self) -> Result<Vec<ProcessRecord>, ProcError>;

    /// Forcefully terminate `pid`.
    fn signal_kill(&self, pid: i32) -> Result<(), ProcError>;

    /// PID of the calling process.
    fn current_pid(&self) -> i32;
}

/// [`ProcessTable`] backed by `/proc` and real signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl ProcessTable for SystemProcessTable {
    fn list_processes(&self) -> Result<Vec<ProcessRecord>, ProcError> {
        crate::process_list::list_processes()
    }

    fn signal_kill(&self, pid: i32) -> Result<(), ProcError> {
        crate::process_kill::kill_pid(pid)
    }

    fn current_pid(&self) -> i32 {
        std::process::id() as i32
    }
}
