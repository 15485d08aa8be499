//! Process listing functionality.

use crate::types::{ProcError, ProcessRecord};

/// List all processes with their parent PID and full command line.
///
/// Processes that exit or deny access while the table is being read are
/// skipped, as are kernel threads and zombies, which have no command line.
/// Failing to open `/proc` at all is an error.
pub fn list_processes() -> Result<Vec<ProcessRecord>, ProcError> {
    let mut processes = Vec::new();

    let all_procs = procfs::process::all_processes()?;

    for proc_result in all_procs {
        let Ok(proc) = proc_result else {
            continue;
        };
        let Ok(stat) = proc.stat() else {
            continue;
        };
        let Ok(args) = proc.cmdline() else {
            tracing::trace!(pid = stat.pid, "command line unreadable, skipping");
            continue;
        };
        if args.is_empty() {
            continue;
        }

        processes.push(ProcessRecord {
            pid: stat.pid,
            ppid: stat.ppid,
            command_line: args.join(" "),
        });
    }

    tracing::debug!(count = processes.len(), "scanned process table");
    Ok(processes)
}
