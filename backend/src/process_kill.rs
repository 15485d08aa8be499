//! Process killing functionality.

use crate::types::ProcError;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Kill a process by PID with SIGKILL.
/// No grace period: the process gets no chance to clean up.
pub fn kill_pid(pid: i32) -> Result<(), ProcError> {
    signal::kill(Pid::from_raw(pid), Signal::SIGKILL).map_err(|errno| match errno {
        Errno::ESRCH => ProcError::NotFound(pid),
        Errno::EPERM => ProcError::PermissionDenied(pid),
        other => ProcError::SignalError(pid, other.desc().to_string()),
    })
}
