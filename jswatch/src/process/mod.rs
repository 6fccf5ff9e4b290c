//! Signals for child processes
//!
//! The watch process outlives anything that only closes its pipes, so it has
//! to be terminated by PID. These helpers wrap the `nix` calls for that.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

fn to_pid(pid: u32) -> Option<Pid> {
    // PIDs above i32::MAX cannot exist
    i32::try_from(pid).ok().map(Pid::from_raw)
}

/// Check if a process with the given PID is alive
///
/// Sends the null signal: `EPERM` still means the process exists, `ESRCH`
/// means it does not.
pub fn is_process_alive(pid: u32) -> bool {
    let Some(pid) = to_pid(pid) else {
        return false;
    };

    match kill(pid, None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Ask a process to exit with SIGTERM.
///
/// Returns `false` when the signal could not be delivered, e.g. because the
/// process is already gone.
pub fn terminate(pid: u32) -> bool {
    match to_pid(pid) {
        Some(pid) => kill(pid, Signal::SIGTERM).is_ok(),
        None => false,
    }
}
