//! Foreground process launcher with Unix terminal job control.
//!
//! A launched child is placed in its own process group and handed the
//! controlling terminal for its lifetime. The shell itself is a background
//! process during that window, so the job-control stop signals must be
//! ignored until the terminal is reclaimed; otherwise the kernel would
//! suspend the shell the moment it touches the terminal again.
//!
//! Signal disposition is process-global state, so launches are serialized:
//! at most one foreground handoff may be in flight per shell process.

use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, ExitStatus};
use std::sync::Mutex;

use log::{debug, warn};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, Pid};
use once_cell::sync::Lazy;

static LAUNCH_LOCK: Lazy<Mutex<()>> = Lazy::new(Mutex::default);

/// Tests that launch children or assert on signal dispositions must not
/// overlap; they hold this lock for their whole body, not just for the
/// launch itself.
#[cfg(test)]
pub(crate) static TEST_SERIAL: Mutex<()> = Mutex::new(());

const JOB_CONTROL_SIGNALS: [Signal; 3] = [Signal::SIGTTOU, Signal::SIGTTIN, Signal::SIGTSTP];

/// Runs `command` as the foreground job of the controlling terminal and
/// blocks until it exits.
///
/// The child starts in a fresh process group and receives the terminal
/// via `tcsetpgrp`; the handoff is reverted to the shell's own process
/// group on every exit path after a successful start. A failed handoff
/// is degraded mode, not an error: the child still runs, it just does
/// not own the keyboard. A start failure returns immediately and no
/// terminal restoration takes place because none is needed.
///
/// A normal exit maps to the child's exit code; death by signal maps to
/// `128 + signo`.
pub fn launch_foreground(command: &mut Command) -> io::Result<i32> {
    let _serial = LAUNCH_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let shell_pgid = unistd::getpgrp();
    // The child leads its own group so the terminal can be handed to
    // exactly its job, not to the shell's whole group.
    command.process_group(0);

    let _signals = TtySignalGuard::install()?;
    let mut child = command.spawn()?;
    let _foreground = ForegroundGrant::grant(Pid::from_raw(child.id() as i32), shell_pgid);
    let status = child.wait()?;
    debug!("child {} finished: {status}", child.id());
    Ok(exit_code(status))
}

fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

/// Ignores SIGTTOU/SIGTTIN/SIGTSTP for the shell, restoring the saved
/// dispositions on drop. Held across the whole handoff window.
struct TtySignalGuard {
    saved: Vec<(Signal, SigHandler)>,
}

impl TtySignalGuard {
    fn install() -> io::Result<Self> {
        let mut guard = Self { saved: Vec::new() };
        for sig in JOB_CONTROL_SIGNALS {
            // Safety: SigIgn installs no handler function.
            match unsafe { signal::signal(sig, SigHandler::SigIgn) } {
                Ok(previous) => guard.saved.push((sig, previous)),
                // Dropping the partial guard puts back what was already set.
                Err(errno) => return Err(io::Error::from(errno)),
            }
        }
        Ok(guard)
    }
}

impl Drop for TtySignalGuard {
    fn drop(&mut self) {
        for (sig, previous) in self.saved.drain(..) {
            // Safety: restoring a disposition previously returned by signal().
            if let Err(errno) = unsafe { signal::signal(sig, previous) } {
                warn!("failed to restore {sig} disposition: {errno}");
            }
        }
    }
}

/// Hands the terminal's foreground slot to the child's process group and
/// gives it back to the shell on drop, regardless of how the wait ended.
struct ForegroundGrant {
    shell_pgid: Pid,
}

impl ForegroundGrant {
    fn grant(child_pgid: Pid, shell_pgid: Pid) -> Self {
        match unistd::tcsetpgrp(io::stdin(), child_pgid) {
            Ok(()) => debug!("terminal foreground handed to pgid {child_pgid}"),
            Err(errno) => warn!("failed to set foreground process group: {errno}"),
        }
        Self { shell_pgid }
    }
}

impl Drop for ForegroundGrant {
    fn drop(&mut self) {
        if let Err(errno) = unistd::tcsetpgrp(io::stdin(), self.shell_pgid) {
            warn!("failed to restore foreground process group: {errno}");
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    }

    #[test]
    fn test_normal_exit_code() {
        let _serial = TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(launch_foreground(&mut sh("exit 0")).unwrap(), 0);
        assert_eq!(launch_foreground(&mut sh("exit 7")).unwrap(), 7);
    }

    #[test]
    fn test_signal_death_maps_to_128_plus_signo() {
        let _serial = TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let code = launch_foreground(&mut sh("kill -KILL $$")).unwrap();
        assert_eq!(code, 128 + Signal::SIGKILL as i32);
    }

    #[test]
    fn test_start_failure_returns_the_error() {
        let _serial = TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let mut command = Command::new("/nonexistent/embsh-test-binary");
        let err = launch_foreground(&mut command).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_varied_exits_leave_dispositions_restored() {
        let _serial = TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        for sig in JOB_CONTROL_SIGNALS {
            unsafe { signal::signal(sig, SigHandler::SigDfl) }.unwrap();
        }

        assert_eq!(launch_foreground(&mut sh("exit 5")).unwrap(), 5);
        assert_eq!(
            launch_foreground(&mut sh("kill -TERM $$")).unwrap(),
            128 + Signal::SIGTERM as i32
        );

        for sig in JOB_CONTROL_SIGNALS {
            let current = unsafe { signal::signal(sig, SigHandler::SigDfl) }.unwrap();
            assert_eq!(current, SigHandler::SigDfl, "{sig} was not restored");
        }
    }

    #[test]
    fn test_signal_dispositions_are_restored() {
        let _serial = TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        for sig in JOB_CONTROL_SIGNALS {
            unsafe { signal::signal(sig, SigHandler::SigDfl) }.unwrap();
        }

        launch_foreground(&mut sh("exit 0")).unwrap();

        for sig in JOB_CONTROL_SIGNALS {
            let current = unsafe { signal::signal(sig, SigHandler::SigDfl) }.unwrap();
            assert_eq!(current, SigHandler::SigDfl, "{sig} was not restored");
        }
    }

    #[test]
    fn test_restoration_after_start_failure_too() {
        let _serial = TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        for sig in JOB_CONTROL_SIGNALS {
            unsafe { signal::signal(sig, SigHandler::SigDfl) }.unwrap();
        }

        let mut command = Command::new("/nonexistent/embsh-test-binary");
        assert!(launch_foreground(&mut command).is_err());

        for sig in JOB_CONTROL_SIGNALS {
            let current = unsafe { signal::signal(sig, SigHandler::SigDfl) }.unwrap();
            assert_eq!(current, SigHandler::SigDfl, "{sig} was not restored");
        }
    }
}
