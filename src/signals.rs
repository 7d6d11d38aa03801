//! Signal handling for minishell
//!
//! The shell catches three signals for its whole lifetime:
//! - SIGCHLD: a child changed state; the handler only raises a flag and the main loop
//!   drains `waitpid` at its next safe point
//! - SIGINT (Ctrl+C): relayed to the foreground job as SIGTERM
//! - SIGTSTP (Ctrl+Z): relayed to the foreground job as SIGSTOP
//!
//! Children block SIGINT and SIGTSTP before `exec`, so only the shell sees the terminal
//! keys. Handlers touch nothing but atomics, `kill(2)` and `write(2)`.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix::sys::signal::{kill, sigprocmask, SigSet, SigmaskHow, Signal};
use nix::unistd::Pid;

use crate::error::{FatalOp, OrFatal, ShellError};

/// Bytes written when a terminal signal arrives with nothing in the foreground
pub const PROMPT_REDRAW: &[u8] = b"\n>>> ";

/// PID the terminal signals are relayed to (or -1 if none).
///
/// Mirror of the foreground marker, kept in sync by the job-control state.
pub static FOREGROUND_PID: AtomicI32 = AtomicI32::new(-1);

/// Flag indicating SIGCHLD was received (set by signal handler)
pub static SIGCHLD_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install the SIGCHLD, SIGINT and SIGTSTP handlers
pub fn setup_signal_handlers() -> Result<(), ShellError> {
    use signal_hook::consts::{SIGCHLD, SIGINT, SIGTSTP};
    use signal_hook::low_level;

    // SAFETY: every closure below only performs async-signal-safe operations.
    unsafe {
        low_level::register(SIGCHLD, || {
            SIGCHLD_RECEIVED.store(true, Ordering::SeqCst);
        })
        .map_err(io_to_fatal)?;

        low_level::register(SIGINT, || on_terminal_signal(SIGINT)).map_err(io_to_fatal)?;

        low_level::register(SIGTSTP, || on_terminal_signal(SIGTSTP)).map_err(io_to_fatal)?;
    }

    log::debug!("signal handlers installed");
    Ok(())
}

fn io_to_fatal(e: std::io::Error) -> ShellError {
    let errno = nix::errno::Errno::from_i32(e.raw_os_error().unwrap_or(libc::EINVAL));
    ShellError::fatal(FatalOp::SigAction, errno)
}

/// What a terminal signal turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayAction {
    /// Send the relayed signal to the foreground pid
    Forward(libc::pid_t, libc::c_int),
    /// Nothing in the foreground: newline and prompt again
    RedrawPrompt,
}

/// Map a received SIGINT/SIGTSTP and the current relay target to an action.
///
/// Ctrl+C becomes SIGTERM, Ctrl+Z becomes SIGSTOP. A target `<= 0` means none.
pub fn relay_action(received: libc::c_int, foreground: libc::pid_t) -> RelayAction {
    if foreground <= 0 {
        return RelayAction::RedrawPrompt;
    }
    let relayed = if received == libc::SIGTSTP {
        libc::SIGSTOP
    } else {
        libc::SIGTERM
    };
    RelayAction::Forward(foreground, relayed)
}

/// Handler body for the terminal signals
fn on_terminal_signal(received: libc::c_int) {
    match relay_action(received, FOREGROUND_PID.load(Ordering::SeqCst)) {
        RelayAction::Forward(pid, relayed) => unsafe {
            libc::kill(pid, relayed);
        },
        RelayAction::RedrawPrompt => unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                PROMPT_REDRAW.as_ptr() as *const libc::c_void,
                PROMPT_REDRAW.len(),
            );
        },
    }
}

/// Set the PID terminal signals are relayed to
pub fn set_foreground_pid(pid: Pid) {
    FOREGROUND_PID.store(pid.as_raw(), Ordering::SeqCst);
}

/// Clear the relay target
pub fn clear_foreground_pid() {
    FOREGROUND_PID.store(-1, Ordering::SeqCst);
}

/// Check if SIGCHLD was received and clear the flag
pub fn take_sigchld() -> bool {
    SIGCHLD_RECEIVED.swap(false, Ordering::SeqCst)
}

/// Block the terminal signals for the calling process.
///
/// Called in a forked child before `exec`; the mask survives the image replacement.
pub fn block_terminal_signals() -> Result<(), ShellError> {
    let mut set = SigSet::empty();
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTSTP);
    sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), None).or_fatal(FatalOp::SigMask)
}

/// Send SIGSTOP to a process
pub fn stop_process(pid: Pid) -> Result<(), String> {
    kill(pid, Signal::SIGSTOP).map_err(|e| format!("Failed to stop process {}: {}", pid, e))
}

/// Send SIGCONT to a process
pub fn continue_process(pid: Pid) -> Result<(), String> {
    kill(pid, Signal::SIGCONT).map_err(|e| format!("Failed to continue process {}: {}", pid, e))
}

/// Stop the shell process itself
pub fn suspend_self() -> Result<(), String> {
    nix::sys::signal::raise(Signal::SIGSTOP).map_err(|e| format!("Failed to suspend shell: {}", e))
}
