//! Error taxonomy for minishell
//!
//! Two tiers:
//! - **Fatal**: a core OS primitive failed. The shell (or the forked child that hit it)
//!   prints a diagnostic and terminates with the exit code of the failing category.
//! - **Recoverable**: malformed command lines and unknown job ids. These are reported
//!   and the main loop keeps going. Failed writes to the terminal land here too.

use crate::parser::ParseError;
use nix::errno::Errno;
use std::fmt;
use thiserror::Error;

/// The OS primitive whose failure is fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalOp {
    Wait,
    Fork,
    Exec,
    SigAction,
    Open,
    Dup2,
    Close,
    Pipe,
    SigMask,
    Chdir,
}

impl FatalOp {
    /// Process exit code for this failure category
    pub fn exit_code(self) -> i32 {
        match self {
            FatalOp::Wait => 1,
            FatalOp::Fork => 2,
            FatalOp::Exec => 3,
            FatalOp::SigAction => 4,
            FatalOp::Open => 5,
            FatalOp::Dup2 => 6,
            FatalOp::Close => 7,
            FatalOp::Pipe => 8,
            FatalOp::SigMask => 9,
            FatalOp::Chdir => 10,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FatalOp::Wait => "waitpid",
            FatalOp::Fork => "fork",
            FatalOp::Exec => "execvp",
            FatalOp::SigAction => "sigaction",
            FatalOp::Open => "open",
            FatalOp::Dup2 => "dup2",
            FatalOp::Close => "close",
            FatalOp::Pipe => "pipe",
            FatalOp::SigMask => "sigprocmask",
            FatalOp::Chdir => "chdir",
        }
    }
}

impl fmt::Display for FatalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{op}: {source}")]
    Fatal {
        op: FatalOp,
        #[source]
        source: Errno,
    },
    #[error("--- Erreur de structure de la commande : {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    pub fn fatal(op: FatalOp, source: Errno) -> Self {
        ShellError::Fatal { op, source }
    }

    /// Whether the shell must terminate on this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Fatal { .. })
    }

    /// Exit code for fatal errors, `None` for recoverable ones
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ShellError::Fatal { op, .. } => Some(op.exit_code()),
            ShellError::Parse(_) | ShellError::Io(_) => None,
        }
    }
}

/// Attach a fatal category to a nix result
pub(crate) trait OrFatal<T> {
    fn or_fatal(self, op: FatalOp) -> Result<T, ShellError>;
}

impl<T> OrFatal<T> for nix::Result<T> {
    fn or_fatal(self, op: FatalOp) -> Result<T, ShellError> {
        self.map_err(|e| ShellError::fatal(op, e))
    }
}

/// Print the diagnostic for a fatal error and terminate the current process.
///
/// Used both by the shell itself and by forked children before `exec`.
pub fn die(err: &ShellError) -> ! {
    eprintln!("minishell: {}", err);
    std::process::exit(err.exit_code().unwrap_or(1))
}
