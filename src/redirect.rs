//! File redirection for a pipeline stage
//!
//! Runs only inside a freshly forked child, right before `exec`. Every failure is fatal
//! to that child.

use std::os::unix::io::RawFd;
use std::path::Path;

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

use crate::error::{FatalOp, OrFatal, ShellError};

const STDIN_FILENO: RawFd = 0;
const STDOUT_FILENO: RawFd = 1;

/// Point stdin at `input` and/or stdout at `output`
pub fn apply(input: Option<&Path>, output: Option<&Path>) -> Result<(), ShellError> {
    if let Some(path) = input {
        let fd = open(path, OFlag::O_RDONLY, Mode::empty()).or_fatal(FatalOp::Open)?;
        replace_stream(fd, STDIN_FILENO)?;
    }

    if let Some(path) = output {
        let fd = open(
            path,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::from_bits_truncate(0o644),
        )
        .or_fatal(FatalOp::Open)?;
        replace_stream(fd, STDOUT_FILENO)?;
    }

    Ok(())
}

/// Duplicate `fd` onto `target` and release the original descriptor
pub(crate) fn replace_stream(fd: RawFd, target: RawFd) -> Result<(), ShellError> {
    if fd == target {
        return Ok(());
    }
    dup2(fd, target).or_fatal(FatalOp::Dup2)?;
    close(fd).or_fatal(FatalOp::Close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_input_is_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = apply(Some(&missing), None).unwrap_err();
        assert_eq!(err.exit_code(), Some(FatalOp::Open.exit_code()));
    }

    #[test]
    fn output_directory_is_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Opening a directory for writing fails with EISDIR
        let err = apply(None, Some(dir.path())).unwrap_err();
        assert_eq!(err.exit_code(), Some(FatalOp::Open.exit_code()));
        assert!(fs::metadata(dir.path()).unwrap().is_dir());
    }

    #[test]
    fn no_paths_is_noop() {
        assert!(apply(None, None).is_ok());
    }
}
