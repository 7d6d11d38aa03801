//! Built-in commands
//!
//! Verbs handled inside the shell process without forking. The job-control ones
//! (`lj`, `sj`, `bg`, `fg`, `susp`) work purely through the job registry and raw
//! signal delivery.

use std::env;
use std::io::Write;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::unistd::chdir;

use crate::error::{FatalOp, OrFatal, ShellError};
use crate::jobs::{JobId, JobStatus};
use crate::relay::JobControl;
use crate::signals;

/// What the main loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Run `argv` as a built-in if its verb is one. `None` means "not a built-in".
pub fn try_builtin<W: Write>(
    jobs: &mut JobControl,
    argv: &[String],
    out: &mut W,
) -> Option<Result<Flow, ShellError>> {
    let (verb, args) = argv.split_first()?;
    let result = match verb.as_str() {
        "exit" => Ok(Flow::Exit),
        "cd" => builtin_cd(args),
        "lj" => builtin_lj(jobs, out),
        "sj" => builtin_sj(jobs, args, out),
        "bg" => builtin_bg(jobs, args, out),
        "fg" => builtin_fg(jobs, args, out),
        "susp" => builtin_susp(),
        _ => return None,
    };
    Some(result)
}

pub(crate) fn builtin_cd(args: &[String]) -> Result<Flow, ShellError> {
    let dir = match args.first() {
        Some(path) => PathBuf::from(path),
        None => env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| ShellError::fatal(FatalOp::Chdir, Errno::ENOENT))?,
    };

    chdir(dir.as_path()).or_fatal(FatalOp::Chdir)?;
    log::debug!("cwd -> {}", dir.display());
    Ok(Flow::Continue)
}

pub(crate) fn builtin_lj<W: Write>(jobs: &JobControl, out: &mut W) -> Result<Flow, ShellError> {
    for job in jobs.registry().list() {
        writeln!(out, "{}", job)?;
    }
    Ok(Flow::Continue)
}

pub(crate) fn builtin_sj<W: Write>(
    jobs: &mut JobControl,
    args: &[String],
    out: &mut W,
) -> Result<Flow, ShellError> {
    let Some(id) = resolve_job("sj", jobs, args, out)? else {
        return Ok(Flow::Continue);
    };
    if let Some(pid) = jobs.registry().find_handle(id) {
        if let Err(e) = signals::stop_process(pid) {
            eprintln!("sj: {}", e);
        }
    }
    Ok(Flow::Continue)
}

pub(crate) fn builtin_bg<W: Write>(
    jobs: &mut JobControl,
    args: &[String],
    out: &mut W,
) -> Result<Flow, ShellError> {
    let Some(id) = resolve_job("bg", jobs, args, out)? else {
        return Ok(Flow::Continue);
    };
    if let Some(pid) = jobs.registry().find_handle(id) {
        if let Err(e) = signals::continue_process(pid) {
            eprintln!("bg: {}", e);
        }
    }
    Ok(Flow::Continue)
}

pub(crate) fn builtin_fg<W: Write>(
    jobs: &mut JobControl,
    args: &[String],
    out: &mut W,
) -> Result<Flow, ShellError> {
    let Some(id) = resolve_job("fg", jobs, args, out)? else {
        return Ok(Flow::Continue);
    };
    let Some(pid) = jobs.registry().find_handle(id) else {
        return Ok(Flow::Continue);
    };

    if let Err(e) = signals::continue_process(pid) {
        eprintln!("fg: {}", e);
    }
    jobs.set_status(id, JobStatus::Active);

    // Same foreground wait as a freshly launched stage
    jobs.set_foreground(id);
    let waited = jobs.wait_foreground(pid);
    jobs.clear_foreground();
    waited?;
    Ok(Flow::Continue)
}

pub(crate) fn builtin_susp() -> Result<Flow, ShellError> {
    if let Err(e) = signals::suspend_self() {
        eprintln!("susp: {}", e);
    }
    Ok(Flow::Continue)
}

/// Parse the id argument of `sj`/`bg`/`fg` and check it is registered.
///
/// Prints the usage or not-found message and returns `None` when there is nothing to do.
fn resolve_job<W: Write>(
    verb: &str,
    jobs: &JobControl,
    args: &[String],
    out: &mut W,
) -> Result<Option<JobId>, ShellError> {
    let Some(raw) = args.first() else {
        writeln!(out, "{}: usage: {} <id>", verb, verb)?;
        return Ok(None);
    };

    match raw.parse::<JobId>() {
        Ok(id) if jobs.registry().find_handle(id).is_some() => Ok(Some(id)),
        _ => {
            writeln!(out, "{}: {}: ce processus n'existe pas", verb, raw)?;
            Ok(None)
        }
    }
}
