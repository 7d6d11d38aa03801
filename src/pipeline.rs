//! Pipeline orchestrator
//!
//! Forks one process per stage of a command line and chains them with pipes.
//!
//! ```text
//! cat f1 f2 | grep int | wc -l
//!
//!   minishell
//!   |___________________
//!   |        |         |
//!   cat o==o grep o==o wc
//! ```
//!
//! Stages are launched strictly one after another: for a foreground line the shell
//! waits for stage N to exit or stop before forking stage N+1. Intermediate output
//! therefore has to fit in the pipe buffer.

use std::convert::Infallible;
use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::unistd::{close, execvp, fork, pipe, ForkResult, Pid};

use crate::error::{die, FatalOp, OrFatal, ShellError};
use crate::parser::{CommandLine, ParseError};
use crate::redirect;
use crate::relay::JobControl;
use crate::signals;

const STDIN_FILENO: RawFd = 0;
const STDOUT_FILENO: RawFd = 1;

/// Read and write ends of a pipe
type PipeFds = (RawFd, RawFd);

/// Position of a stage inside its pipeline
#[derive(Debug, Clone, Copy)]
struct StagePosition {
    first: bool,
    last: bool,
}

/// Launch every stage of `line`, registering each process with `jobs`
pub fn launch(jobs: &mut JobControl, line: &CommandLine) -> Result<(), ShellError> {
    if line.stages.iter().any(Vec::is_empty) {
        return Err(ParseError::EmptyStage.into());
    }
    let Some(program) = line.program() else {
        return Ok(());
    };
    let program = program.to_string();
    let count = line.stages.len();
    let mut prev: Option<PipeFds> = None;

    for (index, argv) in line.stages.iter().enumerate() {
        let position = StagePosition {
            first: index == 0,
            last: index + 1 == count,
        };

        let next = if position.last {
            None
        } else {
            Some(pipe().or_fatal(FatalOp::Pipe)?)
        };

        // The child must not inherit bytes still sitting in our stdout buffer
        io::stdout().flush()?;

        match unsafe { fork() }.or_fatal(FatalOp::Fork)? {
            ForkResult::Child => {
                // Never returns: exec replaces the image or the child exits
                match exec_stage(argv, line, position, prev, next) {
                    Ok(never) => match never {},
                    Err(err) => die(&err),
                }
            }
            ForkResult::Parent { child } => {
                log::debug!("stage {}/{} forked: pid {} ({})", index + 1, count, child, argv[0]);

                if let Some((read, write)) = prev.take() {
                    close(read).or_fatal(FatalOp::Close)?;
                    close(write).or_fatal(FatalOp::Close)?;
                }
                prev = next;

                run_stage(jobs, child, &program, line.background)?;
            }
        }
    }

    Ok(())
}

/// Parent side of one stage: register it, then wait unless backgrounded
fn run_stage(
    jobs: &mut JobControl,
    child: Pid,
    program: &str,
    background: bool,
) -> Result<(), ShellError> {
    let id = jobs.register(child, program);
    jobs.set_foreground(id);

    if !background {
        let event = jobs.wait_foreground(child)?;
        log::debug!("foreground job [{}] done waiting: {:?}", id, event);
    }

    jobs.clear_foreground();
    Ok(())
}

/// Child side of one stage. Only returns on failure.
fn exec_stage(
    argv: &[String],
    line: &CommandLine,
    position: StagePosition,
    prev: Option<PipeFds>,
    next: Option<PipeFds>,
) -> Result<Infallible, ShellError> {
    if let Some((read, write)) = prev {
        redirect::replace_stream(read, STDIN_FILENO)?;
        close(write).or_fatal(FatalOp::Close)?;
    }
    if let Some((read, write)) = next {
        close(read).or_fatal(FatalOp::Close)?;
        redirect::replace_stream(write, STDOUT_FILENO)?;
    }

    signals::block_terminal_signals()?;

    let input = if position.first { line.input.as_deref() } else { None };
    let output = if position.last { line.output.as_deref() } else { None };
    redirect::apply(input, output)?;

    let args: Vec<CString> = argv
        .iter()
        .map(|a| CString::new(a.as_bytes()))
        .collect::<Result<_, _>>()
        .map_err(|_| ShellError::fatal(FatalOp::Exec, Errno::EINVAL))?;

    match execvp(&args[0], &args) {
        Err(Errno::ENOENT) => {
            // stdout may already be the next stage's pipe
            eprintln!("minishell: {}: commande introuvable", argv[0]);
            std::process::exit(1);
        }
        Err(e) => Err(ShellError::fatal(FatalOp::Exec, e)),
        Ok(never) => match never {},
    }
}
