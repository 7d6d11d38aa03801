//! Shell - the central coordinator for minishell
//!
//! Owns the job-control state and runs one input line at a time:
//! 1. Reap children flagged by SIGCHLD since the last line
//! 2. Parse the line
//! 3. Dispatch to a built-in, or hand the line to the pipeline orchestrator

use std::io::Write;

use crate::builtins::{self, Flow};
use crate::config::Config;
use crate::error::ShellError;
use crate::parser::{parse, CommandLine};
use crate::pipeline;
use crate::relay::JobControl;

pub struct Shell {
    jobs: JobControl,
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Shell {
            jobs: JobControl::new(config.promote_on_continue),
        }
    }

    /// Process child notifications flagged since the last safe point
    pub fn poll(&mut self) -> Result<(), ShellError> {
        self.jobs.poll()
    }

    /// Parse and run one raw input line. Blank lines do nothing.
    pub fn execute_line<W: Write>(&mut self, input: &str, out: &mut W) -> Result<Flow, ShellError> {
        self.poll()?;
        match parse(input)? {
            Some(line) => self.execute(&line, out),
            None => Ok(Flow::Continue),
        }
    }

    /// Run an already parsed command line
    pub fn execute<W: Write>(&mut self, line: &CommandLine, out: &mut W) -> Result<Flow, ShellError> {
        let Some(first) = line.stages.first() else {
            return Ok(Flow::Continue);
        };

        if let Some(result) = builtins::try_builtin(&mut self.jobs, first, out) {
            return result;
        }

        pipeline::launch(&mut self.jobs, line)?;
        Ok(Flow::Continue)
    }
}
