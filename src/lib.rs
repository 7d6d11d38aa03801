//! minishell - an interactive shell with job control
//!
//! # Overview
//!
//! Every external command line is run as a chain of forked processes connected by
//! pipes. Each launched process is tracked as a job that can be listed, stopped,
//! resumed in the background or brought back to the foreground.
//!
//! ```text
//! >>> sleep 30 &
//! >>> lj
//! [1] 4242	Actif	sleep
//! >>> sj 1
//! >>> lj
//! [1] 4242	Suspendu	sleep
//! >>> fg 1
//! ```
//!
//! # Signals
//!
//! No process groups are used. Children block SIGINT and SIGTSTP before `exec`, so
//! the terminal keys only reach the shell, which relays them explicitly to the
//! foreground job (SIGTERM for Ctrl+C, SIGSTOP for Ctrl+Z). SIGCHLD only raises a
//! flag; the main loop reaps children at its next safe point.
//!
//! # Built-ins
//!
//! | verb      | effect                                   |
//! |-----------|------------------------------------------|
//! | `lj`      | list jobs                                |
//! | `sj <id>` | stop a job                               |
//! | `bg <id>` | resume a job in the background           |
//! | `fg <id>` | resume a job and wait for it             |
//! | `susp`    | stop the shell itself                    |
//! | `cd [p]`  | change directory (home by default)       |
//! | `exit`    | leave the shell                          |
//!
//! # Example
//!
//! ```rust
//! use minishell::parse;
//!
//! let line = parse("cat < in.txt | wc -l > out.txt &").unwrap().unwrap();
//! assert_eq!(line.stages.len(), 2);
//! assert!(line.background);
//! ```

pub mod builtins;
pub mod config;
pub mod error;
pub mod jobs;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod redirect;
pub mod relay;
pub mod shell;
pub mod signals;

// Re-export commonly used items
pub use builtins::Flow;
pub use config::Config;
pub use error::{die, FatalOp, ShellError};
pub use jobs::{Job, JobId, JobRegistry, JobStatus};
pub use lexer::{lex, LexError, Operator, Token};
pub use parser::{parse, CommandLine, ParseError};
pub use relay::{ChildEvent, JobControl};
pub use shell::Shell;
pub use signals::RelayAction;

/// Prompt printed before each read
pub const PROMPT: &str = ">>> ";
