use minishell::{die, Config, Flow, Shell, ShellError};
use std::io;
use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs {
        command: None,
        help: false,
        version: false,
    };

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                // Everything after -c is the command
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            other => {
                eprintln!("minishell: ignoring unknown argument '{}'", other);
            }
        }
        i += 1;
    }

    cli
}

pub(crate) fn print_help() {
    println!(
        r#"minishell {} - interactive shell with job control

USAGE:
    minishell               Start interactive shell
    minishell -c <line>     Execute a single command line
    minishell --help        Show this help message
    minishell --version     Show version

SYNTAX:
    prog args...            Run a program in the foreground
    a | b | c               Pipeline (each stage waits for the previous one)
    < file                  Read the first stage's input from file
    > file                  Write the last stage's output to file
    &                       Run the line in the background (must be last)

BUILT-INS:
    lj                      List jobs: [id] pid status command
    sj <id>                 Stop a job
    bg <id>                 Resume a job in the background
    fg <id>                 Resume a job in the foreground and wait for it
    susp                    Suspend the shell
    cd [dir]                Change directory (home when omitted)
    exit                    Leave the shell

KEYS:
    Ctrl+C                  Terminate the foreground job
    Ctrl+Z                  Stop the foreground job
    Ctrl+D                  Leave the shell

ENVIRONMENT:
    MINISHELL_LOG                   Log filter (e.g. debug), off by default
    MINISHELL_HISTORY               History file, empty to disable
    MINISHELL_PROMOTE_ON_CONTINUE   1 = a continued job becomes foreground again
"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("minishell {}", VERSION);
}

/// Execute a single command line, then wait for nothing else
pub(crate) fn execute_command(cmd: &str, config: &Config) -> ExitCode {
    if let Err(e) = minishell::signals::setup_signal_handlers() {
        die(&e);
    }

    let mut shell = Shell::new(config);
    match shell.execute_line(cmd, &mut io::stdout()) {
        Ok(Flow::Continue) | Ok(Flow::Exit) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

/// Print a recoverable error; fatal ones terminate the process
pub(crate) fn report(err: ShellError) -> ExitCode {
    if err.is_fatal() {
        die(&err);
    }
    match err {
        ShellError::Io(e) => eprintln!("minishell: {}", e),
        other => println!("{}", other),
    }
    ExitCode::FAILURE
}
