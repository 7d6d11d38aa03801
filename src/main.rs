//! minishell - an interactive shell with job control
//!
//! Usage:
//!   minishell              Start interactive REPL
//!   minishell -c "line"    Execute a single command line

mod cli;
mod repl;

use minishell::Config;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let cli = cli::parse_args(&args);

    if cli.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = Config::from_env();
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .format_timestamp(None)
        .init();

    if let Some(cmd) = cli.command {
        return cli::execute_command(&cmd, &config);
    }

    match repl::run_repl(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("minishell: {}", e);
            ExitCode::FAILURE
        }
    }
}
