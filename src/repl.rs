use minishell::{die, Config, Flow, Shell, PROMPT};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io;

use crate::cli::report;

/// Run the interactive loop until `exit` or end of input
pub(crate) fn run_repl(config: &Config) -> RlResult<()> {
    // Handlers must be in place before the first child is forked
    if let Err(e) = minishell::signals::setup_signal_handlers() {
        die(&e);
    }

    let mut rl = DefaultEditor::new()?;

    if let Some(ref path) = config.history {
        if rl.load_history(path).is_err() {
            log::debug!("no history loaded from {}", path.display());
        }
    }

    let mut shell = Shell::new(config);
    let mut stdout = io::stdout();

    loop {
        if let Err(e) = shell.poll() {
            report(e);
        }

        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(trimmed) {
                    log::warn!("history entry dropped: {}", e);
                }

                match shell.execute_line(trimmed, &mut stdout) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => break,
                    Err(e) => {
                        report(e);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C at the prompt with no foreground job
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("minishell: {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = config.history {
        if let Err(e) = rl.save_history(path) {
            log::warn!("could not save history to {}: {}", path.display(), e);
        }
    }

    Ok(())
}
