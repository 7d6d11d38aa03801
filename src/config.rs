//! Runtime configuration, read from `MINISHELL_*` environment variables
//!
//! - `MINISHELL_LOG`: `env_logger` filter (default `off`)
//! - `MINISHELL_HISTORY`: history file; empty disables history
//!   (default `~/.minishell_history`)
//! - `MINISHELL_PROMOTE_ON_CONTINUE`: `1`/`true` makes any continued job the
//!   foreground job again, even one resumed with `bg`

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_filter: String,
    pub history: Option<PathBuf>,
    pub promote_on_continue: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: "off".to_string(),
            history: None,
            promote_on_continue: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_filter = lookup("MINISHELL_LOG")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "off".to_string());

        let history = match lookup("MINISHELL_HISTORY") {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => lookup("HOME").map(|home| PathBuf::from(home).join(".minishell_history")),
        };

        let promote_on_continue = lookup("MINISHELL_PROMOTE_ON_CONTINUE")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Config {
            log_filter,
            history,
            promote_on_continue,
        }
    }
}
