//! Parser for minishell command lines
//!
//! Turns tokens into a `CommandLine`: the pipeline stages, the optional input and output
//! files for the whole line, and the background flag.

use std::path::PathBuf;

use crate::lexer::{lex, LexError, Operator, Token};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("commande vide dans le pipeline")]
    EmptyStage,
    #[error("fichier manquant après '{0}'")]
    MissingTarget(char),
    #[error("redirection '{0}' en double")]
    DuplicateRedirect(char),
    #[error("'&' doit terminer la ligne")]
    MisplacedBackground,
}

/// One parsed command line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandLine {
    /// Argument vectors, program name first
    pub stages: Vec<Vec<String>>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub background: bool,
}

impl CommandLine {
    /// Program name of the first stage
    pub fn program(&self) -> Option<&str> {
        self.stages.first().and_then(|s| s.first()).map(String::as_str)
    }
}

/// Parse a raw input line. Blank lines give `Ok(None)`.
pub fn parse(input: &str) -> Result<Option<CommandLine>, ParseError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_tokens(tokens).map(Some)
}

fn parse_tokens(tokens: Vec<Token>) -> Result<CommandLine, ParseError> {
    let mut line = CommandLine::default();
    let mut stage: Vec<String> = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(w) => stage.push(w),
            Token::Operator(Operator::Pipe) => {
                if stage.is_empty() {
                    return Err(ParseError::EmptyStage);
                }
                line.stages.push(std::mem::take(&mut stage));
            }
            Token::Operator(op @ (Operator::Read | Operator::Write)) => {
                let target = match iter.next() {
                    Some(Token::Word(w)) => PathBuf::from(w),
                    _ => return Err(ParseError::MissingTarget(op.symbol())),
                };
                let slot = if op == Operator::Read {
                    &mut line.input
                } else {
                    &mut line.output
                };
                if slot.is_some() {
                    return Err(ParseError::DuplicateRedirect(op.symbol()));
                }
                *slot = Some(target);
            }
            Token::Operator(Operator::Background) => {
                if iter.peek().is_some() {
                    return Err(ParseError::MisplacedBackground);
                }
                line.background = true;
            }
        }
    }

    if stage.is_empty() {
        return Err(ParseError::EmptyStage);
    }
    line.stages.push(stage);
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn parse_single_command() {
        let line = parse("echo hi").unwrap().unwrap();
        assert_eq!(line.stages, vec![argv(&["echo", "hi"])]);
        assert_eq!(line.program(), Some("echo"));
        assert!(!line.background);
        assert!(line.input.is_none() && line.output.is_none());
    }

    #[test]
    fn parse_pipeline_with_redirections() {
        let line = parse("cat < in.txt | grep x | wc -l > out.txt").unwrap().unwrap();
        assert_eq!(
            line.stages,
            vec![argv(&["cat"]), argv(&["grep", "x"]), argv(&["wc", "-l"])]
        );
        assert_eq!(line.input, Some(PathBuf::from("in.txt")));
        assert_eq!(line.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn parse_background() {
        let line = parse("sleep 5 &").unwrap().unwrap();
        assert!(line.background);
        assert_eq!(line.stages, vec![argv(&["sleep", "5"])]);
    }

    #[test]
    fn blank_line_is_none() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn structure_errors() {
        assert_eq!(parse("| wc").unwrap_err(), ParseError::EmptyStage);
        assert_eq!(parse("ls |").unwrap_err(), ParseError::EmptyStage);
        assert_eq!(parse("ls | | wc").unwrap_err(), ParseError::EmptyStage);
        assert_eq!(parse("cat <").unwrap_err(), ParseError::MissingTarget('<'));
        assert_eq!(parse("ls > | wc").unwrap_err(), ParseError::MissingTarget('>'));
        assert_eq!(parse("cat < a < b").unwrap_err(), ParseError::DuplicateRedirect('<'));
        assert_eq!(parse("sleep 1 & ls").unwrap_err(), ParseError::MisplacedBackground);
        assert_eq!(parse("&").unwrap_err(), ParseError::EmptyStage);
        assert_eq!(
            parse("echo 'x").unwrap_err(),
            ParseError::Lex(LexError::UnterminatedString)
        );
    }
}
