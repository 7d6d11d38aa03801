//! Tokenization for minishell command lines
//!
//! Produces words (bare or quoted) and the four operators the shell understands:
//! `|`, `<`, `>` and `&`.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, take_while1},
    character::complete::{char, multispace0, none_of},
    combinator::{map, opt, value},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Pipe,       // |
    Read,       // <
    Write,      // >
    Background, // &
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Pipe => '|',
            Operator::Read => '<',
            Operator::Write => '>',
            Operator::Background => '&',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A word (program name, argument, file name)
    Word(String),
    /// An operator
    Operator(Operator),
}

#[derive(Error, Debug, PartialEq)]
pub enum LexError {
    #[error("guillemet non fermé")]
    UnterminatedString,
    #[error("caractère inattendu '{0}'")]
    UnexpectedChar(char),
}

/// Parse a double-quoted string, honouring `\"` and `\\`
fn double_quoted_string(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(
        char('"'),
        map(
            opt(escaped_transform(
                none_of("\"\\"),
                '\\',
                alt((value("\\", char('\\')), value("\"", char('"')))),
            )),
            |o| o.unwrap_or_default(),
        ),
        char('"'),
    )(input)?;
    Ok((input, Token::Word(content)))
}

/// Parse a single-quoted string (no escapes)
fn single_quoted_string(input: &str) -> IResult<&str, Token> {
    let (input, content) = delimited(
        char('\''),
        map(opt(is_not("'")), |o: Option<&str>| o.unwrap_or("")),
        char('\''),
    )(input)?;
    Ok((input, Token::Word(content.to_string())))
}

fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Operator(Operator::Pipe), char('|')),
        value(Token::Operator(Operator::Read), char('<')),
        value(Token::Operator(Operator::Write), char('>')),
        value(Token::Operator(Operator::Background), char('&')),
    ))(input)
}

/// Parse a bare word
fn word(input: &str) -> IResult<&str, Token> {
    map(
        take_while1(|c: char| {
            !c.is_whitespace() && !matches!(c, '|' | '<' | '>' | '&' | '"' | '\'')
        }),
        |s: &str| Token::Word(s.to_string()),
    )(input)
}

/// Parse any single token
fn token(input: &str) -> IResult<&str, Token> {
    preceded(
        multispace0,
        alt((double_quoted_string, single_quoted_string, operator, word)),
    )(input)
}

/// Tokenize a complete input line
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let (remaining, tokens) = many0(token)(input)
        .map_err(|_| LexError::UnexpectedChar(input.trim_start().chars().next().unwrap_or(' ')))?;

    let remaining = remaining.trim();
    match remaining.chars().next() {
        None => Ok(tokens),
        Some('"') | Some('\'') => Err(LexError::UnterminatedString),
        Some(c) => Err(LexError::UnexpectedChar(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn tokenize_simple_command() {
        assert_eq!(lex("ls -la /tmp").unwrap(), vec![word("ls"), word("-la"), word("/tmp")]);
    }

    #[test]
    fn tokenize_operators_without_spaces() {
        assert_eq!(
            lex("cat<in|wc>out&").unwrap(),
            vec![
                word("cat"),
                Token::Operator(Operator::Read),
                word("in"),
                Token::Operator(Operator::Pipe),
                word("wc"),
                Token::Operator(Operator::Write),
                word("out"),
                Token::Operator(Operator::Background),
            ]
        );
    }

    #[test]
    fn tokenize_quoted_words() {
        assert_eq!(
            lex(r#"echo "a | b" 'c > d'"#).unwrap(),
            vec![word("echo"), word("a | b"), word("c > d")]
        );
    }

    #[test]
    fn tokenize_escaped_quote() {
        assert_eq!(lex(r#"echo "say \"hi\"""#).unwrap(), vec![word("echo"), word("say \"hi\"")]);
    }

    #[test]
    fn tokenize_empty_quotes() {
        assert_eq!(lex("echo '' \"\"").unwrap(), vec![word("echo"), word(""), word("")]);
    }

    #[test]
    fn blank_line_has_no_tokens() {
        assert!(lex("   \t ").unwrap().is_empty());
    }

    #[test]
    fn unterminated_quote() {
        assert_eq!(lex("echo \"oops").unwrap_err(), LexError::UnterminatedString);
        assert_eq!(lex("echo 'oops").unwrap_err(), LexError::UnterminatedString);
    }
}
