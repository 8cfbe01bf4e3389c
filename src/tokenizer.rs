//! SQL statement tokenizer.
//!
//! Splits a raw SQL text blob into individual executable statements. The
//! splitter is a character state machine over {normal, single-quoted,
//! double-quoted, line comment, block comment}: semicolons split only in
//! the normal state, comments are stripped, and nothing inside a quoted
//! literal is ever touched. It is best-effort on pathological input
//! (unterminated quotes, nested block comments are not tracked).
//!
//! Also home to the statement-shape parsers the compiler and export walker
//! need: index-creation detection and `CREATE TABLE` prefix stripping.

use std::iter::Peekable;
use std::str::Chars;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    sequence::{delimited, pair, tuple},
};

/// Split SQL text into trimmed, non-empty statements.
///
/// The returned iterator is lazy and borrows the input; call `tokenize`
/// again to restart.
///
/// # Example
/// ```
/// use sqlporter::tokenizer::tokenize;
///
/// let stmts: Vec<String> = tokenize("CREATE TABLE a(x); INSERT INTO a VALUES ('1;2')").collect();
/// assert_eq!(stmts, ["CREATE TABLE a(x)", "INSERT INTO a VALUES ('1;2')"]);
/// ```
pub fn tokenize(sql: &str) -> Statements<'_> {
    Statements {
        chars: sql.chars().peekable(),
    }
}

/// Lazy statement iterator produced by [`tokenize`].
pub struct Statements<'a> {
    chars: Peekable<Chars<'a>>,
}

enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

impl Iterator for Statements<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let mut buf = String::new();
            // Splits happen only in the normal state, so every statement
            // scan starts there.
            let mut state = State::Normal;
            let mut saw_input = false;

            while let Some(c) = self.chars.next() {
                saw_input = true;
                match state {
                    State::Normal => match c {
                        ';' => break,
                        '\r' => {}
                        '\'' => {
                            buf.push(c);
                            state = State::SingleQuote;
                        }
                        '"' => {
                            buf.push(c);
                            state = State::DoubleQuote;
                        }
                        '-' if self.chars.peek() == Some(&'-') => {
                            self.chars.next();
                            state = State::LineComment;
                        }
                        '/' if self.chars.peek() == Some(&'*') => {
                            self.chars.next();
                            state = State::BlockComment;
                        }
                        _ => buf.push(c),
                    },
                    State::SingleQuote => {
                        buf.push(c);
                        if c == '\'' {
                            state = State::Normal;
                        }
                    }
                    State::DoubleQuote => {
                        buf.push(c);
                        if c == '"' {
                            state = State::Normal;
                        }
                    }
                    State::LineComment => {
                        if c == '\n' {
                            buf.push('\n');
                            state = State::Normal;
                        }
                    }
                    State::BlockComment => {
                        if c == '*' && self.chars.peek() == Some(&'/') {
                            self.chars.next();
                            buf.push(' ');
                            state = State::Normal;
                        }
                    }
                }
            }

            if !saw_input {
                return None;
            }
            let stmt = buf.trim();
            if !stmt.is_empty() {
                return Some(stmt.to_string());
            }
            // Whitespace-only statement; keep scanning.
        }
    }
}

/// Collapse every run of whitespace to a single space.
pub fn normalize_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if the statement is an index creation (`CREATE [UNIQUE] INDEX ...`).
pub fn is_index_statement(sql: &str) -> bool {
    index_head(sql).is_ok()
}

/// Strip a `CREATE TABLE [IF NOT EXISTS] <name>` prefix, returning the
/// undelimited table name and the remaining column clause. `None` if the
/// statement is not a table creation.
pub fn table_definition(sql: &str) -> Option<(String, String)> {
    match table_head(sql) {
        Ok((rest, name)) => Some((name.to_string(), rest.trim().to_string())),
        Err(_) => None,
    }
}

/// A possibly delimited identifier: `"name"`, `` `name` ``, `[name]` or bare.
fn identifier(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while1(|c| c != '"'), char('"')),
        delimited(char('`'), take_while1(|c| c != '`'), char('`')),
        delimited(char('['), take_while1(|c| c != ']'), char(']')),
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}

fn index_head(input: &str) -> IResult<&str, ()> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag_no_case("CREATE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = opt(pair(tag_no_case("UNIQUE"), multispace1))(input)?;
    let (input, _) = tag_no_case("INDEX")(input)?;
    let (input, _) = multispace1(input)?;
    Ok((input, ()))
}

fn table_head(input: &str) -> IResult<&str, &str> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag_no_case("CREATE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("TABLE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = opt(tuple((
        tag_no_case("IF"),
        multispace1,
        tag_no_case("NOT"),
        multispace1,
        tag_no_case("EXISTS"),
        multispace1,
    )))(input)?;
    identifier(input)
}
