use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedGrammar {
    #[error("grammar has no productions")]
    Empty,
    #[error("line {line}: too many \"->\"")]
    TooManyArrows { line: usize },
    #[error("line {line}: left side contains whitespace")]
    LeftContainsWhitespace { line: usize },
    #[error("line {line}: empty left side")]
    EmptyLeft { line: usize },
    #[error("line {line}: cannot find left side")]
    MissingLeft { line: usize },
    #[error("line {line}: `{name}` is reserved for the end-marker")]
    ReservedSymbol { line: usize, name: String },
    #[error("line {line}: terminal `{name}` used as a left side")]
    TerminalAsLeft { line: usize, name: String },
    #[error("line {line}: undefined nonterminal `{name}` in an alternative of `{left}`")]
    UndefinedNonTerminal {
        line: usize,
        name: String,
        left: String,
    },
    #[error("line {line}: duplicate alternative `{production}`")]
    DuplicateProduction { line: usize, production: String },
}

/// Two alternatives of one nonterminal whose Select sets overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub non_terminal: String,
    pub productions: [String; 2],
    pub terminals: Vec<String>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` and `{}` both select on {{{}}}",
            self.productions[0],
            self.productions[1],
            self.terminals.join(", ")
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("grammar is not LL(1): {}", .conflicts.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("; "))]
pub struct GrammarNotLL1 {
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyntaxErrorKind {
    /// The terminal on top of the stack differs from the lookahead.
    UnexpectedToken,
    /// The table has no entry for the nonterminal on top of the stack.
    NoApplicableProduction,
    /// Input continues after the end-marker was matched.
    TrailingInput,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyntaxErrorKind::UnexpectedToken => "unexpected token",
            SyntaxErrorKind::NoApplicableProduction => "no applicable production",
            SyntaxErrorKind::TrailingInput => "trailing input",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind} at token {position}: found `{found}`, expected {{{}}}", .expected.join(", "))]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Index of the offending token in the token sequence.
    pub position: usize,
    /// Byte offset of the offending token in the source text.
    pub offset: usize,
    pub found: String,
    pub expected: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character `{ch}`")]
    UnexpectedChar { ch: char, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. } => *offset,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("duplicate identifier `{name}`")]
pub struct DuplicateIdentifier {
    pub name: String,
    pub offset: usize,
    /// Offset of the earlier declaration.
    pub first_offset: usize,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    MalformedGrammar(#[from] MalformedGrammar),
    #[error(transparent)]
    NotLL1(#[from] GrammarNotLL1),
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Declaration(#[from] DuplicateIdentifier),
}

impl Error {
    /// Source offset the error points at, if it comes from the input text.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Lex(e) => Some(e.offset()),
            Error::Syntax(e) => Some(e.offset),
            Error::Declaration(e) => Some(e.offset),
            Error::MalformedGrammar(_) | Error::NotLL1(_) => None,
        }
    }
}

/// Line start index over a source text.
#[derive(Debug, Clone)]
pub struct LinePos<'a> {
    content: &'a str,
    start_offset: Vec<usize>,
}

impl<'a> LinePos<'a> {
    pub fn new(content: &'a str) -> Self {
        let mut start_offset = vec![0];
        start_offset.extend(content.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            content,
            start_offset,
        }
    }

    /// 1-based line and column (in characters) of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.content.len());
        let line = self
            .start_offset
            .binary_search(&offset)
            .map(|x| x + 1)
            .unwrap_or_else(|x| x);
        let start = self.start_offset[line - 1];
        let col = self
            .content
            .get(start..offset)
            .map_or(0, |s| s.chars().count())
            + 1;
        (line, col)
    }

    /// 1-based line content without its line break.
    pub fn get_line(&self, line: usize) -> Option<&'a str> {
        let start = *self.start_offset.get(line.checked_sub(1)?)?;
        let end = self
            .start_offset
            .get(line)
            .cloned()
            .unwrap_or(self.content.len());
        self.content.get(start..end).map(|s| s.trim_end())
    }

    /// ```plaintext
    /// [file_name:line:col] Error: msg
    ///     line_content
    ///     ^
    /// ```
    pub fn display_error(&self, file_name: &str, offset: usize, msg: &str) -> String {
        let (line, col) = self.line_col(offset);
        format!(
            "[{}:{}:{}] Error: {}\n    {}\n    {}^",
            file_name,
            line,
            col,
            msg,
            self.get_line(line).unwrap_or(""),
            " ".repeat(col - 1)
        )
    }
}
