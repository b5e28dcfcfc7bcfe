use std::collections::HashMap;
use std::io;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::LexError;
use crate::grammar::{Grammar, END_MARK};

/// A classified input token.
///
/// `terminal` names the grammar terminal the token stands for, `text` is
/// the source spelling and `offset` its byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub terminal: String,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(terminal: &str, text: &str, offset: usize) -> Self {
        Self {
            terminal: terminal.to_string(),
            text: text.to_string(),
            offset,
        }
    }

    pub fn end(offset: usize) -> Self {
        Self::new(END_MARK, END_MARK, offset)
    }

    pub fn is_end(&self) -> bool {
        self.terminal == END_MARK
    }

    /// Tokens for an already classified sequence of terminal names, laid
    /// out as if separated by single spaces.
    pub fn from_terminals(names: &[&str]) -> Vec<Token> {
        let mut offset = 0;
        names
            .iter()
            .map(|name| {
                let token = Token::new(name, name, offset);
                offset += name.len() + 1;
                token
            })
            .collect()
    }
}

/// JSON dump of classified tokens, end-markers left out.
#[derive(Serialize)]
pub struct TokenDump<'a> {
    tokens: Vec<&'a Token>,
}

impl<'a> TokenDump<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens: tokens.iter().filter(|t| !t.is_end()).collect(),
        }
    }

    pub fn write_pretty<W: io::Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}

/// Word classification rules for turning source text into tokens.
///
/// A word spelled exactly like a grammar terminal is that terminal. Other
/// words are looked up case-insensitively among the keywords, and fall back
/// to the identifier terminal. Single characters that are grammar terminals
/// stand for themselves. `#` is the end-marker; anything after it is still
/// classified so the parser can reject it as trailing input.
#[derive(Debug, Clone)]
pub struct Lexicon {
    keywords: HashMap<String, String>,
    identifier: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new("i")
            .keyword("var", "Var")
            .keyword("integer", "t")
            .keyword("longint", "t")
            .keyword("bool", "t")
            .keyword("real", "t")
    }
}

impl Lexicon {
    pub fn new(identifier: &str) -> Self {
        Self {
            keywords: HashMap::new(),
            identifier: identifier.to_string(),
        }
    }

    pub fn keyword(mut self, word: &str, terminal: &str) -> Self {
        self.keywords
            .insert(word.to_lowercase(), terminal.to_string());
        self
    }

    pub fn classify(&self, grammar: &Grammar, input: &str) -> Result<Vec<Token>, LexError> {
        let is_terminal = |name: &str| {
            grammar
                .get_symbol_index(name)
                .map_or(false, |idx| grammar.is_terminal(idx))
        };

        let mut tokens = Vec::new();
        let mut ended = false;
        let mut chars = input.char_indices().peekable();
        while let Some(&(start, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }
            if c == '/' && input[start..].starts_with("//") {
                while chars.next().map_or(false, |(_, c)| c != '\n') {}
                continue;
            }
            if c.is_ascii_alphabetic() {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let word = &input[start..end];
                let terminal = if is_terminal(word) {
                    word
                } else if let Some(keyword) = self.keywords.get(&word.to_lowercase()) {
                    keyword.as_str()
                } else {
                    self.identifier.as_str()
                };
                tokens.push(Token::new(terminal, word, start));
                continue;
            }

            chars.next();
            if c.to_string() == END_MARK {
                tokens.push(Token::end(start));
                ended = true;
                continue;
            }
            let text = &input[start..start + c.len_utf8()];
            if is_terminal(text) {
                tokens.push(Token::new(text, text, start));
            } else {
                return Err(LexError::UnexpectedChar { ch: c, offset: start });
            }
        }

        if !ended {
            tokens.push(Token::end(input.len()));
        }
        trace!("classified {} tokens", tokens.len());
        Ok(tokens)
    }
}
