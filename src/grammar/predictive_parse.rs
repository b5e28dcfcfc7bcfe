use log::trace;
use serde::Serialize;

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::token::Token;

use super::{grammar::TerminalSet, LL1Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseAction {
    Expand { production: usize },
    Match { terminal: String },
    Accept,
}

/// Parser configuration before `action` is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseStep {
    /// Stack symbols, bottom first.
    pub stack: Vec<usize>,
    /// Index of the lookahead token.
    pub position: usize,
    pub action: ParseAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    /// Productions of the leftmost derivation, in application order.
    pub derivation: Vec<usize>,
    /// Tokens consumed by terminal matches, end-marker included.
    pub matched: Vec<Token>,
    pub steps: Vec<ParseStep>,
}

impl ParseOutcome {
    pub fn matched_terminals(&self) -> Vec<&str> {
        self.matched.iter().map(|t| t.terminal.as_str()).collect()
    }
}

fn lookahead<'t>(tokens: &'t [Token], end: &'t Token, position: usize) -> &'t Token {
    tokens.get(position).unwrap_or(end)
}

impl LL1Table<'_> {
    /// Runs the predictive parser over classified tokens.
    ///
    /// A missing trailing end-marker is implied right after the last token.
    /// The first mismatch stops the parse.
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseOutcome, SyntaxError> {
        let g = self.grammar();
        let end = Token::end(tokens.last().map_or(0, |t| t.offset + t.text.len()));

        let mut stack = vec![g.end_mark(), g.start_symbol()];
        let mut position = 0;
        let mut outcome = ParseOutcome::default();

        while let Some(&top) = stack.last() {
            let token = lookahead(tokens, &end, position);
            let current = g
                .get_symbol_index(&token.terminal)
                .filter(|&t| g.is_terminal(t));

            if g.is_terminal(top) {
                if current != Some(top) {
                    return Err(self.syntax_error(
                        SyntaxErrorKind::UnexpectedToken,
                        position,
                        token,
                        &TerminalSet::from([top]),
                    ));
                }
                trace!("match `{}` at token {}", token.terminal, position);
                outcome.steps.push(ParseStep {
                    stack: stack.clone(),
                    position,
                    action: ParseAction::Match {
                        terminal: token.terminal.clone(),
                    },
                });
                stack.pop();
                outcome.matched.push(token.clone());
                position += 1;
            } else {
                let production = current
                    .and_then(|t| self.get(top, t))
                    .ok_or_else(|| {
                        self.syntax_error(
                            SyntaxErrorKind::NoApplicableProduction,
                            position,
                            token,
                            &self.expected(top),
                        )
                    })?;
                trace!("expand {}", g.production_to_string(production.index));
                outcome.steps.push(ParseStep {
                    stack: stack.clone(),
                    position,
                    action: ParseAction::Expand {
                        production: production.index,
                    },
                });
                outcome.derivation.push(production.index);
                stack.pop();
                stack.extend(production.right.iter().rev());
            }
        }

        if position < tokens.len() {
            return Err(self.syntax_error(
                SyntaxErrorKind::TrailingInput,
                position,
                &tokens[position],
                &TerminalSet::new(),
            ));
        }

        outcome.steps.push(ParseStep {
            stack,
            position,
            action: ParseAction::Accept,
        });
        Ok(outcome)
    }

    fn syntax_error(
        &self,
        kind: SyntaxErrorKind,
        position: usize,
        token: &Token,
        expected: &TerminalSet,
    ) -> SyntaxError {
        SyntaxError {
            kind,
            position,
            offset: token.offset,
            found: token.terminal.clone(),
            expected: self
                .grammar()
                .terminal_names(expected)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Analysis, Grammar};
    use pretty_assertions::assert_eq;

    fn parse(g: &Grammar, terminals: &[&str]) -> Result<ParseOutcome, SyntaxError> {
        let analysis = Analysis::new(g);
        let table = LL1Table::new(g, &analysis).unwrap();
        table.parse(&Token::from_terminals(terminals))
    }

    #[test]
    fn leftmost_derivation() {
        let g = Grammar::decl_block();
        let outcome = parse(&g, &["Var", "i", ":", "t", ";", "#"]).unwrap();
        let derivation: Vec<String> = outcome
            .derivation
            .iter()
            .map(|&p| g.production_to_string(p))
            .collect();
        assert_eq!(
            derivation,
            vec![
                "S -> Var D",
                "D -> D1 D'",
                "D1 -> I : t ;",
                "I -> i I'",
                "I' -> ε",
                "D' -> ε",
            ]
        );
    }

    #[test]
    fn steps_end_with_accept() {
        let g = Grammar::decl_block();
        let outcome = parse(&g, &["#"]).unwrap();
        let s = g.start_symbol();
        assert_eq!(
            outcome.steps,
            vec![
                ParseStep {
                    stack: vec![g.end_mark(), s],
                    position: 0,
                    action: ParseAction::Expand { production: 1 },
                },
                ParseStep {
                    stack: vec![g.end_mark()],
                    position: 0,
                    action: ParseAction::Match {
                        terminal: "#".to_string()
                    },
                },
                ParseStep {
                    stack: vec![],
                    position: 1,
                    action: ParseAction::Accept,
                },
            ]
        );
    }

    #[test]
    fn implied_end_mark() {
        let g = Grammar::decl_block();
        let outcome = parse(&g, &["Var", "i", ":", "t", ";"]).unwrap();
        let end = outcome.matched.last().unwrap();
        assert!(end.is_end());
        assert_eq!(end.offset, 11);
    }

    #[test]
    fn unknown_terminal_has_no_applicable_production() {
        let g = Grammar::decl_block();
        let err = parse(&g, &["Var", "x", "#"]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::NoApplicableProduction);
        assert_eq!(err.position, 1);
        assert_eq!(err.found, "x");
        assert_eq!(err.expected, vec!["i"]);
    }

    #[test]
    fn input_after_end_mark() {
        let g = Grammar::decl_block();
        let err = parse(&g, &["#", "Var"]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::TrailingInput);
        assert_eq!(err.position, 1);
        assert!(err.expected.is_empty());
    }

    #[test]
    fn missing_type_after_colon() {
        let g = Grammar::decl_block();
        let err = parse(&g, &["Var", "i", ":", ";", "#"]).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedToken);
        assert_eq!(err.position, 3);
        assert_eq!(err.expected, vec!["t"]);
    }

    #[test]
    fn parallel_parses_share_one_table() {
        let g = Grammar::decl_block();
        let analysis = Analysis::new(&g);
        let table = LL1Table::new(&g, &analysis).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (1..4)
                .map(|n| {
                    let table = &table;
                    s.spawn(move || {
                        let mut names = vec!["Var"];
                        for _ in 0..n {
                            names.extend(["i", ":", "t", ";"]);
                        }
                        names.push("#");
                        table.parse(&Token::from_terminals(&names)).map(|o| o.matched.len())
                    })
                })
                .collect();
            let lens: Vec<usize> = handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect();
            assert_eq!(lens, vec![6, 10, 14]);
        });
    }
}
