use crate::error::MalformedGrammar;

use super::{Grammar, GrammarBuilder, DECL_BLOCK_GRAMMAR};

const TERMINALS_DIRECTIVE: &str = "%terminals";

impl Grammar {
    pub fn parse(grammar: &str) -> Result<Self, MalformedGrammar> {
        let mut builder = GrammarBuilder::new();

        let mut raw_productions: Vec<(usize, &str, &str)> = Vec::new();

        let mut previous_left: Option<&str> = None;
        for (i, line) in grammar.lines().enumerate() {
            let line_no = i + 1;
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            if let Some(terminals) = line.trim_start().strip_prefix(TERMINALS_DIRECTIVE) {
                builder.declare_terminals();
                for t in terminals.split_whitespace() {
                    builder.terminal_at(line_no, t);
                }
                continue;
            }

            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(MalformedGrammar::TooManyArrows { line: line_no });
            }
            let (left, rights) = if parts.len() == 2 {
                let left = parts[0].trim();
                if left.is_empty() {
                    return Err(MalformedGrammar::EmptyLeft { line: line_no });
                } else if left.split_whitespace().count() != 1 {
                    return Err(MalformedGrammar::LeftContainsWhitespace { line: line_no });
                }
                (left, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rights)) => (left, rights.trim()),
                    _ => return Err(MalformedGrammar::MissingLeft { line: line_no }),
                }
            };

            previous_left = Some(left);

            raw_productions.push((line_no, left, rights));
        }

        for (line, left, rights) in raw_productions {
            for right in rights.split('|') {
                let symbols: Vec<&str> = right.split_whitespace().collect();
                builder.production_at(line, left, &symbols);
            }
        }

        builder.build()
    }

    /// The built-in variable declaration block grammar.
    pub fn decl_block() -> Self {
        Self::parse(DECL_BLOCK_GRAMMAR).expect("built-in grammar is well formed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::END_MARK;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("S -> a").unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();

        assert_eq!(g.get_symbol_name(s), "S");
        assert_eq!(g.get_symbol_name(a), "a");
        assert!(g.is_terminal(a));
        assert_eq!(g.productions_of(s).next().unwrap().right, vec![a]);
    }

    #[test]
    fn simple_parse_with_space_and_newline() {
        let g = Grammar::parse("  S -> a \n | b c").unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();
        let b = g.get_symbol_index("b").unwrap();
        let c = g.get_symbol_index("c").unwrap();

        let alternatives: Vec<&Vec<usize>> = g.productions_of(s).map(|p| &p.right).collect();
        assert_eq!(alternatives, vec![&vec![a], &vec![b, c]]);
    }

    #[test]
    fn epsilon_spellings() {
        let g = Grammar::parse("S -> a S | ε\nT -> epsilon | b\nU -> Ïµ | c\nV -> d | ").unwrap();
        assert_eq!(g.production_to_string(1), "S -> ε");
        assert_eq!(g.production_to_string(2), "T -> ε");
        assert_eq!(g.production_to_string(4), "U -> ε");
        assert_eq!(g.production_to_string(7), "V -> ε");
    }

    #[test]
    fn decl_block_grammar() {
        let g = Grammar::decl_block();

        assert_eq!(g.productions().len(), 9);
        assert_eq!(g.get_symbol_name(g.start_symbol()), "S");

        let terminals: Vec<&str> = g.terminal_iter().map(|t| g.get_symbol_name(t)).collect();
        assert_eq!(terminals, vec!["Var", "t", "i", ",", ":", ";", END_MARK]);

        let non_terminals: Vec<&str> = g
            .non_terminal_iter()
            .map(|nt| g.get_symbol_name(nt))
            .collect();
        assert_eq!(non_terminals, vec!["S", "D", "D'", "D1", "I", "I'"]);

        let productions: Vec<String> = (0..9).map(|p| g.production_to_string(p)).collect();
        assert_eq!(
            productions,
            vec![
                "S -> Var D",
                "S -> ε",
                "D -> D1 D'",
                "D' -> D1 D'",
                "D' -> ε",
                "D1 -> I : t ;",
                "I -> i I'",
                "I' -> , i I'",
                "I' -> ε",
            ]
        );
    }

    #[test]
    fn undeclared_symbol_is_undefined_non_terminal() {
        let err = Grammar::parse("%terminals a\nS -> a B\n").unwrap_err();
        assert_eq!(
            err,
            MalformedGrammar::UndefinedNonTerminal {
                line: 2,
                name: "B".to_string(),
                left: "S".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_epsilon_alternative() {
        let err = Grammar::parse("S -> a | ε\n | ").unwrap_err();
        assert_eq!(
            err,
            MalformedGrammar::DuplicateProduction {
                line: 2,
                production: "S -> ε".to_string(),
            }
        );
    }

    #[test]
    fn reserved_end_mark_reports_line() {
        assert_eq!(
            Grammar::parse("%terminals a\nS -> a\n%terminals #").unwrap_err(),
            MalformedGrammar::ReservedSymbol {
                line: 3,
                name: END_MARK.to_string(),
            }
        );
        assert_eq!(
            Grammar::parse("S -> a\nT -> b # c").unwrap_err(),
            MalformedGrammar::ReservedSymbol {
                line: 2,
                name: END_MARK.to_string(),
            }
        );
    }

    #[test]
    fn empty_parse() {
        assert_eq!(
            Grammar::parse("  \n  ").unwrap_err(),
            MalformedGrammar::Empty
        );
    }

    #[test]
    fn two_rightarrows_parse() {
        assert_eq!(
            Grammar::parse("S -> a -> b").unwrap_err(),
            MalformedGrammar::TooManyArrows { line: 1 }
        );
    }

    #[test]
    fn no_left_parse() {
        assert_eq!(
            Grammar::parse("-> a").unwrap_err(),
            MalformedGrammar::EmptyLeft { line: 1 }
        );
    }

    #[test]
    fn no_previous_left_parse() {
        assert_eq!(
            Grammar::parse("| a b\n S -> a").unwrap_err(),
            MalformedGrammar::MissingLeft { line: 1 }
        );
    }

    #[test]
    fn left_contain_space() {
        assert_eq!(
            Grammar::parse("S a S -> x").unwrap_err(),
            MalformedGrammar::LeftContainsWhitespace { line: 1 }
        );
    }
}
