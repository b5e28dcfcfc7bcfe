use log::debug;

use super::{grammar::TerminalSet, Grammar};

/// First set of a symbol or symbol string; `epsilon` marks that it can
/// derive the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: TerminalSet,
    pub epsilon: bool,
}

impl Grammar {
    pub fn calculate_nullable(&self) -> Vec<bool> {
        let mut nullable = vec![false; self.symbols().len()];
        let mut changed = true;
        let mut rounds = 0;
        while changed {
            changed = false;
            rounds += 1;
            for production in self.productions() {
                if nullable[production.left] {
                    continue;
                }
                if production.right.iter().all(|&s| nullable[s]) {
                    nullable[production.left] = true;
                    changed = true;
                }
            }
        }
        debug!("nullable settled after {} rounds", rounds);
        nullable
    }

    /// First sets indexed by symbol, starting from First(t) = {t} for
    /// terminals and the empty set for nonterminals.
    pub fn calculate_first(&self, nullable: &[bool]) -> Vec<FirstSet> {
        let initial = (0..self.symbols().len())
            .map(|i| FirstSet {
                terminals: if self.is_terminal(i) {
                    TerminalSet::from([i])
                } else {
                    TerminalSet::new()
                },
                epsilon: nullable[i],
            })
            .collect();
        self.calculate_first_from(initial)
    }

    /// Runs the First fixed point from `first` until no set grows.
    pub fn calculate_first_from(&self, mut first: Vec<FirstSet>) -> Vec<FirstSet> {
        let mut changed = true;
        let mut rounds = 0;
        while changed {
            changed = false;
            rounds += 1;
            for production in self.productions() {
                let found = first_of_symbols(&first, &production.right);
                let left = &mut first[production.left];
                let before = left.terminals.len();
                left.terminals.extend(found.terminals);
                changed |= left.terminals.len() != before;
            }
        }
        debug!("first sets settled after {} rounds", rounds);
        first
    }

    /// Follow sets indexed by symbol; terminals keep an empty set.
    pub fn calculate_follow(&self, first: &[FirstSet]) -> Vec<TerminalSet> {
        let mut follow = vec![TerminalSet::new(); self.symbols().len()];
        follow[self.start_symbol()].insert(self.end_mark());

        let mut changed = true;
        let mut rounds = 0;
        while changed {
            changed = false;
            rounds += 1;
            for production in self.productions() {
                for (k, &symbol) in production.right.iter().enumerate() {
                    if self.is_terminal(symbol) {
                        continue;
                    }
                    let rest = first_of_symbols(first, &production.right[k + 1..]);
                    let mut found = rest.terminals;
                    if rest.epsilon {
                        found.extend(follow[production.left].iter().cloned());
                    }
                    let before = follow[symbol].len();
                    follow[symbol].extend(found);
                    changed |= follow[symbol].len() != before;
                }
            }
        }
        debug!("follow sets settled after {} rounds", rounds);
        follow
    }
}

/// First of a symbol string under the given per-symbol First sets.
pub fn first_of_symbols(first: &[FirstSet], symbols: &[usize]) -> FirstSet {
    let mut result = FirstSet::default();
    for &symbol in symbols {
        result.terminals.extend(first[symbol].terminals.iter().cloned());
        if !first[symbol].epsilon {
            return result;
        }
    }
    result.epsilon = true;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(g: &Grammar, set: &TerminalSet) -> Vec<String> {
        g.terminal_names(set).iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nullable_set_of_decl_block() {
        let g = Grammar::decl_block();
        let nullable = g.calculate_nullable();
        let nullable: Vec<&str> = g
            .non_terminal_iter()
            .filter(|&nt| nullable[nt])
            .map(|nt| g.get_symbol_name(nt))
            .collect();
        assert_eq!(nullable, vec!["S", "D'", "I'"]);
    }

    #[test]
    fn terminals_are_never_nullable() {
        let g = Grammar::decl_block();
        let nullable = g.calculate_nullable();
        assert!(g.terminal_iter().all(|t| !nullable[t]));
    }

    #[test]
    fn first_is_idempotent() {
        let g = Grammar::decl_block();
        let nullable = g.calculate_nullable();
        let first = g.calculate_first(&nullable);
        assert_eq!(g.calculate_first_from(first.clone()), first);
        assert_eq!(g.calculate_first(&nullable), first);
    }

    #[test]
    fn first_of_terminal_is_itself() {
        let g = Grammar::decl_block();
        let first = g.calculate_first(&g.calculate_nullable());
        for t in g.terminal_iter() {
            assert_eq!(first[t].terminals, TerminalSet::from([t]));
            assert!(!first[t].epsilon);
        }
    }

    #[test]
    fn first_stops_at_non_nullable_symbol() {
        let g = Grammar::parse("S -> A B c\nA -> a | ε\nB -> b | ε").unwrap();
        let first = g.calculate_first(&g.calculate_nullable());
        let s = g.get_symbol_index("S").unwrap();
        // terminals are numbered in order of first appearance: c, a, b
        assert_eq!(names(&g, &first[s].terminals), vec!["c", "a", "b"]);
        assert!(!first[s].epsilon);
    }

    #[test]
    fn follow_through_nullable_suffix() {
        let g = Grammar::parse("S -> A B\nA -> a\nB -> b | ε").unwrap();
        let first = g.calculate_first(&g.calculate_nullable());
        let follow = g.calculate_follow(&first);
        let a = g.get_symbol_index("A").unwrap();
        let b = g.get_symbol_index("B").unwrap();
        assert_eq!(names(&g, &follow[a]), vec!["b", "#"]);
        assert_eq!(names(&g, &follow[b]), vec!["#"]);
    }

    #[test]
    fn left_recursive_grammar_terminates() {
        let g = Grammar::parse("E -> E + T | T\nT -> id").unwrap();
        let first = g.calculate_first(&g.calculate_nullable());
        let follow = g.calculate_follow(&first);
        let e = g.get_symbol_index("E").unwrap();
        let t = g.get_symbol_index("T").unwrap();
        assert_eq!(names(&g, &first[e].terminals), vec!["id"]);
        assert_eq!(names(&g, &follow[t]), vec!["+", "#"]);
    }
}
