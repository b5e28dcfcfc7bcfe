use std::collections::HashMap;

use log::info;

use crate::error::GrammarNotLL1;

use super::{grammar::TerminalSet, Analysis, Grammar, Production};

/// Predictive parsing table: (nonterminal, lookahead terminal) to the single
/// production to expand.
///
/// Only LL(1) grammars get a table, so every cell holds at most one
/// production. The table borrows its grammar and never changes after
/// construction.
#[derive(Debug, Clone)]
pub struct LL1Table<'g> {
    grammar: &'g Grammar,
    table: HashMap<(usize, usize), usize>,
}

impl<'g> LL1Table<'g> {
    pub fn new(grammar: &'g Grammar, analysis: &Analysis) -> Result<Self, GrammarNotLL1> {
        analysis.check_ll1()?;

        let mut table = HashMap::new();
        for production in grammar.productions() {
            for &t in analysis.select(production.index) {
                table.insert((production.left, t), production.index);
            }
        }
        info!("built LL(1) table with {} entries", table.len());

        Ok(Self { grammar, table })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn get(&self, non_terminal: usize, terminal: usize) -> Option<&'g Production> {
        self.table
            .get(&(non_terminal, terminal))
            .map(|&p| self.grammar.production(p))
    }

    /// Terminals with an entry in the row of `non_terminal`.
    pub fn expected(&self, non_terminal: usize) -> TerminalSet {
        self.grammar
            .terminal_iter()
            .filter(|&t| self.table.contains_key(&(non_terminal, t)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decl_block_table_entries() {
        let g = Grammar::decl_block();
        let analysis = Analysis::new(&g);
        let table = LL1Table::new(&g, &analysis).unwrap();

        assert_eq!(table.len(), 9);

        let idx = |name: &str| g.get_symbol_index(name).unwrap();
        assert_eq!(table.get(idx("S"), idx("Var")).unwrap().index, 0);
        assert_eq!(table.get(idx("S"), g.end_mark()).unwrap().index, 1);
        assert_eq!(table.get(idx("I'"), idx(":")).unwrap().index, 8);
        assert!(table.get(idx("D"), idx(":")).is_none());
        assert_eq!(g.terminal_names(&table.expected(idx("D1"))), vec!["i"]);
    }

    #[test]
    fn rejects_non_ll1_grammar() {
        let g = Grammar::parse("S -> A a\nA -> a | ε").unwrap();
        let analysis = Analysis::new(&g);
        let err = LL1Table::new(&g, &analysis).unwrap_err();
        assert_eq!(err.conflicts[0].productions[0], "A -> a");
        assert_eq!(err.conflicts[0].productions[1], "A -> ε");
    }
}
