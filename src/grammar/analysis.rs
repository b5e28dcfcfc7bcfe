use log::info;

use crate::error::{Conflict, GrammarNotLL1};

use super::{
    grammar::TerminalSet,
    nullable_first_follow::{first_of_symbols, FirstSet},
    Grammar,
};

/// Nullable, First, Follow and Select sets of one grammar.
///
/// Computed once by [`Analysis::new`] and immutable afterwards. All sets are
/// indexed by the symbol or production indices of the grammar they were
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    nullable: Vec<bool>,
    first: Vec<FirstSet>,
    follow: Vec<TerminalSet>,
    select: Vec<TerminalSet>,
    conflicts: Vec<Conflict>,
}

impl Analysis {
    pub fn new(grammar: &Grammar) -> Self {
        let nullable = grammar.calculate_nullable();
        let first = grammar.calculate_first(&nullable);
        let follow = grammar.calculate_follow(&first);
        let select = grammar.calculate_select(&first, &follow);
        let conflicts = grammar.find_conflicts(&select);
        info!(
            "analysed {} productions over {} symbols, {} conflicts",
            grammar.productions().len(),
            grammar.symbols().len(),
            conflicts.len()
        );
        Self {
            nullable,
            first,
            follow,
            select,
            conflicts,
        }
    }

    pub fn is_nullable(&self, symbol: usize) -> bool {
        self.nullable[symbol]
    }

    pub fn first(&self, symbol: usize) -> &FirstSet {
        &self.first[symbol]
    }

    pub fn first_of(&self, symbols: &[usize]) -> FirstSet {
        first_of_symbols(&self.first, symbols)
    }

    pub fn follow(&self, non_terminal: usize) -> &TerminalSet {
        &self.follow[non_terminal]
    }

    pub fn select(&self, production: usize) -> &TerminalSet {
        &self.select[production]
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn check_ll1(&self) -> Result<(), GrammarNotLL1> {
        if self.is_ll1() {
            Ok(())
        } else {
            Err(GrammarNotLL1 {
                conflicts: self.conflicts.clone(),
            })
        }
    }
}
