use crate::error::Conflict;

use super::{
    grammar::TerminalSet,
    nullable_first_follow::{first_of_symbols, FirstSet},
    Grammar,
};

impl Grammar {
    /// Select sets indexed by production.
    pub fn calculate_select(&self, first: &[FirstSet], follow: &[TerminalSet]) -> Vec<TerminalSet> {
        self.productions()
            .iter()
            .map(|production| {
                let found = first_of_symbols(first, &production.right);
                let mut select = found.terminals;
                if found.epsilon {
                    select.extend(follow[production.left].iter().cloned());
                }
                select
            })
            .collect()
    }

    /// Pairs of alternatives of the same nonterminal with overlapping
    /// Select sets, in declaration order.
    pub fn find_conflicts(&self, select: &[TerminalSet]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for nt in self.non_terminal_iter() {
            let alternatives: Vec<usize> = self.productions_of(nt).map(|p| p.index).collect();
            for (i, &a) in alternatives.iter().enumerate() {
                for &b in &alternatives[i + 1..] {
                    let overlap: TerminalSet =
                        select[a].intersection(&select[b]).cloned().collect();
                    if overlap.is_empty() {
                        continue;
                    }
                    conflicts.push(Conflict {
                        non_terminal: self.get_symbol_name(nt).to_string(),
                        productions: [self.production_to_string(a), self.production_to_string(b)],
                        terminals: self
                            .terminal_names(&overlap)
                            .into_iter()
                            .map(String::from)
                            .collect(),
                    });
                }
            }
        }
        conflicts
    }
}
