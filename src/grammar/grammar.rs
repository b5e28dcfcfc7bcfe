use std::collections::{BTreeSet, HashMap};

use crate::error::MalformedGrammar;

use super::{END_MARK, EPSILON, EPSILON_ALIASES};

pub type TerminalSet = BTreeSet<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub index: usize,
    pub left: usize,
    pub right: Vec<usize>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }
}

/// An immutable context-free grammar.
///
/// Symbols are addressed by index. Index 0 is always the end-marker, declared
/// terminals follow in declaration order, then nonterminals in the order their
/// first production appears.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    symbol_table: HashMap<String, usize>,
    productions: Vec<Production>,
    by_left: Vec<Vec<usize>>,
    non_terminals: Vec<usize>,
    start_symbol: usize,
}

impl Grammar {
    pub fn end_mark(&self) -> usize {
        0
    }

    pub fn start_symbol(&self) -> usize {
        self.start_symbol
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol(&self, index: usize) -> &Symbol {
        &self.symbols[index]
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        self.symbols[index].is_terminal()
    }

    /// Terminal indices in declaration order, end-marker last.
    pub fn terminal_iter(&self) -> impl Iterator<Item = usize> + '_ {
        (1..self.symbols.len())
            .filter(|&i| self.symbols[i].is_terminal())
            .chain(std::iter::once(self.end_mark()))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.non_terminals.iter().cloned()
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// Alternatives of `non_terminal` in declaration order.
    pub fn productions_of(&self, non_terminal: usize) -> impl Iterator<Item = &Production> + '_ {
        self.by_left[non_terminal]
            .iter()
            .map(move |&p| &self.productions[p])
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        self.symbols[index].name()
    }

    /// Right-hand side names, `[ε]` for an empty alternative.
    pub fn production_to_vec_str(&self, production: &Production) -> Vec<&str> {
        if production.is_epsilon() {
            vec![EPSILON]
        } else {
            production
                .right
                .iter()
                .map(|&s| self.get_symbol_name(s))
                .collect()
        }
    }

    pub fn production_to_string(&self, index: usize) -> String {
        let production = &self.productions[index];
        format!(
            "{} -> {}",
            self.get_symbol_name(production.left),
            self.production_to_vec_str(production).join(" ")
        )
    }

    /// Names of a terminal set, ordered like `terminal_iter`.
    pub fn terminal_names(&self, set: &TerminalSet) -> Vec<&str> {
        self.terminal_iter()
            .filter(|t| set.contains(t))
            .map(|t| self.get_symbol_name(t))
            .collect()
    }

    fn add_symbol(&mut self, symbol: Symbol) -> usize {
        let idx = self.symbols.len();
        self.symbol_table.insert(symbol.name().to_string(), idx);
        self.symbols.push(symbol);
        self.by_left.push(Vec::new());
        idx
    }
}

pub(crate) fn is_epsilon_name(name: &str) -> bool {
    EPSILON_ALIASES.contains(&name)
}

struct Rule {
    line: usize,
    left: String,
    right: Vec<String>,
}

/// Collects terminals and productions and validates them into a [`Grammar`].
///
/// Once any terminal is declared, right-hand side names that are neither a
/// declared terminal nor a left side are rejected as undefined nonterminals.
/// Without declarations every such name is taken to be a terminal.
#[derive(Default)]
pub struct GrammarBuilder {
    terminals: Vec<(usize, String)>,
    declared_terminals: bool,
    rules: Vec<Rule>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to explicit terminal declarations, even with an empty alphabet.
    pub fn declare_terminals(&mut self) -> &mut Self {
        self.declared_terminals = true;
        self
    }

    /// Declare a terminal. Errors about it are reported on line 0.
    pub fn terminal(&mut self, name: &str) -> &mut Self {
        self.terminal_at(0, name)
    }

    pub(crate) fn terminal_at(&mut self, line: usize, name: &str) -> &mut Self {
        self.declared_terminals = true;
        if !self.terminals.iter().any(|(_, t)| t == name) {
            self.terminals.push((line, name.to_string()));
        }
        self
    }

    /// Add `left -> right`; an empty `right` is the ε alternative.
    pub fn production(&mut self, left: &str, right: &[&str]) -> &mut Self {
        let line = self.rules.len() + 1;
        self.production_at(line, left, right)
    }

    pub(crate) fn production_at(&mut self, line: usize, left: &str, right: &[&str]) -> &mut Self {
        self.rules.push(Rule {
            line,
            left: left.to_string(),
            right: right
                .iter()
                .filter(|s| !is_epsilon_name(s))
                .map(|s| s.to_string())
                .collect(),
        });
        self
    }

    pub fn build(&self) -> Result<Grammar, MalformedGrammar> {
        let first_rule = self.rules.first().ok_or(MalformedGrammar::Empty)?;

        let mut g = Grammar {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            productions: Vec::new(),
            by_left: Vec::new(),
            non_terminals: Vec::new(),
            start_symbol: 0,
        };
        g.add_symbol(Symbol::Terminal(END_MARK.to_string()));

        for (line, name) in &self.terminals {
            if name == END_MARK {
                return Err(MalformedGrammar::ReservedSymbol {
                    line: *line,
                    name: name.clone(),
                });
            }
            g.add_symbol(Symbol::Terminal(name.clone()));
        }

        for rule in &self.rules {
            if rule.left == END_MARK {
                return Err(MalformedGrammar::ReservedSymbol {
                    line: rule.line,
                    name: rule.left.clone(),
                });
            }
            match g.get_symbol_index(&rule.left) {
                Some(idx) if g.is_terminal(idx) => {
                    return Err(MalformedGrammar::TerminalAsLeft {
                        line: rule.line,
                        name: rule.left.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    let idx = g.add_symbol(Symbol::NonTerminal(rule.left.clone()));
                    g.non_terminals.push(idx);
                }
            }
        }
        g.start_symbol = g.symbol_table[&first_rule.left];

        for rule in &self.rules {
            let left = g.symbol_table[&rule.left];
            let mut right = Vec::with_capacity(rule.right.len());
            for name in &rule.right {
                if name == END_MARK {
                    return Err(MalformedGrammar::ReservedSymbol {
                        line: rule.line,
                        name: name.clone(),
                    });
                }
                let idx = match g.get_symbol_index(name) {
                    Some(idx) => idx,
                    None if self.declared_terminals => {
                        return Err(MalformedGrammar::UndefinedNonTerminal {
                            line: rule.line,
                            name: name.clone(),
                            left: rule.left.clone(),
                        });
                    }
                    None => g.add_symbol(Symbol::Terminal(name.clone())),
                };
                right.push(idx);
            }

            if g.productions_of(left).any(|p| p.right == right) {
                let duplicate = Production {
                    index: 0,
                    left,
                    right,
                };
                return Err(MalformedGrammar::DuplicateProduction {
                    line: rule.line,
                    production: format!(
                        "{} -> {}",
                        rule.left,
                        g.production_to_vec_str(&duplicate).join(" ")
                    ),
                });
            }

            let index = g.productions.len();
            g.by_left[left].push(index);
            g.productions.push(Production { index, left, right });
        }

        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_groups_alternatives_in_declaration_order() {
        let g = GrammarBuilder::new()
            .production("S", &["a", "A"])
            .production("A", &["b"])
            .production("S", &[])
            .build()
            .unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let alternatives: Vec<usize> = g.productions_of(s).map(|p| p.index).collect();
        assert_eq!(alternatives, vec![0, 2]);
        assert_eq!(g.production_to_string(2), "S -> ε");
        assert_eq!(g.start_symbol(), s);
    }

    #[test]
    fn inferred_terminals_follow_declared_order() {
        let g = GrammarBuilder::new()
            .production("S", &["x", "y"])
            .build()
            .unwrap();
        let names: Vec<&str> = g.terminal_iter().map(|t| g.get_symbol_name(t)).collect();
        assert_eq!(names, vec!["x", "y", END_MARK]);
    }

    #[test]
    fn undefined_non_terminal() {
        let err = GrammarBuilder::new()
            .terminal("a")
            .production("S", &["a", "B"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            MalformedGrammar::UndefinedNonTerminal {
                line: 1,
                name: "B".to_string(),
                left: "S".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_epsilon_alternative() {
        let err = GrammarBuilder::new()
            .production("S", &["a"])
            .production("S", &[])
            .production("S", &["ε"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedGrammar::DuplicateProduction { line: 3, .. }
        ));
    }

    #[test]
    fn end_mark_is_reserved() {
        let err = GrammarBuilder::new()
            .production("S", &["a", END_MARK])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            MalformedGrammar::ReservedSymbol {
                line: 1,
                name: END_MARK.to_string(),
            }
        );
    }

    #[test]
    fn declared_terminal_cannot_be_left_side() {
        let err = GrammarBuilder::new()
            .terminal("a")
            .production("a", &["a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, MalformedGrammar::TerminalAsLeft { .. }));
    }

    #[test]
    fn empty_builder() {
        assert_eq!(
            GrammarBuilder::new().build().unwrap_err(),
            MalformedGrammar::Empty
        );
    }
}
