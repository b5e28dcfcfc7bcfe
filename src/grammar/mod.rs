pub mod analysis;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod ll1_table;
pub mod nullable_first_follow;
pub mod parse;
pub mod predictive_parse;
pub mod pretty_print;
pub mod select;
pub use analysis::Analysis;
pub use grammar::{Grammar, GrammarBuilder, Production, Symbol};
pub use ll1_table::LL1Table;
pub use predictive_parse::{ParseAction, ParseOutcome, ParseStep};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "#";

/// Spellings accepted for the empty alternative in grammar text.
pub const EPSILON_ALIASES: [&str; 3] = [EPSILON, "Ïµ", "epsilon"];

/// The variable declaration block grammar.
pub const DECL_BLOCK_GRAMMAR: &str = "\
%terminals Var t i , : ;
S  -> Var D | ε
D  -> D1 D'
D' -> D1 D' | ε
D1 -> I : t ;
I  -> i I'
I' -> , i I' | ε
";
