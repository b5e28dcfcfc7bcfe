extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod declarations;
pub mod error;
pub mod grammar;
pub mod token;

pub use declarations::DeclarationTable;
pub use error::{
    DuplicateIdentifier, Error, GrammarNotLL1, LexError, MalformedGrammar, SyntaxError,
};
pub use grammar::{Analysis, Grammar, LL1Table};
pub use token::{Lexicon, Token, TokenDump};

use grammar::pretty_print::{ParseVerdictOutput, Render};
use grammar::ParseOutcome;

fn error_json<E: std::fmt::Display>(e: E) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn with_analysis(
    grammar: &str,
    f: impl Fn(&Grammar, &Analysis) -> serde_json::Result<String>,
) -> String {
    match Grammar::parse(grammar) {
        Ok(g) => {
            let analysis = Analysis::new(&g);
            f(&g, &analysis).unwrap_or_else(error_json)
        }
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    with_analysis(grammar, |g, a| g.to_non_terminal_output_vec(a).to_json())
}

#[wasm_bindgen]
pub fn select_to_json(grammar: &str) -> String {
    with_analysis(grammar, |g, a| g.to_select_output_vec(a).to_json())
}

#[wasm_bindgen]
pub fn ll1_check_to_json(grammar: &str) -> String {
    with_analysis(grammar, |g, a| g.to_ll1_check_output(a).to_json())
}

/// Classifies `source` with the default lexicon and parses it.
pub fn parse_source(grammar: &Grammar, source: &str) -> Result<ParseOutcome, Error> {
    let analysis = Analysis::new(grammar);
    let table = LL1Table::new(grammar, &analysis)?;
    let tokens = Lexicon::default().classify(grammar, source)?;
    Ok(table.parse(&tokens)?)
}

/// Parses `source` with the built-in grammar and collects its declarations.
pub fn declarations_of(source: &str) -> Result<DeclarationTable, Error> {
    let outcome = parse_source(&Grammar::decl_block(), source)?;
    Ok(DeclarationTable::collect(&outcome.matched)?)
}

#[wasm_bindgen]
pub fn declarations_to_json(source: &str) -> String {
    match declarations_of(source) {
        Ok(table) => table.to_json().unwrap_or_else(error_json),
        Err(e) => error_json(e),
    }
}

fn verdict_json(g: &Grammar, result: Result<ParseOutcome, Error>) -> String {
    let json = match &result {
        Ok(outcome) => ParseVerdictOutput::new(g, Ok(outcome)).to_json(),
        Err(Error::Syntax(e)) => ParseVerdictOutput::new(g, Err(e)).to_json(),
        Err(e) => return error_json(e),
    };
    json.unwrap_or_else(error_json)
}

#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, source: &str) -> String {
    match Grammar::parse(grammar) {
        Ok(g) => {
            let result = parse_source(&g, source);
            verdict_json(&g, result)
        }
        Err(e) => error_json(e),
    }
}

/// Parses tokens given as a JSON array of `{terminal, text, offset}`.
#[wasm_bindgen]
pub fn parse_tokens_to_json(grammar: &str, tokens: &str) -> String {
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_json(e),
    };
    let tokens: Vec<Token> = match serde_json::from_str(tokens) {
        Ok(tokens) => tokens,
        Err(e) => return error_json(e),
    };
    let analysis = Analysis::new(&g);
    let result = LL1Table::new(&g, &analysis)
        .map_err(Error::from)
        .and_then(|table| table.parse(&tokens).map_err(Error::from));
    verdict_json(&g, result)
}

#[cfg(test)]
mod wasm_surface_tests {
    use super::*;
    use crate::grammar::DECL_BLOCK_GRAMMAR;

    #[test]
    fn nullable_first_follow_json() {
        let json = nullable_first_follow_to_json(DECL_BLOCK_GRAMMAR);
        assert!(json.contains(r#"{"name":"I'","nullable":true,"first":[",","ε"],"follow":[":"]}"#));
    }

    #[test]
    fn malformed_grammar_json() {
        assert_eq!(
            select_to_json("S -> a -> b"),
            r#"{"error":"line 1: too many \"->\""}"#
        );
    }

    #[test]
    fn ll1_check_json() {
        assert_eq!(
            ll1_check_to_json(DECL_BLOCK_GRAMMAR),
            r#"{"ll1":true,"conflicts":[]}"#
        );
    }

    #[test]
    fn parse_source_json() {
        let json = parse_to_json(DECL_BLOCK_GRAMMAR, "var a, b: integer; #");
        assert!(json.starts_with(r#"{"accepted":true,"derivation":["S -> Var D""#));

        let json = parse_to_json(DECL_BLOCK_GRAMMAR, "var a: integer");
        assert!(json.contains(r#""kind":"UnexpectedToken""#), "{}", json);
        assert!(json.contains(r#""expected":[";"]"#), "{}", json);
    }

    #[test]
    fn parse_tokens_json() {
        let tokens = serde_json::to_string(&Token::from_terminals(&["Var", ":", "t", ";", "#"]))
            .unwrap();
        let json = parse_tokens_to_json(DECL_BLOCK_GRAMMAR, &tokens);
        assert!(json.contains(r#""accepted":false"#));
        assert!(json.contains(r#""position":1"#));
    }

    #[test]
    fn text_after_end_mark_json() {
        let json = parse_to_json(DECL_BLOCK_GRAMMAR, "# var a: integer;");
        assert!(json.contains(r#""kind":"TrailingInput""#), "{}", json);
    }

    #[test]
    fn declarations_json() {
        let json = declarations_to_json("var a, b: integer;");
        assert!(json.contains(r#""b":{"name":"b","type_name":"integer","offset":7}"#), "{}", json);
        assert_eq!(
            declarations_to_json("var a: integer; a: real;"),
            r#"{"error":"duplicate identifier `a`"}"#
        );
    }

    #[test]
    fn lex_error_json() {
        assert_eq!(
            parse_to_json(DECL_BLOCK_GRAMMAR, "var a = 1"),
            r#"{"error":"unexpected character `=`"}"#
        );
    }
}
