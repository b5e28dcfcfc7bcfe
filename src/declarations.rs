use std::collections::BTreeMap;

use crowbook_text_processing::escape;
use log::debug;
use serde::Serialize;

use crate::error::DuplicateIdentifier;
use crate::grammar::pretty_print::{align_table, Render};
use crate::token::Token;

const IDENTIFIER: &str = "i";
const TYPE_NAME: &str = "t";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Spelling of the first declaration.
    pub name: String,
    pub type_name: String,
    pub offset: usize,
}

/// Variables bound by an accepted declaration block, keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclarationTable {
    declarations: BTreeMap<String, Declaration>,
}

impl DeclarationTable {
    /// Binds each identifier to the type closing its declaration line.
    ///
    /// Identifiers compare case-insensitively. Expects tokens the parser has
    /// already accepted, e.g. [`ParseOutcome::matched`].
    ///
    /// [`ParseOutcome::matched`]: crate::grammar::ParseOutcome::matched
    pub fn collect(tokens: &[Token]) -> Result<Self, DuplicateIdentifier> {
        let mut table = Self::default();
        let mut pending: Vec<&Token> = Vec::new();
        for token in tokens {
            match token.terminal.as_str() {
                IDENTIFIER => pending.push(token),
                TYPE_NAME => {
                    for ident in pending.drain(..) {
                        table.bind(ident, &token.text)?;
                    }
                }
                _ => {}
            }
        }
        debug!("{} declarations", table.len());
        Ok(table)
    }

    fn bind(&mut self, ident: &Token, type_name: &str) -> Result<(), DuplicateIdentifier> {
        let key = ident.text.to_lowercase();
        if let Some(first) = self.declarations.get(&key) {
            return Err(DuplicateIdentifier {
                name: ident.text.clone(),
                offset: ident.offset,
                first_offset: first.offset,
            });
        }
        self.declarations.insert(
            key,
            Declaration {
                name: ident.text.clone(),
                type_name: type_name.to_lowercase(),
                offset: ident.offset,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(&name.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> + '_ {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Render for DeclarationTable {
    fn to_plaintext(&self) -> String {
        let rows: Vec<Vec<String>> = std::iter::once(vec!["Name".to_string(), "Type".to_string()])
            .chain(self.iter().map(|d| vec![d.name.clone(), d.type_name.clone()]))
            .collect();
        align_table(&rows)
    }

    fn to_latex(&self) -> String {
        let content = self
            .iter()
            .map(|d| format!("{} & {}", escape::tex(&d.name), escape::tex(&d.type_name)))
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{l|l}\n".to_string()
            + "Name & Type\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}
