use crowbook_text_processing::escape::tex as escape_tex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::Grammar;

use super::{
    pretty_print::{align_table, ProductionOutput, Render},
    Analysis,
};

/// LL(1) table for display. Cells list every production selected on their
/// terminal, so conflicts of non-LL(1) grammars show up as crowded cells.
#[derive(Serialize)]
pub struct LL1ParsingTable<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
}

impl LL1ParsingTable<'_> {
    pub fn has_conflicts(&self) -> bool {
        self.rows
            .iter()
            .any(|(_, row)| row.iter().any(|cell| cell.rights.len() > 1))
    }
}

impl Render for LL1ParsingTable<'_> {
    fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.chars().count(), false)),
            );
            output.push(line);
        }
        align_table(&output)
    }

    fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape_tex(t))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape_tex(*left).to_string()];
            line.extend(row.iter().map(|productions| {
                let cell = productions.to_latex(false, &terminal_set);
                if productions.rights.len() > 1 {
                    format!("{{\\color{{red}}{}}}", cell)
                } else {
                    cell
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl Grammar {
    pub fn to_ll1_parsing_table(&self, analysis: &Analysis) -> LL1ParsingTable<'_> {
        let terminals: Vec<usize> = self.terminal_iter().collect();
        let map: HashMap<usize, usize> = terminals
            .iter()
            .enumerate()
            .map(|(col, &t)| (t, col))
            .collect();

        let mut rows: Vec<(&str, Vec<ProductionOutput>)> = Vec::new();
        for nt in self.non_terminal_iter() {
            let left = self.get_symbol_name(nt);
            let mut row: Vec<ProductionOutput> = vec![
                ProductionOutput {
                    left,
                    rights: Vec::new()
                };
                terminals.len()
            ];
            for production in self.productions_of(nt) {
                for col in analysis.select(production.index).iter().map(|t| map[t]) {
                    row[col]
                        .rights
                        .push(self.production_to_vec_str(production));
                }
            }
            rows.push((left, row));
        }

        LL1ParsingTable {
            terminals: terminals.iter().map(|&t| self.get_symbol_name(t)).collect(),
            rows,
        }
    }
}
