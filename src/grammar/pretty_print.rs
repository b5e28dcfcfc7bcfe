use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use crate::error::{Conflict, SyntaxError};

use super::{Analysis, Grammar, ParseAction, ParseOutcome, EPSILON};

/// Plain text, LaTeX and JSON renderings of an output table.
pub trait Render: Serialize {
    fn to_plaintext(&self) -> String;

    fn to_latex(&self) -> String;

    fn to_json(&self) -> serde_json::Result<String>
    where
        Self: Sized,
    {
        serde_json::to_string(self)
    }
}

/// Right-aligns every column and joins cells with ` | `.
pub(crate) fn align_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            rows.iter()
                .filter_map(|row| row.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    rows.iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn tex_symbol(s: &str, terminals: &HashSet<&str>) -> String {
    if s == EPSILON {
        "\\epsilon".to_string()
    } else if terminals.contains(s) {
        format!("\\text{{{}}}", escape::tex(s))
    } else {
        escape::tex(s).to_string()
    }
}

fn tex_set(a: &[&str]) -> String {
    a.iter()
        .map(|s| {
            if *s == EPSILON {
                "$\\epsilon$".to_string()
            } else {
                escape::tex(*s).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(r"\ ")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminals: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow & ", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| tex_symbol(s, terminals))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

impl Grammar {
    pub(crate) fn terminal_name_set(&self) -> HashSet<&str> {
        self.terminal_iter().map(|t| self.get_symbol_name(t)).collect()
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl Render for ProductionOutputVec<'_> {
    fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec<'_> {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: self.get_symbol_name(nt),
                rights: self
                    .productions_of(nt)
                    .map(|p| self.production_to_vec_str(p))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.nullable.to_string(),
            self.first.join(", "),
            self.follow.join(", "),
        ]
    }

    fn to_latex(&self) -> String {
        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            tex_set(&self.first),
            tex_set(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl Render for NonTerminalOutputVec<'_> {
    fn to_plaintext(&self) -> String {
        let header: Vec<String> = ["Symbol", "Nullable", "First", "Follow"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows: Vec<Vec<String>> = std::iter::once(header)
            .chain(self.data.iter().map(|s| s.to_plaintext()))
            .collect();
        align_table(&rows)
    }

    fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec(&self, analysis: &Analysis) -> NonTerminalOutputVec<'_> {
        let data = self
            .non_terminal_iter()
            .map(|nt| {
                let first = analysis.first(nt);
                let mut t = NonTerminalOutput {
                    name: self.get_symbol_name(nt),
                    nullable: analysis.is_nullable(nt),
                    first: self.terminal_names(&first.terminals),
                    follow: self.terminal_names(analysis.follow(nt)),
                };
                if first.epsilon {
                    t.first.push(EPSILON);
                }
                t
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
struct SelectOutput<'a> {
    production: ProductionOutput<'a>,
    select: Vec<&'a str>,
}

#[derive(Serialize)]
pub struct SelectOutputVec<'a> {
    data: Vec<SelectOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl Render for SelectOutputVec<'_> {
    fn to_plaintext(&self) -> String {
        let left_max_len = self
            .data
            .iter()
            .map(|s| s.production.left.chars().count())
            .max()
            .unwrap_or(0);
        let rows: Vec<Vec<String>> = std::iter::once(vec![
            "Production".to_string(),
            "Select".to_string(),
        ])
        .chain(self.data.iter().map(|s| {
            vec![
                s.production.to_plaintext(left_max_len, false),
                s.select.join(", "),
            ]
        }))
        .collect();
        align_table(&rows)
    }

    fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|s| {
                format!(
                    "${}$ & {}",
                    s.production.to_latex(false, &self.terminals),
                    tex_set(&s.select)
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{l|l}\n".to_string()
            + "Production & Select\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_select_output_vec(&self, analysis: &Analysis) -> SelectOutputVec<'_> {
        let data = self
            .non_terminal_iter()
            .flat_map(|nt| self.productions_of(nt))
            .map(|p| SelectOutput {
                production: ProductionOutput {
                    left: self.get_symbol_name(p.left),
                    rights: vec![self.production_to_vec_str(p)],
                },
                select: self.terminal_names(analysis.select(p.index)),
            })
            .collect();
        SelectOutputVec {
            data,
            terminals: self.terminal_name_set(),
        }
    }
}

#[derive(Serialize)]
pub struct LL1CheckOutput<'a> {
    ll1: bool,
    conflicts: &'a [Conflict],
}

impl LL1CheckOutput<'_> {
    pub fn is_ll1(&self) -> bool {
        self.ll1
    }
}

impl Render for LL1CheckOutput<'_> {
    fn to_plaintext(&self) -> String {
        if self.ll1 {
            return "LL(1): yes".to_string();
        }
        std::iter::once("LL(1): no".to_string())
            .chain(self.conflicts.iter().map(|c| format!("  {}: {}", c.non_terminal, c)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_latex(&self) -> String {
        if self.ll1 {
            return "The grammar is LL(1).".to_string();
        }
        let items = self
            .conflicts
            .iter()
            .map(|c| {
                format!(
                    "\\item $\\mathrm{{Select}}({}) \\cap \\mathrm{{Select}}({}) = \\{{{}\\}}$",
                    escape::tex(&c.productions[0]).replace("->", "\\rightarrow"),
                    escape::tex(&c.productions[1]).replace("->", "\\rightarrow"),
                    c.terminals
                        .iter()
                        .map(|t| format!("\\text{{{}}}", escape::tex(t)))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "The grammar is not LL(1):\n\\begin{{itemize}}\n{}\n\\end{{itemize}}",
            items
        )
        .replace(EPSILON, "\\epsilon")
    }
}

impl Grammar {
    pub fn to_ll1_check_output<'a>(&self, analysis: &'a Analysis) -> LL1CheckOutput<'a> {
        LL1CheckOutput {
            ll1: analysis.is_ll1(),
            conflicts: analysis.conflicts(),
        }
    }
}

#[derive(Serialize)]
struct TraceRow {
    stack: String,
    input: String,
    action: String,
}

#[derive(Serialize)]
pub struct ParseTraceOutput {
    steps: Vec<TraceRow>,
}

impl ParseTraceOutput {
    pub fn new(grammar: &Grammar, outcome: &ParseOutcome) -> Self {
        let steps = outcome
            .steps
            .iter()
            .map(|step| TraceRow {
                stack: step
                    .stack
                    .iter()
                    .map(|&s| grammar.get_symbol_name(s))
                    .collect::<Vec<_>>()
                    .join(" "),
                input: outcome
                    .matched
                    .get(step.position..)
                    .unwrap_or(&[])
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                action: match &step.action {
                    ParseAction::Expand { production } => {
                        grammar.production_to_string(*production)
                    }
                    ParseAction::Match { terminal } => format!("match {}", terminal),
                    ParseAction::Accept => "accept".to_string(),
                },
            })
            .collect();
        Self { steps }
    }
}

impl Render for ParseTraceOutput {
    fn to_plaintext(&self) -> String {
        let rows: Vec<Vec<String>> = std::iter::once(vec![
            "Stack".to_string(),
            "Input".to_string(),
            "Action".to_string(),
        ])
        .chain(
            self.steps
                .iter()
                .map(|r| vec![r.stack.clone(), r.input.clone(), r.action.clone()]),
        )
        .collect();
        align_table(&rows)
    }

    fn to_latex(&self) -> String {
        let content = self
            .steps
            .iter()
            .map(|r| {
                format!(
                    "{} & {} & {}",
                    escape::tex(&r.stack),
                    escape::tex(&r.input),
                    escape::tex(&r.action)
                        .replace("->", "$\\rightarrow$")
                        .replace(EPSILON, "$\\epsilon$")
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");
        "\\begin{tabular}{r|r|l}\n".to_string()
            + "Stack & Input & Action\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

/// Accept/reject verdict of one parse.
#[derive(Serialize)]
pub struct ParseVerdictOutput<'a> {
    accepted: bool,
    derivation: Vec<String>,
    error: Option<&'a SyntaxError>,
}

impl<'a> ParseVerdictOutput<'a> {
    pub fn new(grammar: &Grammar, result: Result<&ParseOutcome, &'a SyntaxError>) -> Self {
        match result {
            Ok(outcome) => Self {
                accepted: true,
                derivation: outcome
                    .derivation
                    .iter()
                    .map(|&p| grammar.production_to_string(p))
                    .collect(),
                error: None,
            },
            Err(e) => Self {
                accepted: false,
                derivation: Vec::new(),
                error: Some(e),
            },
        }
    }
}

impl Render for ParseVerdictOutput<'_> {
    fn to_plaintext(&self) -> String {
        match self.error {
            None => std::iter::once("accept".to_string())
                .chain(self.derivation.iter().map(|p| format!("  {}", p)))
                .collect::<Vec<_>>()
                .join("\n"),
            Some(e) => format!("reject: {}", e),
        }
    }

    fn to_latex(&self) -> String {
        match self.error {
            None => std::iter::once("\\[\\begin{array}{l}".to_string())
                .chain(self.derivation.iter().map(|p| {
                    escape::tex(p)
                        .replace("->", "\\rightarrow")
                        .replace(EPSILON, "\\epsilon")
                }))
                .chain(std::iter::once("\\end{array}\\]".to_string()))
                .collect::<Vec<_>>()
                .join("\\\\\n"),
            Some(e) => format!("reject: {}", escape::tex(&e.to_string())),
        }
    }
}
