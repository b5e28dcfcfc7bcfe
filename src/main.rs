use std::{
    fs,
    io::{BufWriter, Read},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use decl_ll1::{
    error::LinePos,
    grammar::{
        pretty_print::{ParseTraceOutput, ParseVerdictOutput, Render},
        ParseOutcome,
    },
    Analysis, DeclarationTable, Error, Grammar, LL1Table, Lexicon, TokenDump,
};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow
    Nff,
    /// Select sets
    Select,
    /// LL(1) parsing table
    Ll1,
    /// LL(1) verdict with conflicts
    Check,
    /// Accept/reject verdict for the input
    Parse,
    /// Predictive parse steps for the input
    Trace,
    /// Declared variables and their types
    Decls,
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

#[derive(Parser)]
#[command(
    name = "decl-ll1",
    about = "LL(1) analysis and predictive parsing of variable declaration blocks"
)]
struct Args {
    #[arg(value_enum, required = true)]
    outputs: Vec<Output>,
    /// Grammar file; the built-in declaration block grammar if omitted
    #[arg(short, long)]
    grammar: Option<PathBuf>,
    /// Input file for `parse`, `trace` and `decls`; stdin if neither this nor --source is given
    #[arg(short, long, conflicts_with = "source")]
    input: Option<PathBuf>,
    /// Input text for `parse`, `trace` and `decls`
    #[arg(short, long)]
    source: Option<String>,
    /// Print in LaTeX format
    #[arg(short, long, conflicts_with = "json")]
    latex: bool,
    /// Print in JSON format
    #[arg(short, long)]
    json: bool,
    /// Write the tokens of an accepted input to this file as JSON
    #[arg(short, long)]
    output_file: Option<PathBuf>,
}

fn render<T: Render>(t: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Plain => t.to_plaintext(),
        OutputFormat::LaTeX => t.to_latex(),
        OutputFormat::JSON => t.to_json()?,
    })
}

fn read_source(args: &Args) -> Result<(String, String)> {
    if let Some(source) = &args.source {
        return Ok(("<source>".to_string(), source.clone()));
    }
    if let Some(path) = &args.input {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok((path.display().to_string(), content));
    }
    let mut content = String::new();
    std::io::stdin().read_to_string(&mut content)?;
    Ok(("<stdin>".to_string(), content))
}

fn write_to_output(output_file: &Path, outcome: &ParseOutcome) -> Result<()> {
    if let Some(dir) = output_file.parent() {
        fs::create_dir_all(dir)?;
    }
    let output = fs::File::create(output_file)
        .with_context(|| format!("failed to create {}", output_file.display()))?;
    TokenDump::new(&outcome.matched).write_pretty(BufWriter::new(output))?;
    info!("tokens written to {}", output_file.display());
    Ok(())
}

fn report(file_name: &str, content: &str, e: &Error) {
    match e.offset() {
        Some(offset) => eprintln!(
            "{}",
            LinePos::new(content).display_error(file_name, offset, &e.to_string())
        ),
        None => eprintln!("error: {}", e),
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    let format = if args.latex {
        OutputFormat::LaTeX
    } else if args.json {
        OutputFormat::JSON
    } else {
        OutputFormat::Plain
    };

    let g = match &args.grammar {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Grammar::parse(&text).with_context(|| format!("in {}", path.display()))?
        }
        None => Grammar::decl_block(),
    };
    info!("grammar has {} productions", g.productions().len());

    let analysis = Analysis::new(&g);

    let needs_source = args.output_file.is_some()
        || args
            .outputs
            .iter()
            .any(|o| matches!(o, Output::Parse | Output::Trace | Output::Decls));
    let parsed = if needs_source {
        let (file_name, content) = read_source(&args)?;
        let result = LL1Table::new(&g, &analysis)
            .map_err(Error::from)
            .and_then(|table| {
                let tokens = Lexicon::default().classify(&g, &content)?;
                Ok(table.parse(&tokens)?)
            });
        Some((file_name, content, result))
    } else {
        None
    };

    let mut failed = false;
    if let Some((file_name, content, Err(e))) = &parsed {
        failed = true;
        report(file_name, content, e);
    }

    for output in &args.outputs {
        match output {
            Output::Prod => println!("{}", render(&g.to_production_output_vec(), format)?),
            Output::Nff => println!(
                "{}",
                render(&g.to_non_terminal_output_vec(&analysis), format)?
            ),
            Output::Select => println!("{}", render(&g.to_select_output_vec(&analysis), format)?),
            Output::Ll1 => println!("{}", render(&g.to_ll1_parsing_table(&analysis), format)?),
            Output::Check => {
                let check = g.to_ll1_check_output(&analysis);
                failed |= !check.is_ll1();
                println!("{}", render(&check, format)?);
            }
            Output::Parse | Output::Trace | Output::Decls => {
                let Some((file_name, content, result)) = &parsed else {
                    continue;
                };
                match (result, output) {
                    (Ok(outcome), Output::Trace) => {
                        println!("{}", render(&ParseTraceOutput::new(&g, outcome), format)?)
                    }
                    (Ok(outcome), Output::Decls) => {
                        match DeclarationTable::collect(&outcome.matched) {
                            Ok(table) => println!("{}", render(&table, format)?),
                            Err(e) => {
                                failed = true;
                                report(file_name, content, &e.into());
                            }
                        }
                    }
                    (Ok(outcome), _) => {
                        println!("{}", render(&ParseVerdictOutput::new(&g, Ok(outcome)), format)?)
                    }
                    (Err(Error::Syntax(e)), Output::Parse) => {
                        println!("{}", render(&ParseVerdictOutput::new(&g, Err(e)), format)?)
                    }
                    (Err(_), _) => {}
                }
            }
        }
    }

    if let (Some(output_file), Some((_, _, Ok(outcome)))) = (&args.output_file, &parsed) {
        write_to_output(output_file, outcome)?;
    }

    if failed {
        bail!("checks failed");
    }
    Ok(())
}
