// Command-line entry point for Errhound.

use anyhow::Result;
use clap::Parser;
use errhound::application::AuditUsecase;
use errhound::config::{AuditConfig, DEFAULT_TARGET_SYMBOL};
use errhound::domain::catalog::Catalog;
use errhound::infrastructure::{concurrency, load_artifacts, FlowValueResolver};
use errhound::ports::report::{JsonReporter, TextReporter};
use errhound::ports::ReportExporter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Program graph artifact file(s), JSON modules (can specify multiple)
    #[arg(short, long, required = true)]
    graph: Vec<String>,

    /// Catalog JSON mapping entry-point ids/names to linker symbols
    #[arg(short, long)]
    catalog: String,

    /// Position of the single catalog entry to analyze (out of range = all)
    #[arg(long)]
    api_id: Option<i64>,

    /// Linker symbol of the diagnostic-emitting function to search for
    #[arg(long, default_value = DEFAULT_TARGET_SYMBOL)]
    target_symbol: String,

    /// Argument position of the numeric diagnostic code operand
    #[arg(long, default_value_t = 1)]
    code_arg: usize,

    /// Argument position of the message operand
    #[arg(long, default_value_t = 3)]
    message_arg: usize,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = concurrency::init_thread_pool() {
        eprintln!("[Audit] Thread pool already initialized: {}", e);
    }

    // Catalog first: a malformed document must fail before the graph load.
    let catalog = Catalog::load(Path::new(&cli.catalog))?;
    let graph = load_artifacts(&cli.graph)?;

    let config = AuditConfig::new(cli.target_symbol.clone(), cli.code_arg, cli.message_arg);
    let resolver = FlowValueResolver::new();
    let usecase = AuditUsecase {
        graph: &graph,
        resolver: &resolver,
        config: &config,
    };

    let audits = usecase.run(&catalog, cli.api_id);

    let exporter: Box<dyn ReportExporter> = match cli.format.as_str() {
        "text" => Box::new(TextReporter),
        "json" => Box::new(JsonReporter),
        other => anyhow::bail!("Unknown output format: {}", other),
    };

    match &cli.output {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            exporter.export(&audits, &mut writer)?;
            writer.flush()?;
            println!("[Audit] Report written to {} (format: {})", path, cli.format);
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            exporter.export(&audits, &mut lock)?;
        }
    }

    let unknown = audits.iter().filter(|a| a.outcome.is_err()).count();
    if unknown > 0 {
        eprintln!("[Audit] {} catalog entries had unknown entry functions", unknown);
        std::process::exit(1);
    }

    Ok(())
}
