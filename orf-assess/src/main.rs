//! ORF Assess - score one reading attempt from the command line
//!
//! Reads an assessment input document (JSON, file or stdin), runs the
//! pipeline and prints the assessment as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, Level};

use orf_assess::{AssessConfig, AssessmentInput, AssessmentPipeline};
use orf_metrics::TraceLog;

#[derive(Parser, Debug)]
#[command(name = "orf-assess", version, about = "Assess an oral reading attempt")]
struct Args {
    /// Input document, or "-" for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append trace events to this JSONL file
    #[arg(long)]
    trace_log: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => AssessConfig::load_from(path),
        None => AssessConfig::load(),
    }
    .context("Failed to load configuration")?;
    info!("Configuration loaded from {}", config.config_path.display());

    let input = read_input(&args.input)?;
    let pipeline = AssessmentPipeline::new(&config)?;
    let output = pipeline.run(&input);

    if let Some(path) = args.trace_log.as_ref().or(config.trace_log_path.as_ref()) {
        let log = TraceLog::open(path)?;
        pipeline.record(&output, &log)?;
        info!("Trace written to {}", log.path().display());
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialize assessment")?;
    println!("{}", json);

    Ok(())
}

fn read_input(source: &str) -> Result<AssessmentInput> {
    let contents = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read input from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read input file: {}", source))?
    };

    AssessmentInput::from_json(&contents).context("Failed to parse assessment input")
}
