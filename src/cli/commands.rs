use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::{LevelFilter, info};

use crate::output::{StreamingSink, write_json, write_transcript};
use crate::parsers::{filter_threads, parse_export};
use crate::utils::{describe_input, open_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated transcript
    Text,
    /// JSON array of threads
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "chat-thread-filter")]
#[command(version = "0.1.0")]
#[command(about = "Print conversations with one person from an exported chat history", long_about = None)]
pub struct Cli {
    /// Exported chat history HTML; reads standard input when omitted
    pub path: Option<PathBuf>,

    /// Name to look for in each thread's participants line (case-sensitive)
    #[arg(short, long, default_value = "")]
    pub person: String,

    /// Print each message as soon as it is parsed, in export order, unsorted
    #[arg(long, conflicts_with = "format")]
    pub stream: bool,

    /// Output format for the sorted transcript
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Log filter for a `-v` count; `RUST_LOG` still takes precedence
pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .filter_module("html5ever", LevelFilter::Error)
        .filter_module("markup5ever", LevelFilter::Error)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Parse the configured input and write the result to `out`
pub fn execute<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let source = describe_input(cli.path.as_deref());
    let reader = open_input(cli.path.as_deref())?;

    if cli.stream {
        let mut sink = StreamingSink::new(BufWriter::new(out));
        parse_export(reader, &cli.person, &mut sink)
            .with_context(|| format!("Failed to parse {}", source))?;
        info!("Streamed {} messages from {} threads", sink.messages(), sink.threads());
        sink.into_inner().flush().context("Failed to write output")?;
        return Ok(());
    }

    let threads = filter_threads(reader, &cli.person)
        .with_context(|| format!("Failed to parse {}", source))?;

    let messages: usize = threads.iter().map(|t| t.messages.len()).sum();
    info!("Matched {} threads ({} messages) for {:?}", threads.len(), messages, cli.person);

    match cli.format {
        OutputFormat::Text => write_transcript(out, &threads).context("Failed to write output")?,
        OutputFormat::Json => write_json(out, &threads)?,
    }

    Ok(())
}
