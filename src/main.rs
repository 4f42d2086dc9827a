use clap::Parser;
use scec::sink::{DocumentSink, FileSink, StdoutSink};
use scec::startup;
use std::path::PathBuf;
use tracing::info;

/// Turn a sentence describing an event into an iCalendar file
#[derive(Parser, Debug)]
#[command(name = "scec")]
#[command(version, about, long_about = None)]
struct Args {
    /// Event description, read from stdin when omitted
    text: Vec<String>,

    /// Where to save the .ics file (printed to stdout otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model name, overrides the configuration
    #[arg(long)]
    model: Option<String>,

    /// Model service URL, overrides the configuration
    #[arg(long)]
    endpoint: Option<String>,

    /// Request time as RFC 3339, defaults to now
    #[arg(long)]
    timestamp: Option<String>,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    let args = Args::parse();
    info!("Starting scec");

    // Load configuration
    let config = startup::load_config(args.config.as_deref(), args.model, args.endpoint)?;

    let text = startup::read_input(&args.text)?;
    let timestamp = startup::request_timestamp(args.timestamp.as_deref())?;
    let pipeline = startup::build_pipeline(&config)?;

    let document = startup::generate_with_retry(
        &pipeline,
        &text,
        timestamp,
        config.max_retries,
        config.retry_backoff_ms,
    )
    .await?;

    match args.output {
        Some(path) => FileSink::new(path).write(&document)?,
        None => StdoutSink.write(&document)?,
    }

    Ok(())
}
