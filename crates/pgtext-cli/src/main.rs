//! pgtext CLI - Render logical replication changes as text
//!
//! Reads change events from stdin, one per line, and writes one record per
//! line to stdout. Logs go to stderr.
//!
//! ```text
//! pgtext --dialect plain --include-xids < events.jsonl
//! pgtext --input pgoutput < messages.hex
//! ```

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, ValueEnum};
use pgtext::postgres::PgOutputAdapter;
use pgtext::{
    BeginPolicy, ChangeEvent, ChangeFormatter, DecodingError, Dialect, FormatterConfig, RecordSink,
    WriterSink,
};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pgtext")]
#[command(about = "Render PostgreSQL logical replication changes as JSON or test_decoding-style text")]
#[command(version)]
struct Cli {
    /// YAML formatter configuration; flags override its values
    #[arg(short, long, env = "PGTEXT_CONFIG")]
    config: Option<PathBuf>,

    /// Output dialect (json, plain)
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// BEGIN emission policy (eager, lazy)
    #[arg(long)]
    begin_policy: Option<BeginPolicy>,

    /// Print xids on BEGIN and COMMIT (plain dialect)
    #[arg(long)]
    include_xids: bool,

    /// Print the commit timestamp on COMMIT (plain dialect)
    #[arg(long)]
    include_timestamp: bool,

    /// Drop COMMIT for transactions without row changes (lazy policy)
    #[arg(long)]
    skip_empty_commit: bool,

    /// Input format read from stdin
    #[arg(short, long, value_enum, default_value_t = InputFormat::Events)]
    input: InputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// JSON lines of change events
    Events,
    /// One hex-encoded pgoutput message per line
    Pgoutput,
}

impl Cli {
    /// Merge the config file and the command line flags.
    fn formatter_config(&self) -> Result<FormatterConfig> {
        let base = match &self.config {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                FormatterConfig::from_yaml_str(&yaml)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => FormatterConfig::default(),
        };

        let dialect = self.dialect.unwrap_or(base.dialect);
        let begin_policy = match (self.begin_policy, self.dialect) {
            (Some(policy), _) => policy,
            // a dialect given on the command line brings its own default policy
            (None, Some(dialect)) if dialect != base.dialect => dialect.default_begin_policy(),
            (None, _) => base.begin_policy,
        };

        let config = FormatterConfig::builder()
            .dialect(dialect)
            .begin_policy(begin_policy)
            .skip_empty_commit(self.skip_empty_commit || base.skip_empty_commit)
            .include_xids(self.include_xids || base.include_xids)
            .include_timestamp(self.include_timestamp || base.include_timestamp)
            .build()
            .context("Invalid formatter configuration")?;
        Ok(config)
    }
}

/// Turns input lines into change events.
enum EventSource {
    Events,
    Pgoutput(PgOutputAdapter),
}

impl EventSource {
    fn new(input: InputFormat) -> Self {
        match input {
            InputFormat::Events => Self::Events,
            InputFormat::Pgoutput => Self::Pgoutput(PgOutputAdapter::new()),
        }
    }

    fn next_event(&mut self, line: &str) -> Result<Option<ChangeEvent>> {
        match self {
            Self::Events => {
                let event = serde_json::from_str(line).context("Invalid change event")?;
                Ok(Some(event))
            }
            Self::Pgoutput(adapter) => {
                let raw = hex::decode(line).context("Invalid hex")?;
                let event = adapter
                    .decode_and_apply(&mut Bytes::from(raw))
                    .context("Invalid pgoutput message")?;
                Ok(event)
            }
        }
    }
}

fn run<R: BufRead, S: RecordSink>(
    input: R,
    source: &mut EventSource,
    formatter: &mut ChangeFormatter,
    sink: &mut S,
) -> Result<u64> {
    let mut events = 0;
    for (number, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(event) = source
            .next_event(line)
            .with_context(|| format!("Line {}", number + 1))?
        else {
            continue;
        };
        formatter
            .handle(&event, sink)
            .with_context(|| format!("Line {}: failed to write record", number + 1))?;
        events += 1;
    }
    Ok(events)
}

/// `category/code` of the library error behind a failure, if there is one.
fn failure_label(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DecodingError>())
        .map(|cause| format!("{}/{}", cause.category(), cause.error_code()))
}

fn main() -> Result<()> {
    // Initialize tracing; stdout carries the records
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.formatter_config()?;
    info!(
        "Formatting {:?} input as {} (begin policy {})",
        cli.input, config.dialect, config.begin_policy
    );

    let mut source = EventSource::new(cli.input);
    let mut formatter = ChangeFormatter::new(config);
    let mut sink = WriterSink::new(BufWriter::new(io::stdout().lock()));

    let stdin = io::stdin();
    let events = match run(stdin.lock(), &mut source, &mut formatter, &mut sink) {
        Ok(events) => events,
        Err(err) => {
            if let Some(label) = failure_label(&err) {
                error!("Stopping on {} error", label);
            }
            return Err(err);
        }
    };
    sink.into_inner()
        .flush()
        .context("Failed to flush output")?;

    debug!("Processed {} events: {}", events, formatter.stats().summary());
    Ok(())
}
