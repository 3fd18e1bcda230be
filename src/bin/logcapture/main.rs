// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use std::time::Duration;
use tokio::select;
use tokio::signal::unix::{SignalKind, signal};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tower::BoxError;
use tracing::metadata::LevelFilter;
use tracing::{error, info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use logcapture::exporters::file::BatchConfig;
use logcapture::init::args::{CaptureRun, ReformatRun, TailRun};
use logcapture::receivers::file::parser::VehicleLogParser;
use logcapture::receivers::file::{LogTail, TailConfig};
use logcapture::topology::reformat::Reformatter;
use logcapture::topology::schedule;
use logcapture::topology::worker::{CaptureWorker, WorkerKind};

const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Copy new bytes of a log file into an extract file
    Tail(TailRun),

    /// Rewrite extract files as batch records
    Reformat(ReformatRun),

    /// Tail a log file on a schedule, shipping each batch to a sink
    Capture(Box<CaptureRun>),

    /// Return version
    Version,
}

#[derive(Debug, Parser)]
#[command(name = "logcapture")]
#[command(bin_name = "logcapture")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true)]
struct Arguments {
    #[arg(
        value_enum,
        long,
        global = true,
        env = "LOGCAPTURE_LOG_FORMAT",
        default_value = "text"
    )]
    /// Log format
    log_format: LogFormatArg,

    #[arg(short, long, global = true, env = "LOGCAPTURE_VERBOSE")]
    /// Log at debug level unless RUST_LOG says otherwise
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

fn main() -> ExitCode {
    let opt = Arguments::parse();

    let command = match opt.command {
        Some(Commands::Version) => {
            println!("{}", get_version());
            return ExitCode::SUCCESS;
        }
        Some(command) => command,
        None => {
            // subcommand_required keeps us from getting here
            eprintln!("ERROR: Must specify a command");
            return ExitCode::from(2);
        }
    };

    let _guard = match setup_logging(&opt.log_format, opt.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ERROR: failed to setup logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let result = match command {
        Commands::Tail(run) => run_tail(run),
        Commands::Reformat(run) => run_reformat(run),
        Commands::Capture(run) => run_capture(*run),
        Commands::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = e, "Command failed.");
            ExitCode::from(1)
        }
    }
}

fn run_tail(run: TailRun) -> Result<(), BoxError> {
    let config = TailConfig::from(&run.tail);
    config.validate()?;

    match LogTail::new(config).tail(&run.source, &run.output)? {
        Some(extract) => println!("{}", extract.display()),
        None => info!(source = %run.source.display(), "Source has not changed, nothing written"),
    }
    Ok(())
}

fn run_reformat(run: ReformatRun) -> Result<(), BoxError> {
    let parser = match run.year {
        Some(year) => VehicleLogParser::with_year(year),
        None => VehicleLogParser::new(),
    };
    let config = BatchConfig::from(&run.batch_output);

    let stats = Reformatter::new(parser).append_batch(&run.extracts, &run.output, &config)?;
    info!(
        output = %run.output.display(),
        extracts = run.extracts.len(),
        records = stats.accepted,
        filtered = stats.filtered,
        rejected = stats.rejected,
        "Reformat complete"
    );
    Ok(())
}

#[tokio::main]
async fn run_capture(run: CaptureRun) -> Result<(), BoxError> {
    let tail_config = TailConfig::from(&run.tail);
    tail_config.validate()?;

    let job = run.job();
    let schedule = run.schedule(&chrono::Local::now())?;
    let sink = run.sink.build(job.batch_config.format)?;
    let kind = WorkerKind::from(run.worker);

    info!(
        source = %job.source.display(),
        worker = %kind,
        sink = sink.name(),
        version = get_version(),
        "Starting capture"
    );

    let worker = CaptureWorker::new(
        kind,
        LogTail::new(tail_config),
        Reformatter::default(),
        sink,
    );

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let mut capture =
        tokio::spawn(async move { schedule::run(&worker, &job, schedule, token).await });

    let summary = select! {
        res = &mut capture => res??,
        _ = signal_wait() => {
            info!("Shutdown signal received.");
            cancel.cancel();
            match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), &mut capture).await {
                Ok(res) => res??,
                Err(_) => {
                    warn!("Timed out waiting for the running cycle to finish");
                    capture.abort();
                    return Ok(());
                }
            }
        }
    };

    info!(
        cycles = summary.cycles,
        shipped = summary.shipped,
        "Capture finished"
    );
    Ok(())
}

type LoggerGuard = tracing_appender::non_blocking::WorkerGuard;

// Logs go to stderr; stdout carries command output such as extract paths.
fn setup_logging(log_format: &LogFormatArg, verbose: bool) -> Result<LoggerGuard, BoxError> {
    LogTracer::init()?;

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env()?
        .add_directive("hyper_util=warn".parse()?);

    if *log_format == LogFormatArg::Json {
        let app_name = format!("{}-{}", env!("CARGO_PKG_NAME"), get_version());
        let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);

        let subscriber = Registry::default()
            .with(filter)
            .with(JsonStorageLayer)
            .with(bunyan_formatting_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        use std::io;
        use std::io::IsTerminal;

        // Skip color codes when not in a terminal
        let use_ansi = io::stderr().is_terminal();

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_target(false)
            .with_level(true)
            .with_ansi(use_ansi)
            .compact();

        let subscriber = Registry::default().with(filter).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(guard)
}

fn get_version() -> String {
    // Set during CI
    let version_build = option_env!("BUILD_SHORT_SHA").unwrap_or("dev");

    format!("{}-{}", env!("CARGO_PKG_VERSION"), version_build)
}

async fn signal_wait() {
    let (mut sig_term, mut sig_int) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "Unable to listen for signals");
            return std::future::pending::<()>().await;
        }
    };

    select! {
        _ = sig_term.recv() => {},
        _ = sig_int.recv() => {},
    }
}
