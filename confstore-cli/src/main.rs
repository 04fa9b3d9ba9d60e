//! CLI entrypoint for `confstore`.

mod cli;
mod commands;
mod error;
mod output;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use confstore::{ConfigStore, IntegrationReport};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Args, Command};
use crate::commands::Status;
use crate::error::CliError;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(Status::Success) => ExitCode::SUCCESS,
        Ok(Status::NotFound | Status::SourcesFailed) => ExitCode::from(1),
        Err(err) => {
            writeln!(std::io::stderr().lock(), "confstore: {err}").ok();
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<Status, CliError> {
    init_logging(args.verbose)?;
    let (store, report) = load_store(args);
    debug!(%report, "sources ingested");

    let mut stdout = std::io::stdout().lock();
    match &args.command {
        Command::Get { path, format } => commands::get(&store, path, *format, &mut stdout),
        Command::Export { format, out } => {
            commands::export(&store, *format, out.as_deref(), &mut stdout)
        }
        Command::Check => commands::check(&report, &mut stdout),
    }
}

fn load_store(args: &Args) -> (ConfigStore, IntegrationReport) {
    let mut store = ConfigStore::builder().strict(args.strict).build();
    if !args.protect.is_empty() {
        let mut protected = ConfigStore::new();
        let report = protected.integrate(args.protect.iter().cloned());
        debug!(%report, "protected sources ingested");
        store.set_protected(protected.export());
    }
    let report = store.integrate(args.source.iter().cloned());
    (store, report)
}

fn init_logging(verbose: bool) -> Result<(), CliError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| CliError::Logging(err.to_string()))
}
