use clap::{Parser, Subcommand};
use fosa::{
    checker::Checker,
    collector::Collector,
    config::Config,
    diagnostics::emit_diagnostics,
    events::UnitEvents,
    signature::SignatureMatcher,
    store::Store,
};
use std::{error::Error, path::PathBuf, process::ExitCode};
use tracing::info;

/// Checks `out->message()` calls against the argument lists their messages
/// declare, across separately compiled units.
#[derive(Parser, Debug)]
#[command(name = "fosa", version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record message declarations from each unit into the store
    Collect {
        #[arg(long, value_name = "PATH")]
        store: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        #[arg(value_name = "UNIT", required = true)]
        units: Vec<PathBuf>,
    },
    /// Check message calls in each unit against the store
    Check {
        #[arg(long, value_name = "PATH")]
        store: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        #[arg(value_name = "UNIT", required = true)]
        units: Vec<PathBuf>,
    },
    /// Print every stored message and its parameters
    List {
        #[arg(long, value_name = "PATH")]
        store: PathBuf,
    },
}

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {err}");
    }

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

/// `Ok(false)` when diagnostics were emitted.
fn run(command: Command) -> CliResult<bool> {
    match command {
        Command::Collect {
            store,
            config,
            units,
        } => collect(Store::new(store), config, &units),
        Command::Check {
            store,
            config,
            units,
        } => check(Store::new(store), config, &units),
        Command::List { store } => {
            print!("{}", Store::new(store).load()?);
            Ok(true)
        }
    }
}

fn collect(store: Store, config: Option<PathBuf>, units: &[PathBuf]) -> CliResult<bool> {
    // Declarations are stored verbatim, so only validate the config here.
    Config::load_optional(config.as_deref())?;

    let mut collector = Collector::from_store(&store)?;
    for path in units {
        collector.collect_unit(&UnitEvents::load(path)?);
    }
    let report = collector.finish(&store)?;
    info!(
        messages = report.registry.len(),
        persisted = report.persisted,
        "collection finished"
    );
    emit_diagnostics(&report.diagnostics);
    Ok(report.diagnostics.is_empty())
}

fn check(store: Store, config: Option<PathBuf>, units: &[PathBuf]) -> CliResult<bool> {
    let config = Config::load_optional(config.as_deref())?;
    let registry = store.load_nonempty()?;
    let checker = Checker::new(
        &registry,
        SignatureMatcher::new(config.match_rules()),
        config.name_resolver(),
    );

    let mut clean = true;
    for path in units {
        let diagnostics = checker.check_unit(&UnitEvents::load(path)?);
        emit_diagnostics(&diagnostics);
        clean &= diagnostics.is_empty();
    }
    Ok(clean)
}
