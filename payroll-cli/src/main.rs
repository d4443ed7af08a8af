use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use payroll_core::OperationMode;
use tracing::info;

use payroll_cli::config::Overrides;
use payroll_cli::shell::DEFAULT_HISTORY_LIMIT;
use payroll_cli::{app, shell};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Payroll contribution calculator.
///
/// Loads positions and insurance contribution rates from the configured
/// database, computes net pay or total contributions, and records each saved
/// calculation in the operation log.
#[derive(Debug, Parser)]
#[command(name = "payroll", version)]
struct Cli {
    /// Database backend (`sqlite` or `mysql`).
    #[arg(long, global = true, env = "PAYROLL_DB_BACKEND")]
    backend: Option<String>,

    /// Connection string: a SQLite file path, `:memory:`, or a `mysql://` URL.
    #[arg(long, global = true, env = "PAYROLL_DATABASE_URL")]
    db: Option<String>,

    /// TOML config file. Defaults to `payroll.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true, env = "PAYROLL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Append log output to this file as well as stderr.
    #[arg(long, global = true, env = "PAYROLL_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List positions with their base salaries.
    Positions,
    /// List the contribution types applied to every calculation.
    Contributions,
    /// List operation types known to the store.
    Operations,
    /// Calculate for one position.
    Calculate {
        /// Index of the position as shown by `positions`.
        #[arg(long)]
        position: usize,

        /// `net-pay` or `total-contributions`.
        #[arg(long, default_value = "net-pay", value_parser = parse_mode)]
        mode: OperationMode,

        /// Write the result to the operation log.
        #[arg(long)]
        save: bool,
    },
    /// Show the most recent logged operation.
    Last,
    /// Show recent logged operations, newest first.
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Interactive mode (the default).
    Shell,
}

fn parse_mode(s: &str) -> Result<OperationMode, String> {
    OperationMode::parse(s).ok_or_else(|| format!("unknown mode '{s}' (net-pay, total-contributions)"))
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing `.env` is fine; it only seeds the environment clap reads.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let overrides = Overrides {
        backend: cli.backend,
        database_url: cli.db,
        log_level: cli.log_level,
        log_file: cli.log_file,
    };
    let settings = app::startup(&overrides, cli.config.as_deref())?;

    let registry = app::build_registry();
    let (mut session, startup_error) = app::open_session(&registry, &settings.db).await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let startup_failed = startup_error.is_some();
    if let Some(error) = startup_error {
        app::report_error(&mut out, &anyhow::Error::new(error))?;
    }

    let command = cli.command.unwrap_or(Command::Shell);
    if startup_failed && !matches!(command, Command::Shell) {
        return Ok(());
    }

    let result = match command {
        Command::Positions => app::print_positions(&session, &mut out),
        Command::Contributions => app::print_contributions(&session, &mut out),
        Command::Operations => app::print_operations(&session, &mut out).await,
        Command::Calculate {
            position,
            mode,
            save,
        } => app::calculate(&mut session, position, mode, save, &mut out).await,
        Command::Last => app::print_last(&session, &mut out).await,
        Command::History { limit } => app::print_history(&session, limit, &mut out).await,
        Command::Shell => shell::run(&mut session, io::stdin().lock(), &mut out).await,
    };

    if let Err(error) = result {
        app::report_error(&mut out, &error)?;
    }
    out.flush()?;
    info!("done");
    Ok(())
}
