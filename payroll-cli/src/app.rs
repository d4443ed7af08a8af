//! Wiring between the command line and the payroll session.

use std::io::Write;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use payroll_core::db::{DbConfig, RepositoryRegistry};
use payroll_core::{CalculatorSession, OperationMode, PayrollError};
use payroll_db_mysql::MySqlRepositoryFactory;
use payroll_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, warn};

use crate::config::{Overrides, Settings};
use crate::{display, logging};

/// Resolve settings and install logging.
///
/// Failures here are the only ones that end the process with a non-zero
/// status; everything after startup is reported and the program carries on.
pub fn startup(
    overrides: &Overrides,
    config_path: Option<&Path>,
) -> Result<Settings> {
    let settings = Settings::load(overrides, config_path)?;
    logging::init(&settings.log_level, settings.log_file.as_deref())
        .context("failed to initialize logging")?;
    debug!(?settings, "configuration resolved");
    Ok(settings)
}

/// Registry with every backend this binary was built with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(MySqlRepositoryFactory));
    registry
}

/// Open the configured store and load reference data.
///
/// Never fails outright: when the store cannot be opened the session comes
/// back disconnected, and the error is returned alongside it for display.
pub async fn open_session(
    registry: &RepositoryRegistry,
    config: &DbConfig,
) -> (CalculatorSession, Option<PayrollError>) {
    debug!(backend = %config.backend, "connecting");
    match registry.create(config).await {
        Ok(repo) => {
            let (session, loaded) = CalculatorSession::connect(repo).await;
            (session, loaded.err())
        }
        Err(e) => {
            warn!(error = %e, "data source unavailable");
            (
                CalculatorSession::disconnected(),
                Some(PayrollError::DataSource(e)),
            )
        }
    }
}

/// Print a command failure. Payroll errors get a severity heading, and
/// the ones retrying cannot fix get a reconnect hint.
pub fn report_error<W: Write>(
    out: &mut W,
    error: &anyhow::Error,
) -> Result<()> {
    match error.downcast_ref::<PayrollError>() {
        Some(e) => {
            writeln!(out, "{}", display::error_line(e))?;
            if !e.is_recoverable() {
                writeln!(out, "{}", display::RECONNECT_HINT)?;
            }
        }
        None => writeln!(out, "Ошибка: {error:#}")?,
    }
    Ok(())
}

pub fn print_positions<W: Write>(
    session: &CalculatorSession,
    out: &mut W,
) -> Result<()> {
    let positions = session.reference().positions();
    if positions.is_empty() {
        writeln!(out, "Должности не загружены")?;
    }
    for (index, position) in positions.iter().enumerate() {
        writeln!(out, "{}", display::position_line(index, position))?;
    }
    Ok(())
}

pub fn print_contributions<W: Write>(
    session: &CalculatorSession,
    out: &mut W,
) -> Result<()> {
    let reference = session.reference();
    for contribution in reference.contributions() {
        writeln!(out, "{}", display::contribution_line(contribution))?;
    }
    writeln!(out, "Итого: {}%", reference.total_percent()?.normalize())?;
    Ok(())
}

pub async fn print_operations<W: Write>(
    session: &CalculatorSession,
    out: &mut W,
) -> Result<()> {
    for operation in session.operation_types().await? {
        writeln!(out, "{}", display::operation_line(&operation))?;
    }
    Ok(())
}

/// Compute and print the result for the session's current selection,
/// then save it when `save` is set.
pub async fn calculate_and_report<W: Write>(
    session: &mut CalculatorSession,
    save: bool,
    out: &mut W,
) -> Result<()> {
    let result = session.calculate()?;
    writeln!(out, "{}", display::result_line(result))?;
    writeln!(out, "{}", display::result_details(result))?;

    if save {
        save_and_report(session, out).await?;
    }
    Ok(())
}

/// One-shot `calculate` command.
pub async fn calculate<W: Write>(
    session: &mut CalculatorSession,
    index: usize,
    mode: OperationMode,
    save: bool,
    out: &mut W,
) -> Result<()> {
    session.select_position(index)?;
    session.set_mode(mode);
    calculate_and_report(session, save, out).await
}

pub async fn save_and_report<W: Write>(
    session: &mut CalculatorSession,
    out: &mut W,
) -> Result<()> {
    let outcome = session.save().await?;
    for line in display::save_report(&outcome, &Local) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub async fn print_last<W: Write>(
    session: &CalculatorSession,
    out: &mut W,
) -> Result<()> {
    match session.last_operation().await? {
        Some(operation) => writeln!(out, "{}", display::last_operation_block(&operation, &Local))?,
        None => writeln!(out, "Журнал операций пуст")?,
    }
    Ok(())
}

pub async fn print_history<W: Write>(
    session: &CalculatorSession,
    limit: u32,
    out: &mut W,
) -> Result<()> {
    let operations = session.history(limit).await?;
    if operations.is_empty() {
        writeln!(out, "Журнал операций пуст")?;
    }
    for operation in &operations {
        writeln!(out, "{}", display::history_line(operation, &Local))?;
    }
    Ok(())
}
