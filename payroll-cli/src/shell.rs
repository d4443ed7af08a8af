//! Interactive command loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use payroll_core::{CalculatorSession, OperationMode};
use tracing::{debug, info};

use crate::{app, display};

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

const HELP: &str = "\
Команды:
  positions          список должностей
  contributions      применяемые взносы
  operations         типы операций
  select N           выбрать должность по номеру в списке
  mode net|contrib   что рассчитывать
  calc               рассчитать
  save               сохранить последний расчёт
  last               последняя операция
  history [N]        последние N операций
  reload             перечитать справочники
  help               эта справка
  quit               выход";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Positions,
    Contributions,
    Operations,
    Select(usize),
    Mode(OperationMode),
    Calc,
    Save,
    Last,
    History(u32),
    Reload,
    Help,
    Quit,
}

impl ShellCommand {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("слишком много аргументов: {}", line.trim()));
        }

        let command = match (name.to_ascii_lowercase().as_str(), arg) {
            ("positions", None) => Self::Positions,
            ("contributions", None) => Self::Contributions,
            ("operations", None) => Self::Operations,
            ("select", Some(n)) => Self::Select(
                n.parse()
                    .map_err(|_| format!("номер должности должен быть числом: {n}"))?,
            ),
            ("mode", Some(m)) => Self::Mode(
                OperationMode::parse(m).ok_or_else(|| format!("неизвестный режим: {m}"))?,
            ),
            ("calc", None) => Self::Calc,
            ("save", None) => Self::Save,
            ("last", None) => Self::Last,
            ("history", None) => Self::History(DEFAULT_HISTORY_LIMIT),
            ("history", Some(n)) => Self::History(
                n.parse()
                    .map_err(|_| format!("количество должно быть числом: {n}"))?,
            ),
            ("reload", None) => Self::Reload,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("select" | "mode", None) => return Err(format!("{name}: не хватает аргумента")),
            (
                "positions" | "contributions" | "operations" | "calc" | "save" | "last" | "reload"
                | "help" | "quit" | "exit",
                Some(extra),
            ) => return Err(format!("{name}: лишний аргумент {extra}")),
            (_, _) => return Err(format!("неизвестная команда: {name} (help — справка)")),
        };
        Ok(Some(command))
    }
}

fn print_status<W: Write>(
    session: &CalculatorSession,
    out: &mut W,
) -> Result<()> {
    match (session.selected_position(), session.selected_salary()) {
        (Some(position), Some(salary)) => writeln!(
            out,
            "Должность: {} ({}), режим: {}",
            position.name,
            display::rub(salary),
            session.mode().label()
        )?,
        _ => writeln!(out, "Должность не выбрана, режим: {}", session.mode().label())?,
    }
    Ok(())
}

async fn execute<W: Write>(
    session: &mut CalculatorSession,
    command: ShellCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        ShellCommand::Positions => app::print_positions(session, out),
        ShellCommand::Contributions => app::print_contributions(session, out),
        ShellCommand::Operations => app::print_operations(session, out).await,
        ShellCommand::Select(index) => {
            session.select_position(index)?;
            print_status(session, out)
        }
        ShellCommand::Mode(mode) => {
            session.set_mode(mode);
            print_status(session, out)
        }
        ShellCommand::Calc => app::calculate_and_report(session, false, out).await,
        ShellCommand::Save => app::save_and_report(session, out).await,
        ShellCommand::Last => app::print_last(session, out).await,
        ShellCommand::History(limit) => app::print_history(session, limit, out).await,
        ShellCommand::Reload => {
            session.reload().await?;
            writeln!(
                out,
                "Справочники обновлены: {} должностей",
                session.reference().positions().len()
            )?;
            print_status(session, out)
        }
        ShellCommand::Help => {
            writeln!(out, "{HELP}")?;
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    }
}

/// Read commands from `input` until `quit` or end of input.
///
/// Failed commands are reported on `out` and the loop continues.
pub async fn run<R: BufRead, W: Write>(
    session: &mut CalculatorSession,
    input: R,
    out: &mut W,
) -> Result<()> {
    if !session.can_save() {
        writeln!(out, "Сохранение недоступно: нет подключения к базе данных")?;
    }
    print_status(session, out)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        debug!(?command, "shell command");

        if command == ShellCommand::Quit {
            break;
        }
        if let Err(error) = execute(session, command, out).await {
            app::report_error(out, &error)?;
        }
    }

    info!("shell closed");
    Ok(())
}
