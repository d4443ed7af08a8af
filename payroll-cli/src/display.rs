//! Text rendering for everything the binary prints.

use std::fmt::Display;

use chrono::TimeZone;
use payroll_core::calculations::common::format_money;
use payroll_core::{
    CalculationResult, ContributionType, LoggedOperation, OperationType, PayrollError, Position,
    SaveOutcome,
};
use rust_decimal::Decimal;

/// `1234.5` → `"1234.50 руб."`
pub fn rub(amount: Decimal) -> String {
    format!("{} руб.", format_money(amount))
}

pub fn position_line(
    index: usize,
    position: &Position,
) -> String {
    format!(
        "[{index}] #{} {} — {}",
        position.id,
        position.name,
        rub(position.base_salary)
    )
}

/// Every loaded rate is applied, so every line is checked.
pub fn contribution_line(contribution: &ContributionType) -> String {
    format!(
        "[x] {} ({}%)",
        contribution.name,
        contribution.rate.normalize()
    )
}

pub fn operation_line(operation: &OperationType) -> String {
    match operation.mode() {
        Some(mode) => format!("{} {} ({})", operation.id, operation.name, mode.as_str()),
        None => format!("{} {}", operation.id, operation.name),
    }
}

/// `Зарплата к выплате: 35000.00 руб.`
pub fn result_line(result: &CalculationResult) -> String {
    format!("{}: {}", result.mode.result_caption(), rub(result.amount))
}

/// Breakdown shown under the result line.
pub fn result_details(result: &CalculationResult) -> String {
    format!(
        "Должность: {}\nОклад: {}\nСтавка взносов: {}%\nВзносы: {}",
        result.position_name,
        rub(result.gross_salary),
        result.total_percent.normalize(),
        rub(result.total_contribution)
    )
}

pub fn last_operation_block<Tz>(
    operation: &LoggedOperation,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Последняя операция:\n\nДата: {}\nДолжность: {}\nТип операции: {}\nСумма: {}\n\n{}",
        operation
            .logged_at
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S"),
        operation.position_name,
        operation.operation_name,
        rub(operation.amount),
        operation.message
    )
}

pub fn history_line<Tz>(
    operation: &LoggedOperation,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}  {:<24} {:<28} {:>16}",
        operation
            .logged_at
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S"),
        operation.position_name,
        operation.operation_name,
        rub(operation.amount)
    )
}

/// Lines printed after a successful save.
pub fn save_report<Tz>(
    outcome: &SaveOutcome,
    tz: &Tz,
) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec![format!("Сохранено: {}", outcome.entry.message)];
    if let Some(message) = &outcome.procedure_message {
        lines.push(format!("Результат: {message}"));
    }
    if let Some(last) = &outcome.last_operation {
        lines.push(last_operation_block(last, tz));
    }
    if let Some(warning) = &outcome.warning {
        lines.push(format!("Предупреждение: {warning}"));
    }
    lines
}

/// Heading for an error, following the severity of the failure.
/// Shown after errors that last for the rest of the session.
pub const RECONNECT_HINT: &str = "Проверьте подключение к базе данных и перезапустите программу";

pub fn error_title(error: &PayrollError) -> &'static str {
    match error {
        PayrollError::DataSource(_) => "Ошибка БД",
        PayrollError::ReadFailed(_) => "Ошибка чтения",
        PayrollError::Persistence { .. } => "Ошибка сохранения",
        PayrollError::SaveUnavailable => "Сохранение недоступно",
        PayrollError::Index { .. }
        | PayrollError::NoPositionSelected
        | PayrollError::NotYetCalculated
        | PayrollError::Overflow => "Внимание",
    }
}

pub fn error_line(error: &PayrollError) -> String {
    format!("{}: {error}", error_title(error))
}
