use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OperationMode;

/// Outcome of one calculation.
///
/// Values are kept at full precision; rounding to cents happens when the
/// result is displayed or written to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub position_id: i32,
    pub position_name: String,
    pub mode: OperationMode,
    /// Net pay or total contributions, depending on `mode`.
    pub amount: Decimal,
    pub gross_salary: Decimal,
    /// Sum of every applied contribution rate, in percent.
    pub total_percent: Decimal,
    pub total_contribution: Decimal,
}

impl CalculationResult {
    /// Human-readable summary written to `calc_log.log_message`.
    pub fn log_message(&self) -> String {
        format!("Расчет {} для {}", self.mode.label(), self.position_name)
    }
}
