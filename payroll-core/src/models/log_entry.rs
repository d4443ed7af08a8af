use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CalculationResult;
use crate::calculations::common::round_half_up;

/// A `calc_log` row about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub logged_at: DateTime<Utc>,
    pub message: String,
    pub position_id: i32,
    pub operation_id: i32,
    pub amount: Decimal,
}

impl NewLogEntry {
    /// Build the log row for `result`, stamped with `logged_at`.
    /// The amount is stored rounded to cents.
    pub fn from_result(
        result: &CalculationResult,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            logged_at,
            message: result.log_message(),
            position_id: result.position_id,
            operation_id: result.mode.id(),
            amount: round_half_up(result.amount),
        }
    }
}

/// A `calc_log` row joined with the position and operation names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedOperation {
    pub logged_at: DateTime<Utc>,
    pub position_name: String,
    pub operation_name: String,
    pub amount: Decimal,
    pub message: String,
}
