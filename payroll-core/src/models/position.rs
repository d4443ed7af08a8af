use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of `positions`: a job title and its monthly base salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: i32,
    pub name: String,
    pub base_salary: Decimal,
}
