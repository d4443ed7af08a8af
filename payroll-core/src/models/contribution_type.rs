use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of `donations_type`: one insurance contribution and its rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionType {
    pub id: i32,
    pub name: String,
    /// Percent of gross salary, e.g. `22` for 22 %.
    pub rate: Decimal,
}
