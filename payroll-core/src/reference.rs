//! In-memory snapshot of the reference tables.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::calculations::ContributionCalculator;
use crate::db::repository::PayrollRepository;
use crate::error::PayrollError;
use crate::models::{ContributionType, Position};

/// Positions and contribution types as last loaded from the store.
///
/// Rows keep the order the store returned them in, so list indexes shown to
/// the user map straight onto [`position_at`](Self::position_at).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCache {
    positions: Vec<Position>,
    contributions: Vec<ContributionType>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload both tables and replace the snapshot wholesale.
    ///
    /// The previous snapshot is kept if either query fails.
    pub async fn load(
        &mut self,
        repo: &dyn PayrollRepository,
    ) -> Result<(), PayrollError> {
        let positions = repo
            .list_positions()
            .await
            .map_err(PayrollError::DataSource)?;
        debug!(count = positions.len(), "positions loaded");

        let contributions = repo
            .list_contribution_types()
            .await
            .map_err(PayrollError::DataSource)?;
        debug!(count = contributions.len(), "contribution types loaded");

        self.positions = positions;
        self.contributions = contributions;
        info!(
            positions = self.positions.len(),
            contributions = self.contributions.len(),
            "reference data refreshed"
        );
        Ok(())
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn contributions(&self) -> &[ContributionType] {
        &self.contributions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position_at(&self, index: usize) -> Result<&Position, PayrollError> {
        self.positions.get(index).ok_or(PayrollError::Index {
            index,
            len: self.positions.len(),
        })
    }

    /// Sum of every loaded contribution rate.
    pub fn total_percent(&self) -> Result<Decimal, PayrollError> {
        Ok(ContributionCalculator::new(&self.contributions).total_percent()?)
    }
}
