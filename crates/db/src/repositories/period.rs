//! Period lock repository.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use tally_core::booking::{AccountingPeriod, is_date_locked};

use crate::entities::accounting_periods;

/// Answers whether a date is closed for posting in an organization.
#[derive(Debug, Clone)]
pub struct PeriodLockRepository {
    db: DatabaseConnection,
}

impl PeriodLockRepository {
    /// Creates a new period lock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns true if a locked period of the organization contains `date`.
    ///
    /// A missing date is never locked and does not touch the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_locked(
        &self,
        organization_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<bool, DbErr> {
        let Some(date) = date else {
            return Ok(false);
        };

        let candidates = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::OrganizationId.eq(organization_id))
            .filter(accounting_periods::Column::IsLocked.eq(true))
            .filter(accounting_periods::Column::FromDate.lte(date))
            .filter(accounting_periods::Column::ToDate.gte(date))
            .all(&self.db)
            .await?;

        let periods: Vec<AccountingPeriod> = candidates.iter().map(AccountingPeriod::from).collect();
        Ok(is_date_locked(&periods, Some(date)))
    }
}
