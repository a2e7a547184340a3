//! Ledger poster and entry queries.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use tally_core::booking::{ENTRY_TYPE_NORMAL, ProposedLine, VOUCHER_TYPE_PURCHASE};

use crate::entities::entries;

/// Writes ledger entries for a booked voucher.
pub struct LedgerPoster;

impl LedgerPoster {
    /// Inserts one entry per line, all carrying `voucher_number` and `entry_date`.
    ///
    /// Must run inside the booking transaction; a failure on any line
    /// leaves it to the caller to roll back.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub async fn post<C>(
        txn: &C,
        organization_id: Uuid,
        voucher_number: i64,
        entry_date: NaiveDate,
        lines: &[ProposedLine],
    ) -> Result<Vec<entries::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().into();
        let mut posted = Vec::with_capacity(lines.len());

        for line in lines {
            let entry = entries::ActiveModel {
                entry_guid: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                account_number: Set(line.account_number),
                entry_date: Set(entry_date),
                voucher_number: Set(voucher_number),
                voucher_type: Set(VOUCHER_TYPE_PURCHASE.to_string()),
                description: Set(line.description.clone()),
                amount: Set(line.posted_amount()),
                entry_type: Set(ENTRY_TYPE_NORMAL.to_string()),
                created_at: Set(now),
            };
            posted.push(entry.insert(txn).await?);
        }

        Ok(posted)
    }
}

/// Read access to posted entries.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    db: DatabaseConnection,
}

impl EntryRepository {
    /// Creates a new entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the entries posted for a voucher number in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_voucher(
        &self,
        organization_id: Uuid,
        voucher_number: i64,
    ) -> Result<Vec<entries::Model>, DbErr> {
        entries::Entity::find()
            .filter(entries::Column::OrganizationId.eq(organization_id))
            .filter(entries::Column::VoucherNumber.eq(voucher_number))
            .order_by_asc(entries::Column::CreatedAt)
            .order_by_asc(entries::Column::AccountNumber)
            .all(&self.db)
            .await
    }
}
