//! Global voucher number allocator.
//!
//! Numbers come from the single row of `voucher_number_sequence`. The row is
//! locked with `FOR UPDATE` inside the booking transaction, so concurrent
//! bookings queue on it until the holder commits or rolls back. A rollback
//! also reverts `last_value`, so failed bookings leave no gaps.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Statement,
};
use tracing::debug;

use tally_core::booking::next_voucher_number;

use crate::entities::{purchase_vouchers, voucher_number_sequence};

const LOCK_SEQUENCE_SQL: &str =
    r"SELECT last_value FROM voucher_number_sequence WHERE id = 1 FOR UPDATE";

const SEED_SEQUENCE_SQL: &str = r"
INSERT INTO voucher_number_sequence (id, last_value)
VALUES (1, 0)
ON CONFLICT (id) DO NOTHING
";

const STORE_SEQUENCE_SQL: &str = r"UPDATE voucher_number_sequence SET last_value = $1 WHERE id = 1";

/// Allocates voucher numbers. Always call with the booking transaction.
pub struct VoucherNumberAllocator;

impl VoucherNumberAllocator {
    /// Locks the sequence and returns the next voucher number.
    ///
    /// The next number follows both the stored `last_value` and the highest
    /// number any voucher carries, so rows numbered outside the allocator are
    /// never collided with.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub async fn allocate<C>(txn: &C) -> Result<i64, DbErr>
    where
        C: ConnectionTrait,
    {
        let last_value = match Self::lock(txn).await? {
            Some(value) => value,
            None => {
                txn.execute(Statement::from_string(DbBackend::Postgres, SEED_SEQUENCE_SQL))
                    .await?;
                Self::lock(txn).await?.ok_or_else(|| {
                    DbErr::RecordNotFound("voucher_number_sequence row".to_string())
                })?
            }
        };

        let max_assigned = Self::current_max(txn).await?;
        let next = next_voucher_number(Some(last_value.max(max_assigned.unwrap_or(0))));

        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            STORE_SEQUENCE_SQL,
            [next.into()],
        ))
        .await?;

        debug!(voucher_number = next, "Allocated voucher number");
        Ok(next)
    }

    /// Highest positive voucher number across all organizations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn current_max<C>(db: &C) -> Result<Option<i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        let max = purchase_vouchers::Entity::find()
            .select_only()
            .column_as(purchase_vouchers::Column::VoucherNumber.max(), "max_number")
            .filter(purchase_vouchers::Column::VoucherNumber.gt(0))
            .into_tuple::<Option<i64>>()
            .one(db)
            .await?;
        Ok(max.flatten())
    }

    /// The stored `last_value`, if the sequence row exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn last_value<C>(db: &C) -> Result<Option<i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        let row = voucher_number_sequence::Entity::find_by_id(voucher_number_sequence::SEQUENCE_ROW_ID)
            .one(db)
            .await?;
        Ok(row.map(|r| r.last_value))
    }

    async fn lock<C>(txn: &C) -> Result<Option<i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        let row = txn
            .query_one(Statement::from_string(DbBackend::Postgres, LOCK_SEQUENCE_SQL))
            .await?;
        row.map(|r| r.try_get::<i64>("", "last_value")).transpose()
    }
}
