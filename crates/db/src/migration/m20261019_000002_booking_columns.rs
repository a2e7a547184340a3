//! Booking columns migration.
//!
//! Adds `purchase_vouchers.voucher_number` and `accounting_periods.is_locked`
//! through the schema guard, then the constraints that keep voucher numbers
//! unique and immutable, and the global voucher number sequence.

use sea_orm_migration::prelude::*;

use crate::schema::{SchemaGuardError, ensure_booking_schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        ensure_booking_schema(db).await.map_err(|e| match e {
            SchemaGuardError::Database(err) => err,
            other => DbErr::Migration(other.to_string()),
        })?;

        db.execute_unprepared(VOUCHER_NUMBER_CONSTRAINTS_SQL).await?;
        db.execute_unprepared(VOUCHER_IMMUTABILITY_SQL).await?;
        db.execute_unprepared(SEQUENCE_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const VOUCHER_NUMBER_CONSTRAINTS_SQL: &str = r"
ALTER TABLE purchase_vouchers
    ADD CONSTRAINT chk_voucher_number_positive
    CHECK (voucher_number IS NULL OR voucher_number > 0);

ALTER TABLE purchase_vouchers
    ADD CONSTRAINT chk_voucher_number_iff_booked
    CHECK ((status = 'booked') = (voucher_number IS NOT NULL));

CREATE UNIQUE INDEX idx_purchase_vouchers_number
    ON purchase_vouchers(voucher_number)
    WHERE voucher_number IS NOT NULL;
";

const VOUCHER_IMMUTABILITY_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_booked_voucher_change
-- A booked voucher keeps its number and status forever.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_booked_voucher_change()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'booked' THEN
        IF NEW.status <> 'booked' THEN
            RAISE EXCEPTION 'Booked voucher % cannot change status', OLD.id;
        END IF;
        IF NEW.voucher_number IS DISTINCT FROM OLD.voucher_number THEN
            RAISE EXCEPTION 'Voucher number of % is immutable', OLD.id;
        END IF;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_booked_voucher_change
BEFORE UPDATE ON purchase_vouchers
FOR EACH ROW
EXECUTE FUNCTION prevent_booked_voucher_change();
";

const SEQUENCE_SQL: &str = r"
CREATE TABLE voucher_number_sequence (
    id SMALLINT PRIMARY KEY,
    last_value BIGINT NOT NULL DEFAULT 0,
    CONSTRAINT chk_single_row CHECK (id = 1)
);

INSERT INTO voucher_number_sequence (id, last_value)
SELECT 1, COALESCE(MAX(voucher_number), 0)
FROM purchase_vouchers
WHERE voucher_number > 0
ON CONFLICT (id) DO NOTHING;
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS voucher_number_sequence;
DROP TRIGGER IF EXISTS trg_prevent_booked_voucher_change ON purchase_vouchers;
DROP FUNCTION IF EXISTS prevent_booked_voucher_change();
DROP INDEX IF EXISTS idx_purchase_vouchers_number;
ALTER TABLE purchase_vouchers DROP CONSTRAINT IF EXISTS chk_voucher_number_iff_booked;
ALTER TABLE purchase_vouchers DROP CONSTRAINT IF EXISTS chk_voucher_number_positive;
ALTER TABLE purchase_vouchers DROP COLUMN IF EXISTS voucher_number;
ALTER TABLE accounting_periods DROP COLUMN IF EXISTS is_locked;
";
