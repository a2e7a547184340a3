//! Initial database migration.
//!
//! Creates the voucher status enum, vouchers, accounting periods, the
//! append-only ledger and the audit log. The booking columns are added by
//! the next migration through the schema guard.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: VOUCHERS & PERIODS
        // ============================================================
        db.execute_unprepared(PURCHASE_VOUCHERS_SQL).await?;
        db.execute_unprepared(ACCOUNTING_PERIODS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER & AUDIT
        // ============================================================
        db.execute_unprepared(ENTRIES_SQL).await?;
        db.execute_unprepared(AUDIT_LOG_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(APPEND_ONLY_TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE voucher_status AS ENUM ('draft', 'booked');
";

const PURCHASE_VOUCHERS_SQL: &str = r"
CREATE TABLE purchase_vouchers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL,
    status voucher_status NOT NULL DEFAULT 'draft',
    voucher_date DATE,
    booking_time TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_purchase_vouchers_org ON purchase_vouchers(organization_id, status);
";

const ACCOUNTING_PERIODS_SQL: &str = r"
CREATE TABLE accounting_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL,
    from_date DATE NOT NULL,
    to_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_period_range CHECK (from_date <= to_date)
);

CREATE INDEX idx_accounting_periods_org ON accounting_periods(organization_id, from_date, to_date);
";

const ENTRIES_SQL: &str = r"
CREATE TABLE entries (
    entry_guid UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    account_number INTEGER NOT NULL,
    entry_date DATE NOT NULL,
    voucher_number BIGINT NOT NULL,
    voucher_type VARCHAR(50) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    amount NUMERIC(19, 4) NOT NULL,
    entry_type VARCHAR(20) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_entries_voucher ON entries(organization_id, voucher_number);
CREATE INDEX idx_entries_account ON entries(organization_id, account_number, entry_date);
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL,
    user_id UUID NOT NULL,
    table_name VARCHAR(100) NOT NULL,
    record_id VARCHAR(100) NOT NULL,
    operation VARCHAR(20) NOT NULL,
    changed_data JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_log_record ON audit_log(organization_id, table_name, record_id);
";

const APPEND_ONLY_TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_append_only_modification
-- Ledger entries and audit rows are written once and never changed.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_append_only_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Table % is append-only', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_entries_append_only
BEFORE UPDATE OR DELETE ON entries
FOR EACH ROW
EXECUTE FUNCTION prevent_append_only_modification();

CREATE TRIGGER trg_audit_log_append_only
BEFORE UPDATE OR DELETE ON audit_log
FOR EACH ROW
EXECUTE FUNCTION prevent_append_only_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS audit_log CASCADE;
DROP TABLE IF EXISTS entries CASCADE;
DROP TABLE IF EXISTS accounting_periods CASCADE;
DROP TABLE IF EXISTS purchase_vouchers CASCADE;
DROP FUNCTION IF EXISTS prevent_append_only_modification();
DROP TYPE IF EXISTS voucher_status;
";
