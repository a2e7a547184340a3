//! Schema guard.
//!
//! Makes sure the columns booking depends on exist before it runs. Older
//! deployments created `purchase_vouchers` and `accounting_periods` without
//! them; the guard adds them in place. Every call is idempotent and safe to
//! race: a concurrent caller adding the same column first counts as success.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, RuntimeErr, Statement};
use thiserror::Error;
use tracing::{debug, info};

/// SQLSTATE raised by Postgres for `duplicate_column`.
const DUPLICATE_COLUMN: &str = "42701";

/// Errors raised by the schema guard.
#[derive(Debug, Error)]
pub enum SchemaGuardError {
    /// A table or column name is not a plain SQL identifier.
    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    /// A column definition contains a statement separator or comment.
    #[error("Invalid column definition: {0}")]
    InvalidDefinition(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A column the guard keeps in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Table name.
    pub table: &'static str,
    /// Column name.
    pub column: &'static str,
    /// Type and constraints after the column name.
    pub definition: &'static str,
}

/// Columns booking requires.
pub const BOOKING_COLUMNS: [ColumnSpec; 2] = [
    ColumnSpec {
        table: "purchase_vouchers",
        column: "voucher_number",
        definition: "BIGINT NULL",
    },
    ColumnSpec {
        table: "accounting_periods",
        column: "is_locked",
        definition: "BOOLEAN NOT NULL DEFAULT FALSE",
    },
];

/// What `ensure_column` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOutcome {
    /// The column was already there.
    AlreadyPresent,
    /// The column was added by this call.
    Added,
}

/// Returns true for a plain lowercase SQL identifier (`[a-z_][a-z0-9_]*`).
#[must_use]
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 63
}

fn validate_identifier(name: &str) -> Result<(), SchemaGuardError> {
    if is_plain_identifier(name) {
        Ok(())
    } else {
        Err(SchemaGuardError::InvalidIdentifier(name.to_string()))
    }
}

fn validate_definition(definition: &str) -> Result<(), SchemaGuardError> {
    if definition.trim().is_empty()
        || definition.contains(';')
        || definition.contains("--")
        || definition.contains("/*")
    {
        Err(SchemaGuardError::InvalidDefinition(definition.to_string()))
    } else {
        Ok(())
    }
}

/// Returns true if the error is Postgres reporting the column already exists.
#[must_use]
pub fn is_duplicate_column(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            db_err.code().as_deref() == Some(DUPLICATE_COLUMN)
        }
        _ => false,
    }
}

/// Checks `information_schema.columns` for `table.column` in the current schema.
pub async fn column_exists<C>(db: &C, table: &str, column: &str) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let row = db
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"SELECT EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema()
                  AND table_name = $1
                  AND column_name = $2
            ) AS present",
            [table.into(), column.into()],
        ))
        .await?;

    match row {
        Some(row) => row.try_get::<bool>("", "present"),
        None => Ok(false),
    }
}

/// Adds `table.column` with `definition` unless it already exists.
pub async fn ensure_column<C>(
    db: &C,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<ColumnOutcome, SchemaGuardError>
where
    C: ConnectionTrait,
{
    validate_identifier(table)?;
    validate_identifier(column)?;
    validate_definition(definition)?;

    if column_exists(db, table, column).await? {
        return Ok(ColumnOutcome::AlreadyPresent);
    }

    let sql = format!("ALTER TABLE {table} ADD COLUMN IF NOT EXISTS {column} {definition}");
    match db.execute_unprepared(&sql).await {
        Ok(_) => {
            info!(table, column, "Added missing column");
            Ok(ColumnOutcome::Added)
        }
        Err(e) if is_duplicate_column(&e) => {
            debug!(table, column, "Column added concurrently");
            Ok(ColumnOutcome::AlreadyPresent)
        }
        Err(e) => Err(e.into()),
    }
}

/// Ensures every column in [`BOOKING_COLUMNS`] exists.
pub async fn ensure_booking_schema<C>(db: &C) -> Result<(), SchemaGuardError>
where
    C: ConnectionTrait,
{
    for spec in BOOKING_COLUMNS {
        ensure_column(db, spec.table, spec.column, spec.definition).await?;
    }
    Ok(())
}
