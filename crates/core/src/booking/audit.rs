//! Audit trail for booking actions.
//!
//! The booking orchestrator appends one record per successful booking after
//! the booking transaction commits. Writing is delegated to an [`AuditSink`]
//! so deployments can swap the direct insert for an outbox or a retrying
//! writer without touching the booking path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tally_shared::types::{OrganizationId, UserId, VoucherId};
use thiserror::Error;

use super::types::ProposedLine;

/// Table name recorded for voucher bookings.
pub const VOUCHER_TABLE: &str = "purchase_vouchers";

/// Mutating action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditOperation {
    /// A voucher was booked.
    Book,
}

impl AuditOperation {
    /// The value stored in the `operation` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "BOOK",
        }
    }
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit log row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Organization the action happened in.
    pub organization_id: OrganizationId,
    /// Acting user.
    pub user_id: UserId,
    /// Table of the changed record.
    pub table_name: String,
    /// ID of the changed record.
    pub record_id: String,
    /// What happened.
    pub operation: AuditOperation,
    /// Snapshot of the change.
    pub changed_data: serde_json::Value,
}

impl AuditRecord {
    /// Builds the record for a booked voucher; `changed_data` is the posted lines.
    #[must_use]
    pub fn for_booking(
        organization_id: OrganizationId,
        user_id: UserId,
        voucher_id: VoucherId,
        lines: &[ProposedLine],
    ) -> Self {
        Self {
            organization_id,
            user_id,
            table_name: VOUCHER_TABLE.to_string(),
            record_id: voucher_id.to_string(),
            operation: AuditOperation::Book,
            changed_data: serde_json::to_value(lines).unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Audit write failures. Logged by the caller, never surfaced as a booking failure.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit store rejected or could not take the write.
    #[error("Audit write failed: {0}")]
    WriteFailed(String),
}

/// Port for persisting append-only audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persists one audit record.
    async fn record(&self, record: AuditRecord) -> Result<(), AuditError>;
}
