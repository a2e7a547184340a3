//! Audit log repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use tally_core::booking::{AuditError, AuditRecord, AuditSink};

use crate::entities::audit_log;

/// Writes audit records straight into `audit_log`.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
}

impl AuditLogRepository {
    /// Creates a new audit log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts one audit row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert(&self, record: AuditRecord) -> Result<audit_log::Model, DbErr> {
        audit_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(record.organization_id.into_inner()),
            user_id: Set(record.user_id.into_inner()),
            table_name: Set(record.table_name),
            record_id: Set(record.record_id),
            operation: Set(record.operation.as_str().to_string()),
            changed_data: Set(record.changed_data),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Lists audit rows for one record, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_record(
        &self,
        organization_id: Uuid,
        table_name: &str,
        record_id: &str,
    ) -> Result<Vec<audit_log::Model>, DbErr> {
        audit_log::Entity::find()
            .filter(audit_log::Column::OrganizationId.eq(organization_id))
            .filter(audit_log::Column::TableName.eq(table_name))
            .filter(audit_log::Column::RecordId.eq(record_id))
            .order_by_asc(audit_log::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn record(&self, record: AuditRecord) -> Result<(), AuditError> {
        self.insert(record)
            .await
            .map(|_| ())
            .map_err(|e| AuditError::WriteFailed(e.to_string()))
    }
}
