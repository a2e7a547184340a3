//! Booking orchestrator.
//!
//! Runs the booking of a purchase voucher end to end: preconditions first
//! without a transaction, then number allocation, voucher update and ledger
//! posting in one transaction, then the audit record and the booked event.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use tally_core::booking::{
    AuditRecord, AuditSink, BookingError, BookingEventSink, BookingOutcome, BookingRequest,
    BookingService, BookingTransition, NoopEventSink, ProposedLine, VoucherBookedEvent,
    VoucherStatus as CoreVoucherStatus,
};
use tally_shared::types::{OrganizationId, UserId, VoucherId};

use crate::entities::{purchase_vouchers, sea_orm_active_enums::VoucherStatus};
use crate::schema::ensure_booking_schema;

use super::audit::AuditLogRepository;
use super::ledger::LedgerPoster;
use super::period::PeriodLockRepository;
use super::sequence::VoucherNumberAllocator;

/// Default bound on the work done inside the booking transaction before commit.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Books purchase vouchers.
#[derive(Clone)]
pub struct BookingRepository {
    db: DatabaseConnection,
    periods: PeriodLockRepository,
    audit: Arc<dyn AuditSink>,
    events: Arc<dyn BookingEventSink>,
    schema_ready: Arc<OnceCell<()>>,
    transaction_timeout: Duration,
}

impl BookingRepository {
    /// Creates a booking repository that audits into `audit_log` and emits
    /// no events.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            periods: PeriodLockRepository::new(db.clone()),
            audit: Arc::new(AuditLogRepository::new(db.clone())),
            events: Arc::new(NoopEventSink),
            schema_ready: Arc::new(OnceCell::new()),
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
            db,
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn BookingEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Bounds how long the booking transaction may run before it commits.
    ///
    /// The commit itself is not cancelled: once staged, the outcome is
    /// whatever the database reports for the commit.
    #[must_use]
    pub const fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Runs the schema guard once for this repository and its clones.
    ///
    /// Later calls return immediately. A failed run is retried on the next call.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Infrastructure` if the guard fails.
    pub async fn ensure_schema(&self) -> Result<(), BookingError> {
        self.schema_ready
            .get_or_try_init(|| async {
                ensure_booking_schema(&self.db).await.inspect_err(|e| {
                    error!(error = %e, "Schema guard failed");
                })
            })
            .await
            .map(|_| ())
            .map_err(|e| BookingError::Infrastructure(e.to_string()))
    }

    /// Books a draft voucher and returns its new voucher number.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is not an admin
    /// - The voucher does not exist in the organization
    /// - The voucher is already booked
    /// - The voucher date lies in a locked accounting period
    /// - The lines do not balance
    /// - The database fails or the transaction times out
    pub async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, BookingError> {
        let BookingRequest {
            organization_id,
            voucher_id,
            actor,
            lines,
        } = request;

        BookingService::authorize(&actor).inspect_err(|_| {
            debug!(%organization_id, %voucher_id, user_id = %actor.user_id, "Booking refused: not an admin");
        })?;

        self.ensure_schema().await?;

        let voucher = self
            .find_voucher(organization_id, voucher_id)
            .await
            .map_err(infrastructure)?
            .ok_or(BookingError::NotFound(voucher_id.into_inner()))?;

        BookingService::book(db_status_to_core(voucher.status), voucher.id, actor.user_id)?;

        let locked = self
            .periods
            .is_locked(organization_id.into_inner(), voucher.voucher_date)
            .await
            .map_err(infrastructure)?;
        BookingService::check_period(voucher.voucher_date, locked).inspect_err(|e| {
            debug!(%organization_id, %voucher_id, error = %e, "Booking refused");
        })?;

        BookingService::check_lines(&lines).inspect_err(|e| {
            debug!(%organization_id, %voucher_id, error = %e, "Booking refused");
        })?;

        let staged = match tokio::time::timeout(
            self.transaction_timeout,
            self.stage_booking(organization_id, voucher_id, actor.user_id, &lines),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                error!(%organization_id, %voucher_id, timeout = ?self.transaction_timeout, "Booking transaction timed out");
                return Err(BookingError::Infrastructure(
                    "booking transaction timed out".to_string(),
                ));
            }
        };
        let (voucher_number, transition) = staged.commit().await?;

        let record = AuditRecord::for_booking(organization_id, actor.user_id, voucher_id, &lines);
        if let Err(e) = self.audit.record(record).await {
            warn!(%organization_id, %voucher_id, voucher_number, error = %e, "Audit write failed after booking");
        }

        self.events.voucher_booked(&VoucherBookedEvent {
            organization_id,
            voucher_id,
            voucher_number,
            booked_by: transition.booked_by,
            booked_at: transition.booked_at,
        });

        info!(
            %organization_id,
            %voucher_id,
            voucher_number,
            lines = lines.len(),
            "Voucher booked"
        );

        Ok(BookingOutcome { voucher_number })
    }

    /// Loads a voucher scoped to its organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_voucher(
        &self,
        organization_id: OrganizationId,
        voucher_id: VoucherId,
    ) -> Result<Option<purchase_vouchers::Model>, DbErr> {
        find_voucher_in(&self.db, organization_id, voucher_id, false).await
    }

    async fn stage_booking(
        &self,
        organization_id: OrganizationId,
        voucher_id: VoucherId,
        booked_by: UserId,
        lines: &[ProposedLine],
    ) -> Result<StagedBooking, BookingError> {
        // Every early return, and a cancelled future, drops `txn`, which rolls it back.
        let txn = self.db.begin().await.map_err(infrastructure)?;

        let voucher = find_voucher_in(&txn, organization_id, voucher_id, true)
            .await
            .map_err(infrastructure)?
            .ok_or(BookingError::NotFound(voucher_id.into_inner()))?;

        let transition =
            BookingService::book(db_status_to_core(voucher.status), voucher.id, booked_by)?;

        let voucher_number = match voucher.voucher_number.filter(|n| *n > 0) {
            Some(existing) => existing,
            None => VoucherNumberAllocator::allocate(&txn)
                .await
                .map_err(infrastructure)?,
        };

        let booked_at: DateTimeWithTimeZone = transition.booked_at.into();
        let mut active: purchase_vouchers::ActiveModel = voucher.into();
        active.status = Set(VoucherStatus::Booked);
        active.voucher_number = Set(Some(voucher_number));
        active.booking_time = Set(Some(booked_at));
        active.updated_at = Set(booked_at);
        active.update(&txn).await.map_err(infrastructure)?;

        LedgerPoster::post(
            &txn,
            organization_id.into_inner(),
            voucher_number,
            transition.entry_date(),
            lines,
        )
        .await
        .map_err(infrastructure)?;

        Ok(StagedBooking {
            txn,
            voucher_number,
            transition,
        })
    }
}

/// A booking whose writes are done but not yet committed.
struct StagedBooking {
    txn: DatabaseTransaction,
    voucher_number: i64,
    transition: BookingTransition,
}

impl StagedBooking {
    async fn commit(self) -> Result<(i64, BookingTransition), BookingError> {
        self.txn.commit().await.map_err(infrastructure)?;
        Ok((self.voucher_number, self.transition))
    }
}

async fn find_voucher_in<C>(
    db: &C,
    organization_id: OrganizationId,
    voucher_id: VoucherId,
    for_update: bool,
) -> Result<Option<purchase_vouchers::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = purchase_vouchers::Entity::find_by_id(voucher_id.into_inner())
        .filter(purchase_vouchers::Column::OrganizationId.eq(organization_id.into_inner()));
    if for_update {
        query = query.lock_exclusive();
    }
    query.one(db).await
}

fn infrastructure(e: DbErr) -> BookingError {
    error!(error = %e, "Database error during booking");
    BookingError::Infrastructure(e.to_string())
}

/// Converts database voucher status to core voucher status.
#[must_use]
pub const fn db_status_to_core(status: VoucherStatus) -> CoreVoucherStatus {
    match status {
        VoucherStatus::Draft => CoreVoucherStatus::Draft,
        VoucherStatus::Booked => CoreVoucherStatus::Booked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(db_status_to_core(VoucherStatus::Draft), CoreVoucherStatus::Draft);
        assert_eq!(db_status_to_core(VoucherStatus::Booked), CoreVoucherStatus::Booked);
    }

    #[test]
    fn test_infrastructure_error_is_retryable() {
        let err = infrastructure(DbErr::Custom("connection reset".to_string()));
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "INFRASTRUCTURE_ERROR");
    }
}
