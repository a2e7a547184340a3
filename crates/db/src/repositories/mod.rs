//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod audit;
pub mod booking;
pub mod ledger;
pub mod period;
pub mod sequence;

pub use audit::AuditLogRepository;
pub use booking::{BookingRepository, DEFAULT_TRANSACTION_TIMEOUT};
pub use ledger::{EntryRepository, LedgerPoster};
pub use period::PeriodLockRepository;
pub use sequence::VoucherNumberAllocator;
