//! `SeaORM` entity definitions.

pub mod accounting_periods;
pub mod audit_log;
pub mod entries;
pub mod purchase_vouchers;
pub mod sea_orm_active_enums;
pub mod voucher_number_sequence;
