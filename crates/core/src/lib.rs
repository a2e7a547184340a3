//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations for voucher booking live here.
//!
//! # Modules
//!
//! - `auth` - Pre-resolved actors and role checks
//! - `booking` - Voucher booking state machine, balance validation,
//!   period locks, voucher numbering, audit and event ports

pub mod auth;
pub mod booking;
