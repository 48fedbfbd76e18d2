//! Core business logic for Solera.
//!
//! This crate contains the ledger transaction engine with ZERO web or
//! database dependencies. Persistence is consumed through the store ports in
//! [`ledger::store`]; everything else lives here.
//!
//! # Modules
//!
//! - `account` - Account domain types and balance floors
//! - `ledger` - The transaction engine: guards, invariants, processor, facade

pub mod account;
pub mod ledger;
