//! The ledger transaction engine.
//!
//! This module implements the core money-movement machinery:
//! - Transaction references (idempotency/display keys)
//! - Per-account exclusive guards with ordered multi-acquisition
//! - Balance invariant checking
//! - The transaction processor state machine
//! - The public ledger engine facade
//! - Store ports for account balances and the transaction journal

pub mod engine;
pub mod error;
pub mod guard;
pub mod invariant;
pub mod processor;
pub mod reference;
pub mod store;
pub mod types;

#[cfg(test)]
mod invariant_props;
#[cfg(test)]
mod request_props;

pub use engine::{LedgerEngine, METADATA_BILL_REFERENCE_KEY, METADATA_CHECK_NUMBER_KEY};
pub use error::LedgerError;
pub use guard::{AccountGuards, ScopedLock};
pub use processor::TransactionProcessor;
pub use reference::ReferenceGenerator;
pub use store::{AccountStore, TransactionLog};
pub use types::{
    Leg, Metadata, OperationRequest, Transaction, TransactionKind, TransactionStatus,
    METADATA_ERROR_KEY,
};
