//! Store implementations for the Solera ledger engine.
//!
//! Provides the in-memory Account Store and Transaction Log Store used for
//! tests, fixtures, and single-process deployments. The ports they implement
//! live in `solera_core::ledger::store`.

pub mod memory;

pub use memory::MemoryStore;
