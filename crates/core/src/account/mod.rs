//! Account domain types.
//!
//! Accounts are the only mutable shared state in the ledger core. Their
//! balances are mutated exclusively by the transaction processor while the
//! account's guard is held; nothing in this module writes a balance.

pub mod number;
pub mod types;

pub use number::generate_account_number;
pub use types::{Account, AccountKind};
