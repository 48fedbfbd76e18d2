//! Store ports consumed by the ledger engine.
//!
//! The engine assumes these provide durable, consistent reads and writes when
//! invoked within one operation's guard scope; it does not implement the
//! physical storage engine itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use solera_shared::types::{AccountId, TransactionId};

use crate::account::Account;

use super::error::LedgerError;
use super::types::{Metadata, Transaction, TransactionStatus};

/// Account balance storage.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Reads the latest committed state of an account.
    ///
    /// Must be called only while holding that account's guard; the returned
    /// balance is then the authoritative value for invariant checking.
    async fn get_for_update(&self, account_id: AccountId) -> Result<Account, LedgerError>;

    /// Applies a signed balance delta to an account.
    ///
    /// Must be called only while holding that account's guard.
    async fn apply_delta(&self, account_id: AccountId, delta: Decimal) -> Result<(), LedgerError>;
}

/// Durable, append-only transaction journal.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Persists a newly created (PENDING) entry.
    async fn create(&self, transaction: &Transaction) -> Result<(), LedgerError>;

    /// Transitions an entry's status, optionally setting the completion
    /// timestamp and replacing metadata.
    async fn update_status(
        &self,
        transaction_id: TransactionId,
        status: TransactionStatus,
        completed_at: Option<DateTime<Utc>>,
        metadata: Option<Metadata>,
    ) -> Result<(), LedgerError>;

    /// Looks up an entry by its external reference.
    async fn find_by_reference(&self, reference: &str)
        -> Result<Option<Transaction>, LedgerError>;

    /// Returns every entry touching an account, most recent first.
    async fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError>;
}
