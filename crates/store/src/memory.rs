//! In-memory account arena and transaction journal.
//!
//! Accounts live in a concurrent map addressed by id; no shared mutable
//! structure crosses account boundaries. The journal is append-only: entries
//! are never deleted, only their status is transitioned (audit permanence).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use solera_core::account::Account;
use solera_core::ledger::store::{AccountStore, TransactionLog};
use solera_core::ledger::{LedgerError, Metadata, Transaction, TransactionStatus};
use solera_shared::types::{AccountId, TransactionId};

/// In-memory implementation of both store ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<AccountId, Account>,
    journal: RwLock<Vec<Transaction>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account. Fixture/opening-flow helper, not a ledger operation.
    pub fn insert_account(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    /// Returns a snapshot of an account, if present.
    #[must_use]
    pub fn account(&self, account_id: AccountId) -> Option<Account> {
        self.accounts.get(&account_id).map(|entry| entry.clone())
    }

    /// Returns an account's current balance, if present.
    #[must_use]
    pub fn balance_of(&self, account_id: AccountId) -> Option<Decimal> {
        self.accounts.get(&account_id).map(|entry| entry.balance)
    }

    /// Returns the number of journal entries.
    pub async fn journal_len(&self) -> usize {
        self.journal.read().await.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get_for_update(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(&account_id)
            .map(|entry| entry.clone())
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    async fn apply_delta(
        &self,
        account_id: AccountId,
        delta: Decimal,
    ) -> Result<(), LedgerError> {
        let mut entry = self
            .accounts
            .get_mut(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        entry.balance += delta;
        entry.updated_at = Utc::now();
        debug!(%account_id, %delta, balance = %entry.balance, "applied delta");
        Ok(())
    }
}

#[async_trait]
impl TransactionLog for MemoryStore {
    async fn create(&self, transaction: &Transaction) -> Result<(), LedgerError> {
        let mut journal = self.journal.write().await;
        if journal
            .iter()
            .any(|existing| existing.reference == transaction.reference)
        {
            return Err(LedgerError::DuplicateReference(
                transaction.reference.clone(),
            ));
        }
        journal.push(transaction.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        transaction_id: TransactionId,
        status: TransactionStatus,
        completed_at: Option<DateTime<Utc>>,
        metadata: Option<Metadata>,
    ) -> Result<(), LedgerError> {
        let mut journal = self.journal.write().await;
        let entry = journal
            .iter_mut()
            .find(|entry| entry.id == transaction_id)
            .ok_or_else(|| {
                LedgerError::Storage(format!("unknown transaction: {transaction_id}"))
            })?;

        if !entry.status.can_transition_to(status) {
            return Err(LedgerError::Storage(format!(
                "illegal status transition {:?} -> {status:?} for {transaction_id}",
                entry.status
            )));
        }

        entry.status = status;
        if completed_at.is_some() {
            entry.completed_at = completed_at;
        }
        if let Some(metadata) = metadata {
            entry.metadata = metadata;
        }
        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transaction>, LedgerError> {
        let journal = self.journal.read().await;
        Ok(journal
            .iter()
            .find(|entry| entry.reference == reference)
            .cloned())
    }

    async fn find_by_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let journal = self.journal.read().await;
        Ok(journal
            .iter()
            .rev()
            .filter(|entry| entry.touches(account_id))
            .cloned()
            .collect())
    }
}
