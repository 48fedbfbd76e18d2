//! Per-account exclusive-access guards.
//!
//! Balance mutations on one account serialize on that account's guard. When
//! an operation touches more than one account, guards are acquired in
//! ascending account-id order; this total order across all callers is the
//! deadlock-prevention rule for opposite-direction transfers on the same pair
//! of accounts.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use solera_shared::types::AccountId;

use super::error::LedgerError;

/// An exclusive hold on one account, released when dropped.
///
/// Release-on-drop covers every exit path: success, business rejection, and
/// error unwind.
#[derive(Debug)]
pub struct ScopedLock {
    account_id: AccountId,
    _guard: OwnedMutexGuard<()>,
}

impl ScopedLock {
    /// Returns the account this lock holds.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }
}

/// Registry of per-account guards with a bounded acquisition wait.
#[derive(Debug)]
pub struct AccountGuards {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
    wait: Duration,
}

impl AccountGuards {
    /// Creates a registry with the given maximum wait per acquisition.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            wait,
        }
    }

    /// Acquires the guard for one account.
    ///
    /// Blocks the calling task until the guard is free, up to the bounded
    /// wait; expiry yields [`LedgerError::LockTimeout`].
    pub async fn acquire(&self, account_id: AccountId) -> Result<ScopedLock, LedgerError> {
        let slot = self
            .locks
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        match tokio::time::timeout(self.wait, slot.lock_owned()).await {
            Ok(guard) => Ok(ScopedLock {
                account_id,
                _guard: guard,
            }),
            Err(_) => {
                warn!(%account_id, wait_ms = self.wait.as_millis() as u64, "account guard wait timed out");
                Err(LedgerError::LockTimeout(account_id))
            }
        }
    }

    /// Acquires guards for a set of accounts in ascending-id order.
    ///
    /// The input is deduplicated and sorted before acquisition, so callers
    /// may pass participants in any order. On timeout, guards already held
    /// are released (dropped) before the error propagates.
    pub async fn acquire_ordered(
        &self,
        account_ids: &[AccountId],
    ) -> Result<Vec<ScopedLock>, LedgerError> {
        let mut ordered = account_ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut held = Vec::with_capacity(ordered.len());
        for account_id in ordered {
            held.push(self.acquire(account_id).await?);
        }
        Ok(held)
    }
}
