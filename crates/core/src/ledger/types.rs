//! Ledger domain types for balance-affecting operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solera_shared::types::{AccountId, Currency, TransactionId};

/// Open key/value map attached to a transaction (failure reasons, bill
/// references, check numbers).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata key under which a failure reason is recorded.
pub const METADATA_ERROR_KEY: &str = "error";

/// Balance-affecting operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Move value from a source account to a destination account.
    Transfer,
    /// Credit the source account.
    Deposit,
    /// Debit the source account.
    Withdrawal,
    /// Debit the source account against a bill reference.
    BillPayment,
    /// Credit the source account from a deposited check.
    CheckDeposit,
}

impl TransactionKind {
    /// Returns true if this kind requires a destination account.
    #[must_use]
    pub const fn requires_destination(self) -> bool {
        matches!(self, Self::Transfer)
    }

    /// Returns true if this kind debits the source account.
    #[must_use]
    pub const fn debits_source(self) -> bool {
        matches!(self, Self::Transfer | Self::Withdrawal | Self::BillPayment)
    }
}

/// Transaction lifecycle status.
///
/// Transitions are monotonic and one-directional: `PENDING` moves to exactly
/// one of the terminal states and no entry is ever re-processed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Created, not yet applied.
    Pending,
    /// Applied; balances moved.
    Completed,
    /// Rejected or failed; balances untouched (or rolled back).
    Failed,
    /// Cancelled before processing; balances never moved.
    Cancelled,
}

impl TransactionStatus {
    /// Returns true if the status is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if a transition from `self` to `next` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Completed | Self::Failed | Self::Cancelled
            )
        )
    }
}

/// A requested balance-affecting operation, shape-validated by the facade.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    /// Operation kind.
    pub kind: TransactionKind,
    /// Source account (required for every kind).
    pub source_account_id: AccountId,
    /// Destination account (TRANSFER only).
    pub destination_account_id: Option<AccountId>,
    /// Amount (strictly positive).
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional externally supplied idempotency reference.
    pub reference: Option<String>,
    /// Extra metadata recorded on the transaction.
    pub metadata: Metadata,
}

/// One single-account balance delta within an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    /// The account the delta applies to.
    pub account_id: AccountId,
    /// Signed balance change (negative for debits).
    pub delta: Decimal,
}

impl OperationRequest {
    /// Returns the participating account ids, ascending and deduplicated.
    ///
    /// This is the guard acquisition order: a total order across all callers
    /// so that opposite-direction transfers serialize instead of deadlocking.
    #[must_use]
    pub fn participants(&self) -> Vec<AccountId> {
        let mut ids = vec![self.source_account_id];
        if let Some(destination) = self.destination_account_id {
            ids.push(destination);
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Returns the balance deltas this operation applies.
    ///
    /// A TRANSFER produces one debit and one equal-magnitude credit, so its
    /// legs always sum to zero (value conservation).
    #[must_use]
    pub fn legs(&self) -> Vec<Leg> {
        match self.kind {
            TransactionKind::Transfer => {
                let mut legs = vec![Leg {
                    account_id: self.source_account_id,
                    delta: -self.amount,
                }];
                if let Some(destination) = self.destination_account_id {
                    legs.push(Leg {
                        account_id: destination,
                        delta: self.amount,
                    });
                }
                legs
            }
            TransactionKind::Deposit | TransactionKind::CheckDeposit => vec![Leg {
                account_id: self.source_account_id,
                delta: self.amount,
            }],
            TransactionKind::Withdrawal | TransactionKind::BillPayment => vec![Leg {
                account_id: self.source_account_id,
                delta: -self.amount,
            }],
        }
    }
}

/// A ledger entry: the durable record of one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Unique external reference (idempotency/display key).
    pub reference: String,
    /// Source account.
    pub source_account_id: AccountId,
    /// Destination account (TRANSFER only).
    pub destination_account_id: Option<AccountId>,
    /// Operation kind.
    pub kind: TransactionKind,
    /// Amount (immutable after creation).
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Open key/value metadata; failure reasons land under
    /// [`METADATA_ERROR_KEY`].
    pub metadata: Metadata,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Set only on transition to COMPLETED.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Creates a PENDING entry for a request with its resolved reference.
    #[must_use]
    pub fn pending(request: &OperationRequest, reference: String) -> Self {
        Self {
            id: TransactionId::new(),
            reference,
            source_account_id: request.source_account_id,
            destination_account_id: request.destination_account_id,
            kind: request.kind,
            amount: request.amount,
            currency: request.currency,
            status: TransactionStatus::Pending,
            description: request.description.clone(),
            metadata: request.metadata.clone(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Marks the entry COMPLETED at the given instant.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = TransactionStatus::Completed;
        self.completed_at = Some(at);
    }

    /// Marks the entry FAILED, recording the reason in metadata.
    pub fn fail(&mut self, reason: &str) {
        self.status = TransactionStatus::Failed;
        self.metadata.insert(
            METADATA_ERROR_KEY.to_string(),
            serde_json::Value::String(reason.to_string()),
        );
    }

    /// Returns the recorded failure reason, if any.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.metadata.get(METADATA_ERROR_KEY).and_then(|v| v.as_str())
    }

    /// Returns true if the entry touches the given account.
    #[must_use]
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.source_account_id == account_id
            || self.destination_account_id == Some(account_id)
    }

    /// Returns the participating account ids, ascending and deduplicated.
    ///
    /// Same guard acquisition order as [`OperationRequest::participants`].
    #[must_use]
    pub fn participants(&self) -> Vec<AccountId> {
        let mut ids = vec![self.source_account_id];
        if let Some(destination) = self.destination_account_id {
            ids.push(destination);
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
