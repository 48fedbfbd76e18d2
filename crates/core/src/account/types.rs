//! Account aggregate and account-type rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solera_shared::types::{AccountId, Currency, UserId};

/// Account type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    /// Savings account.
    Savings,
    /// Checking account.
    Checking,
    /// Investment account.
    Investment,
    /// Credit account (may carry a negative balance up to its credit limit).
    Credit,
}

impl AccountKind {
    /// Returns the account-number prefix character for this kind.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Savings => 'S',
            Self::Checking | Self::Credit => 'C',
            Self::Investment => 'I',
        }
    }

    /// Returns true if this kind is allowed to go below zero.
    #[must_use]
    pub const fn allows_negative_balance(self) -> bool {
        matches!(self, Self::Credit)
    }
}

/// A customer account.
///
/// The balance is never directly settable by a caller outside the transaction
/// processor; fields are public for store implementations and test fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Owning user.
    pub user_id: UserId,
    /// Account type.
    pub kind: AccountKind,
    /// Human-facing account number (12 characters, unique).
    pub account_number: String,
    /// Current balance (fixed-point decimal, 2 fraction digits).
    pub balance: Decimal,
    /// Account currency (ISO 4217).
    pub currency: Currency,
    /// Whether the account accepts operations.
    pub is_active: bool,
    /// Minimum permissible balance for non-credit accounts.
    pub minimum_balance: Decimal,
    /// Credit limit (CREDIT accounts only; zero otherwise).
    pub credit_limit: Decimal,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Opens a new active account with a zero balance.
    ///
    /// Account opening itself is an external flow; this constructor exists for
    /// that flow and for test fixtures.
    #[must_use]
    pub fn open(user_id: UserId, kind: AccountKind, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            user_id,
            kind,
            account_number: super::number::generate_account_number(kind),
            balance: Decimal::ZERO,
            currency,
            is_active: true,
            minimum_balance: Decimal::ZERO,
            credit_limit: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the minimum permissible balance for this account.
    ///
    /// `-credit_limit` for CREDIT accounts, `minimum_balance` otherwise.
    #[must_use]
    pub fn floor(&self) -> Decimal {
        if self.kind == AccountKind::Credit {
            -self.credit_limit
        } else {
            self.minimum_balance
        }
    }

    /// Returns how much can still be debited before hitting the floor.
    #[must_use]
    pub fn headroom(&self) -> Decimal {
        self.balance - self.floor()
    }
}
