//! The ledger engine facade.
//!
//! Public entry point for balance-affecting operations. The facade performs
//! request-shape validation only (amount positivity, currency code parsing,
//! description trimming); everything that needs account state goes through
//! the transaction processor. Caller authentication and account ownership
//! checks happen at the excluded HTTP boundary — the engine trusts the
//! account ids it is given.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

use solera_shared::config::EngineConfig;
use solera_shared::types::{AccountId, Currency};

use super::error::LedgerError;
use super::processor::TransactionProcessor;
use super::store::{AccountStore, TransactionLog};
use super::types::{Metadata, OperationRequest, Transaction, TransactionKind};

/// Metadata key for the bill reference on BILL_PAYMENT entries.
pub const METADATA_BILL_REFERENCE_KEY: &str = "bill_reference";

/// Metadata key for the check number on CHECK_DEPOSIT entries.
pub const METADATA_CHECK_NUMBER_KEY: &str = "check_number";

/// Public entry point exposing the ledger operations.
pub struct LedgerEngine {
    processor: TransactionProcessor,
    log: Arc<dyn TransactionLog>,
}

impl LedgerEngine {
    /// Creates an engine over the given stores.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        log: Arc<dyn TransactionLog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            processor: TransactionProcessor::new(accounts, Arc::clone(&log), config),
            log,
        }
    }

    /// Moves `amount` from `source` to `destination`.
    #[instrument(skip(self, description, reference))]
    pub async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        let request = OperationRequest {
            kind: TransactionKind::Transfer,
            source_account_id: source,
            destination_account_id: Some(destination),
            amount: validated_amount(amount)?,
            currency: parse_currency(currency)?,
            description: trimmed(description),
            reference,
            metadata: Metadata::new(),
        };
        self.processor.process(request).await
    }

    /// Credits `amount` to `account`.
    #[instrument(skip(self, description, reference))]
    pub async fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        self.single_account_operation(
            TransactionKind::Deposit,
            account,
            amount,
            currency,
            trimmed(description),
            reference,
            Metadata::new(),
        )
        .await
    }

    /// Debits `amount` from `account`.
    #[instrument(skip(self, description, reference))]
    pub async fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        self.single_account_operation(
            TransactionKind::Withdrawal,
            account,
            amount,
            currency,
            trimmed(description),
            reference,
            Metadata::new(),
        )
        .await
    }

    /// Debits `amount` from `account` against a bill.
    ///
    /// Same debit mechanics as a withdrawal, tagged BILL_PAYMENT with the
    /// bill reference recorded in metadata.
    #[instrument(skip(self, reference))]
    pub async fn pay_bill(
        &self,
        account: AccountId,
        bill_reference: &str,
        amount: Decimal,
        currency: &str,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        if bill_reference.trim().is_empty() {
            return Err(LedgerError::InvalidOperation(
                "bill reference must not be empty".to_string(),
            ));
        }
        let mut metadata = Metadata::new();
        metadata.insert(
            METADATA_BILL_REFERENCE_KEY.to_string(),
            serde_json::Value::String(bill_reference.trim().to_string()),
        );
        self.single_account_operation(
            TransactionKind::BillPayment,
            account,
            amount,
            currency,
            Some(format!("Bill payment {}", bill_reference.trim())),
            reference,
            metadata,
        )
        .await
    }

    /// Credits `amount` to `account` from a deposited check.
    #[instrument(skip(self, reference))]
    pub async fn deposit_check(
        &self,
        account: AccountId,
        check_number: &str,
        amount: Decimal,
        currency: &str,
        reference: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        if check_number.trim().is_empty() {
            return Err(LedgerError::InvalidOperation(
                "check number must not be empty".to_string(),
            ));
        }
        let mut metadata = Metadata::new();
        metadata.insert(
            METADATA_CHECK_NUMBER_KEY.to_string(),
            serde_json::Value::String(check_number.trim().to_string()),
        );
        self.single_account_operation(
            TransactionKind::CheckDeposit,
            account,
            amount,
            currency,
            Some(format!("Check deposit {}", check_number.trim())),
            reference,
            metadata,
        )
        .await
    }

    /// Returns every entry touching `account`, most recent first.
    pub async fn get_history(
        &self,
        account: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.log.find_by_account(account).await
    }

    /// Cancels a still-PENDING entry by its reference.
    ///
    /// Request-time cancellation only: once a transaction has reached a
    /// terminal state it can never be cancelled. Runs under the entry's
    /// account guards, so it serializes against in-flight processing.
    pub async fn cancel_by_reference(
        &self,
        reference: &str,
    ) -> Result<Transaction, LedgerError> {
        self.processor.cancel_by_reference(reference).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn single_account_operation(
        &self,
        kind: TransactionKind,
        account: AccountId,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
        reference: Option<String>,
        metadata: Metadata,
    ) -> Result<Transaction, LedgerError> {
        let request = OperationRequest {
            kind,
            source_account_id: account,
            destination_account_id: None,
            amount: validated_amount(amount)?,
            currency: parse_currency(currency)?,
            description,
            reference,
            metadata,
        };
        self.processor.process(request).await
    }
}

fn validated_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidOperation(format!(
            "amount must be strictly positive, got {amount}"
        )));
    }
    Ok(amount)
}

fn parse_currency(code: &str) -> Result<Currency, LedgerError> {
    Currency::from_str(code)
        .map_err(|parse_error| LedgerError::InvalidOperation(parse_error.to_string()))
}

fn trimmed(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_amount_rejects_zero_and_negative() {
        assert!(validated_amount(Decimal::ZERO).is_err());
        assert!(validated_amount(Decimal::NEGATIVE_ONE).is_err());
        assert!(validated_amount(Decimal::ONE).is_ok());
    }

    #[test]
    fn test_parse_currency_maps_to_invalid_operation() {
        assert!(matches!(
            parse_currency("DOLLARS"),
            Err(LedgerError::InvalidOperation(_))
        ));
        assert_eq!(parse_currency("usd").unwrap(), Currency::Usd);
    }

    #[test]
    fn test_trimmed_drops_blank_descriptions() {
        assert_eq!(trimmed(Some("  rent  ".to_string())), Some("rent".to_string()));
        assert_eq!(trimmed(Some("   ".to_string())), None);
        assert_eq!(trimmed(None), None);
    }
}
