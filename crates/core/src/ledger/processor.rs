//! The transaction processor state machine.
//!
//! Drives every balance-affecting operation through one fixed sequence:
//! create PENDING entry, acquire guards in ascending account-id order,
//! re-read authoritative balances, validate every leg, apply all deltas,
//! finalize. Mutation is never a side effect of persistence; it happens only
//! here, under held guards.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use solera_shared::config::EngineConfig;

use super::error::LedgerError;
use super::guard::AccountGuards;
use super::invariant;
use super::reference::ReferenceGenerator;
use super::store::{AccountStore, TransactionLog};
use super::types::{Leg, OperationRequest, Transaction, TransactionStatus};

/// Processes operation requests against the account and log stores.
pub struct TransactionProcessor {
    accounts: Arc<dyn AccountStore>,
    log: Arc<dyn TransactionLog>,
    guards: AccountGuards,
    references: ReferenceGenerator,
    config: EngineConfig,
}

impl TransactionProcessor {
    /// Creates a processor over the given stores.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        log: Arc<dyn TransactionLog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            accounts,
            log,
            guards: AccountGuards::new(config.lock_wait()),
            references: ReferenceGenerator::new(),
            config,
        }
    }

    /// Processes one operation to a terminal outcome.
    ///
    /// Returns the finalized [`Transaction`] — including FAILED ones, since a
    /// business rejection is a normal, inspectable result. A cancellation
    /// that lands before processing starts yields the CANCELLED entry with no
    /// balance movement. Structural and system failures come back as `Err`
    /// instead.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidOperation`] for malformed requests, before any
    ///   entry is created.
    /// - [`LedgerError::DuplicateReference`] if the supplied reference was
    ///   already used.
    /// - [`LedgerError::ReferenceExhausted`] if generation kept colliding.
    /// - [`LedgerError::LockTimeout`] if a guard could not be acquired within
    ///   the bounded wait (the entry stays PENDING; safe to retry with a new
    ///   request).
    /// - [`LedgerError::AccountNotFound`] / [`LedgerError::Storage`] from the
    ///   stores.
    /// - [`LedgerError::OperationFailed`] if applying deltas failed after
    ///   validation passed; applied legs are rolled back first.
    #[instrument(
        skip(self, request),
        fields(kind = ?request.kind, source = %request.source_account_id)
    )]
    pub async fn process(&self, request: OperationRequest) -> Result<Transaction, LedgerError> {
        validate_shape(&request)?;

        let reference = self.resolve_reference(&request).await?;
        let mut transaction = Transaction::pending(&request, reference);
        self.log.create(&transaction).await?;
        debug!(id = %transaction.id, reference = %transaction.reference, "created pending entry");

        // Ascending-id order across all callers; held for the whole unit of
        // work, released on every exit path below.
        let _held = self.guards.acquire_ordered(&request.participants()).await?;

        // A cancellation may have landed between entry creation and guard
        // acquisition; it wins, and no balance moves.
        if let Some(current) = self.log.find_by_reference(&transaction.reference).await? {
            if current.status == TransactionStatus::Cancelled {
                info!(
                    id = %current.id,
                    reference = %current.reference,
                    "transaction cancelled before processing"
                );
                return Ok(current);
            }
        }

        let legs = request.legs();
        if let Err(rejection) = self.validate_legs(&legs).await {
            if rejection.is_business_rejection() {
                return self.reject(transaction, &rejection).await;
            }
            transaction.fail(&rejection.to_string());
            self.persist_failure(&transaction).await;
            return Err(rejection);
        }

        if let Err(apply_error) = self.apply_legs(&legs).await {
            transaction.fail(&apply_error.to_string());
            self.persist_failure(&transaction).await;
            return Err(LedgerError::OperationFailed(apply_error.to_string()));
        }

        transaction.complete(Utc::now());
        if let Err(persist_error) = self
            .log
            .update_status(
                transaction.id,
                TransactionStatus::Completed,
                transaction.completed_at,
                None,
            )
            .await
        {
            // The status transition is part of the unit of work: if it cannot
            // land, the applied deltas must not stand either.
            self.rollback(&legs).await;
            transaction.fail(&persist_error.to_string());
            self.persist_failure(&transaction).await;
            return Err(LedgerError::OperationFailed(persist_error.to_string()));
        }

        info!(
            id = %transaction.id,
            reference = %transaction.reference,
            amount = %transaction.amount,
            "transaction completed"
        );
        Ok(transaction)
    }

    /// Cancels a still-PENDING entry by its reference.
    ///
    /// The transaction's account guards are held while the status flips, so a
    /// cancellation serializes against any in-flight processing of the same
    /// entry instead of racing it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidOperation`] if the reference is unknown or the
    ///   entry is already terminal.
    /// - [`LedgerError::LockTimeout`] if a guard could not be acquired.
    #[instrument(skip(self))]
    pub async fn cancel_by_reference(
        &self,
        reference: &str,
    ) -> Result<Transaction, LedgerError> {
        let Some(found) = self.log.find_by_reference(reference).await? else {
            return Err(LedgerError::InvalidOperation(format!(
                "unknown transaction reference: {reference}"
            )));
        };

        let _held = self.guards.acquire_ordered(&found.participants()).await?;

        // Re-read under the guards; the entry may have reached a terminal
        // state while we waited.
        let Some(mut transaction) = self.log.find_by_reference(reference).await? else {
            return Err(LedgerError::InvalidOperation(format!(
                "unknown transaction reference: {reference}"
            )));
        };
        if !transaction
            .status
            .can_transition_to(TransactionStatus::Cancelled)
        {
            return Err(LedgerError::InvalidOperation(format!(
                "transaction {reference} is no longer cancellable"
            )));
        }

        self.log
            .update_status(transaction.id, TransactionStatus::Cancelled, None, None)
            .await?;
        transaction.status = TransactionStatus::Cancelled;
        info!(id = %transaction.id, reference, "transaction cancelled");
        Ok(transaction)
    }

    /// Resolves the entry's reference: a supplied one must be unused, a
    /// generated one is collision-checked with bounded retries.
    async fn resolve_reference(
        &self,
        request: &OperationRequest,
    ) -> Result<String, LedgerError> {
        if let Some(reference) = &request.reference {
            if self.log.find_by_reference(reference).await?.is_some() {
                return Err(LedgerError::DuplicateReference(reference.clone()));
            }
            return Ok(reference.clone());
        }

        for attempt in 0..self.config.reference_max_attempts {
            let candidate = self.references.generate();
            if self.log.find_by_reference(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            warn!(attempt, candidate, "generated reference collided, retrying");
        }
        Err(LedgerError::ReferenceExhausted)
    }

    /// Re-reads each guarded account and checks every leg's invariant.
    /// No balance moves unless all legs pass.
    async fn validate_legs(&self, legs: &[Leg]) -> Result<(), LedgerError> {
        for leg in legs {
            let account = self.accounts.get_for_update(leg.account_id).await?;
            invariant::check(&account, leg.delta)?;
        }
        Ok(())
    }

    /// Applies all deltas; on failure, rolls back the legs already applied
    /// before returning the underlying error.
    async fn apply_legs(&self, legs: &[Leg]) -> Result<(), LedgerError> {
        let mut applied: Vec<Leg> = Vec::with_capacity(legs.len());
        for leg in legs {
            match self.accounts.apply_delta(leg.account_id, leg.delta).await {
                Ok(()) => applied.push(*leg),
                Err(apply_error) => {
                    warn!(
                        account_id = %leg.account_id,
                        error = %apply_error,
                        "delta application failed, rolling back"
                    );
                    self.rollback(&applied).await;
                    return Err(apply_error);
                }
            }
        }
        Ok(())
    }

    /// Reverses applied legs in reverse order.
    async fn rollback(&self, applied: &[Leg]) {
        for leg in applied.iter().rev() {
            if let Err(rollback_error) = self
                .accounts
                .apply_delta(leg.account_id, -leg.delta)
                .await
            {
                // Nothing left to do at this level; the store is inconsistent
                // and needs operator attention.
                error!(
                    account_id = %leg.account_id,
                    error = %rollback_error,
                    "rollback failed; manual reconciliation required"
                );
            }
        }
    }

    /// Records a business rejection as a FAILED entry and returns it as data.
    async fn reject(
        &self,
        mut transaction: Transaction,
        rejection: &LedgerError,
    ) -> Result<Transaction, LedgerError> {
        transaction.fail(&rejection.to_string());
        self.log
            .update_status(
                transaction.id,
                TransactionStatus::Failed,
                None,
                Some(transaction.metadata.clone()),
            )
            .await?;
        info!(
            id = %transaction.id,
            reason = rejection.error_code(),
            "transaction rejected"
        );
        Ok(transaction)
    }

    /// Best-effort persistence of a FAILED status on an error path.
    async fn persist_failure(&self, transaction: &Transaction) {
        if let Err(persist_error) = self
            .log
            .update_status(
                transaction.id,
                TransactionStatus::Failed,
                None,
                Some(transaction.metadata.clone()),
            )
            .await
        {
            error!(
                id = %transaction.id,
                error = %persist_error,
                "could not record FAILED status"
            );
        }
    }
}

/// Rejects malformed requests before any entry exists.
fn validate_shape(request: &OperationRequest) -> Result<(), LedgerError> {
    if request.kind.requires_destination() {
        match request.destination_account_id {
            None => {
                return Err(LedgerError::InvalidOperation(
                    "transfer requires a destination account".to_string(),
                ));
            }
            Some(destination) if destination == request.source_account_id => {
                return Err(LedgerError::InvalidOperation(
                    "source and destination accounts must differ".to_string(),
                ));
            }
            Some(_) => {}
        }
    } else if request.destination_account_id.is_some() {
        return Err(LedgerError::InvalidOperation(format!(
            "{:?} does not take a destination account",
            request.kind
        )));
    }
    Ok(())
}
