//! Balance invariant checking.
//!
//! A pure pre-flight check run for every leg of an operation before any
//! balance moves. Because all legs are validated before any mutation, a
//! transfer either updates both balances or updates neither.

use rust_decimal::Decimal;

use crate::account::Account;

use super::error::LedgerError;

/// Validates a proposed balance change against the account's rules.
///
/// Rejects inactive accounts, and debits that would take the balance below
/// the account's floor (`-credit_limit` for CREDIT accounts,
/// `minimum_balance` otherwise). Never mutates state.
///
/// # Errors
///
/// Returns [`LedgerError::AccountInactive`] or
/// [`LedgerError::InsufficientFunds`].
pub fn check(account: &Account, delta: Decimal) -> Result<(), LedgerError> {
    if !account.is_active {
        return Err(LedgerError::AccountInactive(account.id));
    }

    let new_balance = account.balance + delta;
    if new_balance < account.floor() {
        return Err(LedgerError::InsufficientFunds {
            account_id: account.id,
            requested: delta.abs(),
            available: account.headroom(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKind;
    use rust_decimal_macros::dec;
    use solera_shared::types::{Currency, UserId};

    fn checking_with(balance: Decimal) -> Account {
        let mut account = Account::open(UserId::new(), AccountKind::Checking, Currency::Usd);
        account.balance = balance;
        account
    }

    #[test]
    fn test_credit_leg_always_passes_on_active_account() {
        let account = checking_with(dec!(0));
        assert!(check(&account, dec!(500)).is_ok());
    }

    #[test]
    fn test_debit_to_exactly_floor_passes() {
        let account = checking_with(dec!(500));
        assert!(check(&account, dec!(-500)).is_ok());
    }

    #[test]
    fn test_debit_below_floor_rejected() {
        let account = checking_with(dec!(500));
        let result = check(&account, dec!(-600));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                requested,
                available,
                ..
            }) if requested == dec!(600) && available == dec!(500)
        ));
    }

    #[test]
    fn test_minimum_balance_floor() {
        let mut account = checking_with(dec!(100));
        account.minimum_balance = dec!(50);
        assert!(check(&account, dec!(-50)).is_ok());
        assert!(check(&account, dec!(-51)).is_err());
    }

    #[test]
    fn test_credit_account_bounded_overdraft() {
        let mut account = Account::open(UserId::new(), AccountKind::Credit, Currency::Usd);
        account.credit_limit = dec!(500);
        account.balance = dec!(-100);

        // -100 - 300 = -400, still within the -500 floor.
        assert!(check(&account, dec!(-300)).is_ok());
        // -100 - 450 = -550 would breach it.
        assert!(check(&account, dec!(-450)).is_err());
    }

    #[test]
    fn test_inactive_account_rejected_even_for_credits() {
        let mut account = checking_with(dec!(100));
        account.is_active = false;
        assert!(matches!(
            check(&account, dec!(10)),
            Err(LedgerError::AccountInactive(id)) if id == account.id
        ));
    }
}
