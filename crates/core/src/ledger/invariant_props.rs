//! Property tests for the balance invariant checker.

use proptest::prelude::*;
use rust_decimal::Decimal;
use solera_shared::types::{Currency, UserId};

use crate::account::{Account, AccountKind};

use super::error::LedgerError;
use super::invariant;

fn amount(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn cents_strategy() -> impl Strategy<Value = i64> {
    -10_000_000i64..10_000_000i64
}

fn positive_cents_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000i64
}

fn non_credit_kind_strategy() -> impl Strategy<Value = AccountKind> {
    prop_oneof![
        Just(AccountKind::Savings),
        Just(AccountKind::Checking),
        Just(AccountKind::Investment),
    ]
}

fn account(kind: AccountKind, balance: Decimal) -> Account {
    let mut account = Account::open(UserId::new(), kind, Currency::Usd);
    account.balance = balance;
    account
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A delta passes the check exactly when the resulting balance stays at
    /// or above the account's floor.
    #[test]
    fn prop_check_agrees_with_floor(
        kind in non_credit_kind_strategy(),
        balance in positive_cents_strategy(),
        minimum in positive_cents_strategy(),
        delta in cents_strategy(),
    ) {
        let mut account = account(kind, amount(balance));
        account.minimum_balance = amount(minimum);

        let passes = invariant::check(&account, amount(delta)).is_ok();
        let stays_above_floor = amount(balance) + amount(delta) >= amount(minimum);
        prop_assert_eq!(passes, stays_above_floor);
    }

    /// Credit accounts are bounded by the negated credit limit.
    #[test]
    fn prop_credit_floor_is_negative_limit(
        balance in cents_strategy(),
        limit in positive_cents_strategy(),
        delta in cents_strategy(),
    ) {
        let mut account = account(AccountKind::Credit, amount(balance));
        account.credit_limit = amount(limit);
        prop_assume!(amount(balance) >= account.floor());

        let passes = invariant::check(&account, amount(delta)).is_ok();
        let stays_above_floor = amount(balance) + amount(delta) >= -amount(limit);
        prop_assert_eq!(passes, stays_above_floor);
    }

    /// The check never mutates the account.
    #[test]
    fn prop_check_is_pure(
        balance in positive_cents_strategy(),
        delta in cents_strategy(),
    ) {
        let account = account(AccountKind::Checking, amount(balance));
        let before = account.balance;
        let _ = invariant::check(&account, amount(delta));
        prop_assert_eq!(account.balance, before);
    }

    /// Inactive accounts reject every delta, credit or debit.
    #[test]
    fn prop_inactive_rejects_everything(
        balance in positive_cents_strategy(),
        delta in cents_strategy(),
    ) {
        let mut account = account(AccountKind::Checking, amount(balance));
        account.is_active = false;
        let result = invariant::check(&account, amount(delta));
        prop_assert!(matches!(result, Err(LedgerError::AccountInactive(_))));
    }
}
