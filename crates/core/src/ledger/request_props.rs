//! Property tests for operation request decomposition into legs.

use proptest::prelude::*;
use rust_decimal::Decimal;
use solera_shared::types::{AccountId, Currency};

use super::types::{Metadata, OperationRequest, TransactionKind};

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Transfer),
        Just(TransactionKind::Deposit),
        Just(TransactionKind::Withdrawal),
        Just(TransactionKind::BillPayment),
        Just(TransactionKind::CheckDeposit),
    ]
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn request_strategy() -> impl Strategy<Value = OperationRequest> {
    (kind_strategy(), amount_strategy()).prop_map(|(kind, amount)| OperationRequest {
        kind,
        source_account_id: AccountId::new(),
        destination_account_id: kind
            .requires_destination()
            .then(AccountId::new),
        amount,
        currency: Currency::Usd,
        description: None,
        reference: None,
        metadata: Metadata::new(),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Transfers conserve value: legs sum to zero. Single-leg operations
    /// move exactly the requested amount in the direction of their kind.
    #[test]
    fn prop_legs_conserve_or_move_amount(request in request_strategy()) {
        let legs = request.legs();
        let total: Decimal = legs.iter().map(|leg| leg.delta).sum();

        if request.kind == TransactionKind::Transfer {
            prop_assert_eq!(legs.len(), 2);
            prop_assert_eq!(total, Decimal::ZERO);
        } else {
            prop_assert_eq!(legs.len(), 1);
            let expected = if request.kind.debits_source() {
                -request.amount
            } else {
                request.amount
            };
            prop_assert_eq!(total, expected);
        }
    }

    /// Every leg magnitude equals the request amount.
    #[test]
    fn prop_leg_magnitudes_match_amount(request in request_strategy()) {
        for leg in request.legs() {
            prop_assert_eq!(leg.delta.abs(), request.amount);
        }
    }

    /// Participants are strictly ascending and cover exactly the accounts
    /// named by the legs.
    #[test]
    fn prop_participants_sorted_and_complete(request in request_strategy()) {
        let participants = request.participants();
        for pair in participants.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for leg in request.legs() {
            prop_assert!(participants.contains(&leg.account_id));
        }
    }
}
