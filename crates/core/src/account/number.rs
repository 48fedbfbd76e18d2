//! Human-facing account number generation.

use rand::Rng;

use super::types::AccountKind;

/// Fixed length of a generated account number.
pub const ACCOUNT_NUMBER_LEN: usize = 12;

/// Generates a new account number for the given account kind.
///
/// Format: account-type initial, then a millisecond timestamp and a 6-digit
/// random suffix, truncated to [`ACCOUNT_NUMBER_LEN`] characters. Uniqueness
/// is enforced by the account store, not here.
#[must_use]
pub fn generate_account_number(kind: AccountKind) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    let mut number = format!("{}{timestamp}{suffix:06}", kind.prefix());
    number.truncate(ACCOUNT_NUMBER_LEN);
    number
}
