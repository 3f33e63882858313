use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Alias for a transaction ID
pub type TransactionId = String;

/// Alias for a user ID
pub type UserId = String;

/// A financial transaction as recorded by the service. It is never updated once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
  pub id: TransactionId,
  pub user_id: UserId,
  /// The sign is not constrained, refunds or corrections might come as negative amounts.
  pub amount: Decimal,
  pub currency: String,
  pub timestamp: DateTime<Utc>,
}

impl Transaction {
  pub fn new<I, U, C>(
    id: I,
    user_id: U,
    amount: Decimal,
    currency: C,
    timestamp: DateTime<Utc>,
  ) -> Self
  where
    I: Into<TransactionId>,
    U: Into<UserId>,
    C: Into<String>,
  {
    Self {
      id: id.into(),
      user_id: user_id.into(),
      amount,
      currency: currency.into(),
      timestamp,
    }
  }
}

#[cfg(test)]
pub(crate) fn with_amount(id: &str, amount: Decimal) -> Transaction {
  use chrono::TimeZone;

  Transaction::new(
    id,
    "user_1",
    amount,
    "USD",
    Utc.with_ymd_and_hms(2024, 12, 12, 12, 0, 0).unwrap(),
  )
}
