use rust_decimal::Decimal;

use crate::transactions::TransactionId;

/// Projection of a transaction that made it into the top ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopTransaction {
  pub transaction_id: TransactionId,
  pub amount: Decimal,
}

impl TopTransaction {
  pub fn new<I: Into<TransactionId>>(transaction_id: I, amount: Decimal) -> Self {
    Self {
      transaction_id: transaction_id.into(),
      amount,
    }
  }
}

/// Aggregated statistics over all the live transactions at some point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsSnapshot {
  pub total_transactions: usize,
  /// Already rounded to two decimals
  pub average_transaction_amount: Decimal,
  /// Sorted by descending amount
  pub top_transactions: Vec<TopTransaction>,
}

impl StatisticsSnapshot {
  pub fn empty() -> Self {
    Self {
      total_transactions: 0,
      average_transaction_amount: Decimal::ZERO,
      top_transactions: Vec::new(),
    }
  }
}
