use std::{cmp::Reverse, collections::BinaryHeap};

use rust_decimal::Decimal;

use super::snapshot::{StatisticsSnapshot, TopTransaction};
use crate::transactions::Transaction;

/// Number of decimals after the point for the average amount
pub const AVERAGE_PRECISION: u32 = 2;

/// How many transactions are reported in the ranking by amount
pub const TOP_TRANSACTIONS: usize = 3;

/// Compute the statistics for a collection of transactions.
///
/// The average is rounded with the banker's rule (half to even), which is what [`Decimal::round_dp`] does.
/// Transactions with the same amount are ranked by their position in `transactions`, first seen goes first.
pub fn compute(transactions: &[Transaction]) -> StatisticsSnapshot {
  if transactions.is_empty() {
    return StatisticsSnapshot::empty();
  }

  let total_transactions = transactions.len();
  let average_transaction_amount = average(transactions).round_dp(AVERAGE_PRECISION);

  let top_transactions = top_k(transactions, TOP_TRANSACTIONS, |transaction| transaction.amount)
    .into_iter()
    .map(|transaction| TopTransaction::new(transaction.id.as_str(), transaction.amount))
    .collect();

  StatisticsSnapshot {
    total_transactions,
    average_transaction_amount,
    top_transactions,
  }
}

/// Arithmetic mean of the amounts of a non-empty slice.
///
/// The exact sum can go beyond the [`Decimal`] range even when every amount fits,
/// in which case every amount is divided by the count before adding them up.
fn average(transactions: &[Transaction]) -> Decimal {
  let count = Decimal::from(transactions.len());

  transactions
    .iter()
    .try_fold(Decimal::ZERO, |total, transaction| {
      total.checked_add(transaction.amount)
    })
    .map(|total| total / count)
    .unwrap_or_else(|| {
      transactions
        .iter()
        .fold(Decimal::ZERO, |mean, transaction| {
          mean.saturating_add(transaction.amount / count)
        })
    })
}

/// Select the `k` items with the largest keys, sorted by descending key.
///
/// It keeps a min-heap bounded to `k` elements, so it runs in O(n log k) without sorting the whole input.
/// Ties are broken by position, the item found first wins.
pub fn top_k<T, K, F>(items: &[T], k: usize, key: F) -> Vec<&T>
where
  K: Ord,
  F: Fn(&T) -> K,
{
  let mut heap = BinaryHeap::with_capacity(k + 1);

  for (index, item) in items.iter().enumerate() {
    heap.push(Reverse((key(item), Reverse(index))));
    if heap.len() > k {
      heap.pop();
    }
  }

  heap
    .into_sorted_vec()
    .into_iter()
    .map(|Reverse((_, Reverse(index)))| &items[index])
    .collect()
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;

  use super::*;
  use crate::transactions::with_amount;

  fn transactions(amounts: Vec<Decimal>) -> Vec<Transaction> {
    amounts
      .into_iter()
      .enumerate()
      .map(|(index, amount)| with_amount(&format!("tx_{}", index + 1), amount))
      .collect()
  }

  fn top_amounts(snapshot: &StatisticsSnapshot) -> Vec<Decimal> {
    snapshot
      .top_transactions
      .iter()
      .map(|top| top.amount)
      .collect()
  }

  #[test]
  fn compute_empty() {
    let snapshot = compute(&[]);

    assert_eq!(
      snapshot,
      StatisticsSnapshot {
        total_transactions: 0,
        average_transaction_amount: dec!(0.0),
        top_transactions: vec![],
      }
    );
  }

  #[test]
  fn compute_two_transactions() {
    let snapshot = compute(&transactions(vec![dec!(200.0), dec!(300.0)]));

    assert_eq!(
      snapshot,
      StatisticsSnapshot {
        total_transactions: 2,
        average_transaction_amount: dec!(250.0),
        top_transactions: vec![
          TopTransaction::new("tx_2", dec!(300.0)),
          TopTransaction::new("tx_1", dec!(200.0)),
        ],
      }
    );
  }

  #[test]
  fn compute_keeps_top_three() {
    let snapshot = compute(&transactions(vec![
      dec!(10),
      dec!(50),
      dec!(30),
      dec!(90),
      dec!(20),
    ]));

    assert_eq!(snapshot.total_transactions, 5);
    assert_eq!(snapshot.average_transaction_amount, dec!(40.0));
    assert_eq!(
      snapshot.top_transactions,
      vec![
        TopTransaction::new("tx_4", dec!(90)),
        TopTransaction::new("tx_2", dec!(50)),
        TopTransaction::new("tx_3", dec!(30)),
      ]
    );
  }

  #[test]
  fn compute_single_transaction() {
    let snapshot = compute(&transactions(vec![dec!(-12.5)]));

    assert_eq!(snapshot.total_transactions, 1);
    assert_eq!(snapshot.average_transaction_amount, dec!(-12.5));
    assert_eq!(
      snapshot.top_transactions,
      vec![TopTransaction::new("tx_1", dec!(-12.5))]
    );
  }

  #[test]
  fn compute_with_negative_amounts() {
    let snapshot = compute(&transactions(vec![
      dec!(-5),
      dec!(-1),
      dec!(-20),
      dec!(-3),
    ]));

    assert_eq!(snapshot.average_transaction_amount, dec!(-7.25));
    assert_eq!(top_amounts(&snapshot), vec![dec!(-1), dec!(-3), dec!(-5)]);
  }

  #[test]
  fn compute_rounds_average_half_to_even() {
    let cases = vec![
      (vec![dec!(10), dec!(10), dec!(20)], dec!(13.33)),
      (vec![dec!(0.125)], dec!(0.12)),
      (vec![dec!(0.135)], dec!(0.14)),
      (vec![dec!(1.005), dec!(1.005)], dec!(1.00)),
      (vec![dec!(0.01), dec!(0.02)], dec!(0.02)),
    ];

    for (amounts, expected) in cases {
      assert_eq!(
        compute(&transactions(amounts)).average_transaction_amount,
        expected
      );
    }
  }

  #[test]
  fn compute_ties_keep_scan_order() {
    let snapshot = compute(&transactions(vec![
      dec!(5),
      dec!(7),
      dec!(7),
      dec!(1),
      dec!(7),
    ]));

    let ids: Vec<&str> = snapshot
      .top_transactions
      .iter()
      .map(|top| top.transaction_id.as_str())
      .collect();
    assert_eq!(ids, vec!["tx_2", "tx_3", "tx_5"]);
  }

  #[test]
  fn compute_sum_beyond_decimal_range() {
    let large = dec!(50000000000000000000000000000);
    let cases = vec![
      (vec![large, large], large),
      (vec![Decimal::MAX, Decimal::MAX], Decimal::MAX),
      (vec![Decimal::MIN, Decimal::MIN, Decimal::MIN], Decimal::MIN),
      (vec![Decimal::MAX, Decimal::MAX, Decimal::MIN, Decimal::MIN], dec!(0)),
    ];

    for (amounts, expected) in cases {
      let snapshot = compute(&transactions(amounts.clone()));

      assert_eq!(snapshot.total_transactions, amounts.len());
      assert_eq!(snapshot.average_transaction_amount, expected);
    }
  }

  #[test]
  fn compute_is_pure() {
    let input = transactions(vec![dec!(3.3), dec!(1.1), dec!(2.2), dec!(4.4)]);

    assert_eq!(compute(&input), compute(&input));
  }

  #[test]
  fn compute_top_is_non_increasing() {
    let amounts: Vec<Decimal> = (0..100i64)
      .map(|i| Decimal::from((i * 37) % 101) - dec!(50))
      .collect();
    let input = transactions(amounts.clone());

    let snapshot = compute(&input);

    let mut expected = amounts;
    expected.sort_by(|a, b| b.cmp(a));
    expected.truncate(TOP_TRANSACTIONS);
    assert_eq!(snapshot.total_transactions, 100);
    assert_eq!(top_amounts(&snapshot), expected);
  }

  #[test]
  fn top_k_sizes() {
    let items = vec![4, 8, 1, 9, 3];

    let cases = vec![
      (0, vec![]),
      (1, vec![9]),
      (3, vec![9, 8, 4]),
      (5, vec![9, 8, 4, 3, 1]),
      (10, vec![9, 8, 4, 3, 1]),
    ];

    for (k, expected) in cases {
      let top: Vec<i32> = top_k(&items, k, |item| *item).into_iter().copied().collect();
      assert_eq!(top, expected);
    }
  }
}
