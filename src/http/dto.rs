use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::jobs::TaskId;
use crate::statistics::{StatisticsSnapshot, TopTransaction};
use crate::transactions::Transaction;

/// Formats accepted for timestamps without an offset, which are taken as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A deserializable transaction as received in the body of a request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionRequest {
  /// Unique transaction identifier, chosen by the caller
  #[schema(example = "test_1")]
  transaction_id: String,
  #[schema(example = "user_1")]
  user_id: String,
  /// Any sign, at most 28 decimal places and within the range of a 96-bit decimal
  #[serde(deserialize_with = "deserialize_amount")]
  #[schema(value_type = f64, example = 100.0)]
  amount: Decimal,
  #[schema(example = "USD")]
  currency: String,
  /// RFC 3339, or ISO 8601 without offset taken as UTC
  #[serde(deserialize_with = "deserialize_timestamp")]
  #[schema(value_type = String, format = DateTime, example = "2024-12-12T12:00:00")]
  timestamp: DateTime<Utc>,
}

impl From<TransactionRequest> for Transaction {
  fn from(request: TransactionRequest) -> Self {
    Transaction::new(
      request.transaction_id,
      request.user_id,
      request.amount,
      request.currency,
      request.timestamp,
    )
  }
}

/// Reasons for a JSON number not to be accepted as an amount
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
  #[error("amount {0} is out of range, it must be between {min} and {max}", min = Decimal::MIN, max = Decimal::MAX)]
  OutOfRange(String),

  #[error("amount {0} has more than {max} decimal places", max = MAX_AMOUNT_SCALE)]
  TooManyDecimals(String),
}

/// Amounts keep up to this number of decimal places without rounding
pub const MAX_AMOUNT_SCALE: u32 = 28;

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
  D: Deserializer<'de>,
{
  let value = f64::deserialize(deserializer)?;
  parse_amount(value).map_err(de::Error::custom)
}

/// Convert a JSON number into an exact amount, using its shortest decimal representation.
///
/// Numbers are rejected rather than rounded when they do not fit, so an amount is never stored with a different value.
fn parse_amount(value: f64) -> Result<Decimal, AmountError> {
  let representation = value.to_string();
  match Decimal::from_str_exact(&representation) {
    Ok(amount) => Ok(amount),
    Err(_) if value.is_finite() && value.abs() < 1.0 => {
      Err(AmountError::TooManyDecimals(representation))
    }
    Err(_) => Err(AmountError::OutOfRange(representation)),
  }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = String::deserialize(deserializer)?;
  parse_timestamp(&value)
    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", value)))
}

/// Parse either an RFC 3339 timestamp or a naive ISO 8601 one.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(value)
    .map(|timestamp| timestamp.with_timezone(&Utc))
    .ok()
    .or_else(|| {
      NAIVE_TIMESTAMP_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
          .ok()
          .map(|naive| Utc.from_utc_datetime(&naive))
      })
    })
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct MessageResponse {
  #[schema(value_type = String, example = "All transactions deleted")]
  message: &'static str,
}

impl MessageResponse {
  pub fn all_deleted() -> Self {
    Self {
      message: "All transactions deleted",
    }
  }
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct TransactionReceivedResponse {
  #[schema(value_type = String, example = "Transaction received")]
  message: &'static str,
  /// Identifier of the background statistics recomputation
  task_id: String,
}

impl From<TaskId> for TransactionReceivedResponse {
  fn from(task_id: TaskId) -> Self {
    Self {
      message: "Transaction received",
      task_id: task_id.to_string(),
    }
  }
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct TopTransactionResponse {
  transaction_id: String,
  #[schema(value_type = f64)]
  amount: Decimal,
}

impl From<TopTransaction> for TopTransactionResponse {
  fn from(top: TopTransaction) -> Self {
    Self {
      transaction_id: top.transaction_id,
      amount: top.amount,
    }
  }
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct StatisticsResponse {
  total_transactions: usize,
  /// Rounded to two decimals, half to even
  #[schema(value_type = f64)]
  average_transaction_amount: Decimal,
  /// Up to three transactions, by descending amount
  top_transactions: Vec<TopTransactionResponse>,
}

impl From<StatisticsSnapshot> for StatisticsResponse {
  fn from(snapshot: StatisticsSnapshot) -> Self {
    Self {
      total_transactions: snapshot.total_transactions,
      average_transaction_amount: snapshot.average_transaction_amount,
      top_transactions: snapshot
        .top_transactions
        .into_iter()
        .map(TopTransactionResponse::from)
        .collect(),
    }
  }
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct ErrorResponse {
  detail: String,
}

impl ErrorResponse {
  pub fn new<D: Into<String>>(detail: D) -> Self {
    Self {
      detail: detail.into(),
    }
  }
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;
  use serde_json::json;

  use super::*;

  #[test]
  fn transaction_from_request() {
    let request: TransactionRequest = serde_json::from_value(json!({
      "transaction_id": "test_1",
      "user_id": "user_1",
      "amount": 100.25,
      "currency": "USD",
      "timestamp": "2024-12-12T12:00:00"
    }))
    .unwrap();

    assert_eq!(
      Transaction::from(request),
      Transaction::new(
        "test_1",
        "user_1",
        dec!(100.25),
        "USD",
        Utc.with_ymd_and_hms(2024, 12, 12, 12, 0, 0).unwrap()
      )
    );
  }

  #[test]
  fn transaction_request_missing_field() {
    let result = serde_json::from_value::<TransactionRequest>(json!({
      "transaction_id": "test_1",
      "amount": 100.0,
      "currency": "USD",
      "timestamp": "2024-12-12T12:00:00"
    }));

    assert!(result.is_err());
  }

  #[test]
  fn transaction_request_mistyped_amount() {
    let result = serde_json::from_value::<TransactionRequest>(json!({
      "transaction_id": "test_1",
      "user_id": "user_1",
      "amount": true,
      "currency": "USD",
      "timestamp": "2024-12-12T12:00:00"
    }));

    assert!(result.is_err());
  }

  #[test]
  fn parse_amount_cases() {
    let cases = vec![
      (100.25, Ok(dec!(100.25))),
      (-12.5, Ok(dec!(-12.5))),
      (0.0, Ok(dec!(0))),
      (5e28, Ok(dec!(50000000000000000000000000000))),
      (1e-28, Ok(dec!(0.0000000000000000000000000001))),
      (
        1e30,
        Err(AmountError::OutOfRange(
          "1000000000000000000000000000000".to_string(),
        )),
      ),
      (
        -1e30,
        Err(AmountError::OutOfRange(
          "-1000000000000000000000000000000".to_string(),
        )),
      ),
      (
        1e-30,
        Err(AmountError::TooManyDecimals(
          "0.000000000000000000000000000001".to_string(),
        )),
      ),
    ];

    for (input, expected) in cases {
      assert_eq!(parse_amount(input), expected, "{}", input);
    }
  }

  #[test]
  fn transaction_request_amount_out_of_range() {
    let result = serde_json::from_str::<TransactionRequest>(
      r#"{
        "transaction_id": "test_1",
        "user_id": "user_1",
        "amount": 1e30,
        "currency": "USD",
        "timestamp": "2024-12-12T12:00:00"
      }"#,
    );

    let message = result.unwrap_err().to_string();
    assert!(message.contains("is out of range"), "{}", message);
  }

  #[test]
  fn transaction_request_amount_too_many_decimals() {
    let result = serde_json::from_str::<TransactionRequest>(
      r#"{
        "transaction_id": "test_1",
        "user_id": "user_1",
        "amount": 1e-30,
        "currency": "USD",
        "timestamp": "2024-12-12T12:00:00"
      }"#,
    );

    let message = result.unwrap_err().to_string();
    assert!(message.contains("more than 28 decimal places"), "{}", message);
  }

  #[test]
  fn parse_timestamp_formats() {
    let noon = Utc.with_ymd_and_hms(2024, 12, 12, 12, 0, 0).unwrap();

    let cases = vec![
      ("2024-12-12T12:00:00", Some(noon)),
      ("2024-12-12 12:00:00", Some(noon)),
      ("2024-12-12T12:00:00Z", Some(noon)),
      ("2024-12-12T14:00:00+02:00", Some(noon)),
      ("2024-12-12T12:00:00.000", Some(noon)),
      ("2024-12-12", None),
      ("yesterday", None),
    ];

    for (input, expected) in cases {
      assert_eq!(parse_timestamp(input), expected, "{}", input);
    }
  }

  #[test]
  fn statistics_response_json() {
    let snapshot = StatisticsSnapshot {
      total_transactions: 2,
      average_transaction_amount: dec!(250),
      top_transactions: vec![
        TopTransaction::new("test_3", dec!(300)),
        TopTransaction::new("test_2", dec!(200)),
      ],
    };

    let value = serde_json::to_value(StatisticsResponse::from(snapshot)).unwrap();

    assert_eq!(
      value,
      json!({
        "total_transactions": 2,
        "average_transaction_amount": 250.0,
        "top_transactions": [
          {"transaction_id": "test_3", "amount": 300.0},
          {"transaction_id": "test_2", "amount": 200.0}
        ]
      })
    );
  }

  #[test]
  fn empty_statistics_response_json() {
    let value = serde_json::to_value(StatisticsResponse::from(StatisticsSnapshot::empty())).unwrap();

    assert_eq!(
      value,
      json!({
        "total_transactions": 0,
        "average_transaction_amount": 0.0,
        "top_transactions": []
      })
    );
  }
}
