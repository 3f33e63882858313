use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{
  store::{Result, StoreError, TransactionStore},
  transaction::Transaction,
};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS transactions (
  id TEXT PRIMARY KEY,
  user_id TEXT NOT NULL,
  amount NUMERIC NOT NULL,
  currency TEXT NOT NULL,
  timestamp TIMESTAMPTZ NOT NULL
)";

const CREATE_USER_INDEX: &str =
  "CREATE INDEX IF NOT EXISTS transactions_user_id_idx ON transactions (user_id)";

impl From<sqlx::Error> for StoreError {
  fn from(error: sqlx::Error) -> Self {
    StoreError::Unavailable(error.to_string())
  }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
  id: String,
  user_id: String,
  amount: Decimal,
  currency: String,
  timestamp: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
  fn from(row: TransactionRow) -> Self {
    Transaction::new(row.id, row.user_id, row.amount, row.currency, row.timestamp)
  }
}

/// Implementation of the [`TransactionStore`] backed by a PostgreSQL table.
///
/// Uniqueness of the IDs is enforced by the primary key, so concurrent inserts
/// with the same ID can not both succeed.
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
  pool: PgPool,
}

impl PgTransactionStore {
  /// Connect to the database and make sure the schema exists.
  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;

    let store = Self::with_pool(pool).await?;
    info!("Connected to PostgreSQL store");
    Ok(store)
  }

  /// Use an existing pool, creating the schema when missing.
  pub async fn with_pool(pool: PgPool) -> Result<Self> {
    let store = Self { pool };
    store.create_schema().await?;
    Ok(store)
  }

  async fn create_schema(&self) -> Result<()> {
    sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
    sqlx::query(CREATE_USER_INDEX).execute(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
  async fn insert(&self, transaction: Transaction) -> Result<()> {
    let inserted = sqlx::query(
      "INSERT INTO transactions (id, user_id, amount, currency, timestamp)
       VALUES ($1, $2, $3, $4, $5)
       ON CONFLICT (id) DO NOTHING",
    )
    .bind(&transaction.id)
    .bind(&transaction.user_id)
    .bind(transaction.amount)
    .bind(&transaction.currency)
    .bind(transaction.timestamp)
    .execute(&self.pool)
    .await?
    .rows_affected();

    if inserted == 0 {
      Err(StoreError::DuplicatedTransaction(transaction.id))
    } else {
      debug!("Stored transaction {}", transaction.id);
      Ok(())
    }
  }

  async fn delete_all(&self) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM transactions")
      .execute(&self.pool)
      .await?
      .rows_affected();
    debug!("Removed {} transactions", removed);
    Ok(removed)
  }

  async fn scan(&self) -> Result<Vec<Transaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(
      "SELECT id, user_id, amount, currency, timestamp FROM transactions ORDER BY id",
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Transaction::from).collect())
  }
}
