use std::collections::HashSet;

use async_trait::async_trait;
use log::debug;
use thiserror::Error;
use tokio::sync::RwLock;

use super::transaction::{Transaction, TransactionId};

pub type Result<T> = core::result::Result<T, StoreError>;

/// Errors returned by a [`TransactionStore`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
  #[error("Duplicated transaction: {0}")]
  DuplicatedTransaction(TransactionId),

  #[error("Store unavailable: {0}")]
  Unavailable(String),
}

/// Interface implemented by the transaction stores.
///
/// Implementations are responsible of keeping the transaction IDs unique,
/// so `insert` has to check and insert as a single atomic step.
#[async_trait]
pub trait TransactionStore: Send + Sync {
  /// Persist a new transaction, failing with [`StoreError::DuplicatedTransaction`] if the ID is already taken.
  async fn insert(&self, transaction: Transaction) -> Result<()>;
  /// Remove all the transactions and return how many were removed.
  async fn delete_all(&self) -> Result<u64>;
  /// Read all the live transactions. The order must be stable between calls while there are no writes.
  async fn scan(&self) -> Result<Vec<Transaction>>;
}

#[derive(Debug, Default)]
struct Records {
  ids: HashSet<TransactionId>,
  transactions: Vec<Transaction>,
}

/// Implementation of the [`TransactionStore`] that keeps the transactions in memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
  records: RwLock<Records>,
}

impl InMemoryTransactionStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
  async fn insert(&self, transaction: Transaction) -> Result<()> {
    let mut records = self.records.write().await;
    if records.ids.contains(&transaction.id) {
      Err(StoreError::DuplicatedTransaction(transaction.id))
    } else {
      debug!("Storing transaction {}", transaction.id);
      records.ids.insert(transaction.id.clone());
      records.transactions.push(transaction);
      Ok(())
    }
  }

  async fn delete_all(&self) -> Result<u64> {
    let mut records = self.records.write().await;
    let removed = records.transactions.len() as u64;
    *records = Records::default();
    debug!("Removed {} transactions", removed);
    Ok(removed)
  }

  async fn scan(&self) -> Result<Vec<Transaction>> {
    Ok(self.records.read().await.transactions.clone())
  }
}

#[cfg(test)]
mockall::mock! {
  pub TestTransactionStore {}
  #[async_trait]
  impl TransactionStore for TestTransactionStore {
    async fn insert(&self, transaction: Transaction) -> Result<()>;
    async fn delete_all(&self) -> Result<u64>;
    async fn scan(&self) -> Result<Vec<Transaction>>;
  }
}
