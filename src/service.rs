use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use crate::jobs::{Job, JobQueue, TaskId};
use crate::statistics::{self, StatisticsSnapshot};
use crate::transactions::{StoreError, Transaction, TransactionId, TransactionStore};

pub type Result<T> = core::result::Result<T, ServiceError>;

/// Errors surfaced by the [`TransactionService`] operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
  #[error("Transaction ID already exists: {0}")]
  DuplicatedTransaction(TransactionId),

  #[error("Store unavailable: {0}")]
  StoreUnavailable(String),
}

impl From<StoreError> for ServiceError {
  fn from(error: StoreError) -> Self {
    match error {
      StoreError::DuplicatedTransaction(id) => ServiceError::DuplicatedTransaction(id),
      StoreError::Unavailable(reason) => ServiceError::StoreUnavailable(reason),
    }
  }
}

/// This is the entry point for the operations exposed by the API.
///
/// Both the store and the job queue are injected, so they can be replaced with different implementations.
/// Statistics are always computed from a fresh scan of the store when requested,
/// which means they reflect every transaction committed before the request started.
#[derive(Clone)]
pub struct TransactionService {
  store: Arc<dyn TransactionStore>,
  jobs: Arc<dyn JobQueue>,
}

impl TransactionService {
  pub fn new(store: Arc<dyn TransactionStore>, jobs: Arc<dyn JobQueue>) -> Self {
    Self { store, jobs }
  }

  /// Store a new transaction and schedule the statistics recomputation.
  ///
  /// The returned [`TaskId`] is the same one carried by the submitted job.
  /// A failure to submit the job does not fail the operation, the transaction is already stored.
  pub async fn create_transaction(&self, transaction: Transaction) -> Result<TaskId> {
    let transaction_id = transaction.id.clone();

    if let Err(err) = self.store.insert(transaction).await {
      warn!("Transaction {} rejected: {}", transaction_id, err);
      return Err(err.into());
    }

    let task_id = TaskId::new();
    if let Err(err) = self.jobs.submit(Job::RecomputeStatistics { task_id }) {
      warn!("Transaction {}: {}", transaction_id, err);
    }

    info!("Transaction {} received, task {}", transaction_id, task_id);
    Ok(task_id)
  }

  /// Remove every transaction, returning how many were there.
  pub async fn delete_all_transactions(&self) -> Result<u64> {
    let removed = self.store.delete_all().await?;
    info!("All transactions deleted ({})", removed);
    Ok(removed)
  }

  pub async fn statistics(&self) -> Result<StatisticsSnapshot> {
    let transactions = self.store.scan().await?;
    Ok(statistics::compute(&transactions))
  }
}
