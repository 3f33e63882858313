use std::sync::Arc;

use log::{error, info};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

use super::queue::Job;
use crate::statistics::{self, StatisticsSnapshot};
use crate::transactions::{StoreError, TransactionStore};

/// This is the background worker that executes the jobs submitted through a [`super::ChannelJobQueue`].
///
/// Jobs are executed one at a time, in the order they were submitted.
/// Failures are only logged, as whoever submitted the job is not waiting for it.
pub struct JobRunner {
  store: Arc<dyn TransactionStore>,
}

impl JobRunner {
  pub fn new(store: Arc<dyn TransactionStore>) -> Self {
    Self { store }
  }

  /// Consume jobs until every sender of the queue has been dropped, and return how many were executed.
  pub async fn run(self, jobs: mpsc::Receiver<Job>) -> usize {
    let mut jobs = ReceiverStream::new(jobs);
    let mut executed = 0;

    while let Some(job) = jobs.next().await {
      let task_id = job.task_id();
      match self.execute(job).await {
        Ok(snapshot) => info!(
          "Task {}: statistics recomputed, {} transactions, average {}",
          task_id, snapshot.total_transactions, snapshot.average_transaction_amount
        ),
        Err(err) => error!("Task {}: statistics recomputation failed: {}", task_id, err),
      }
      executed += 1;
    }

    info!("Job runner stopped after {} jobs", executed);
    executed
  }

  pub async fn execute(&self, job: Job) -> Result<StatisticsSnapshot, StoreError> {
    match job {
      Job::RecomputeStatistics { .. } => {
        let transactions = self.store.scan().await?;
        Ok(statistics::compute(&transactions))
      }
    }
  }
}
