use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Identifier handed to the clients as a receipt, and carried by the job it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl fmt::Display for TaskId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Work that can be executed in the background.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
  RecomputeStatistics { task_id: TaskId },
}

impl Job {
  pub fn task_id(&self) -> TaskId {
    match self {
      Job::RecomputeStatistics { task_id } => *task_id,
    }
  }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JobQueueError {
  #[error("Job queue is full, job {0} dropped")]
  Full(TaskId),

  #[error("Job queue is closed, job {0} dropped")]
  Closed(TaskId),
}

/// Interface to hand jobs over to a background runner. Submitting never waits for the job to run.
pub trait JobQueue: Send + Sync {
  fn submit(&self, job: Job) -> Result<(), JobQueueError>;
}

/// Implementation of the [`JobQueue`] using a bounded channel.
/// The receiving side is meant to be consumed by a [`super::JobRunner`].
#[derive(Debug, Clone)]
pub struct ChannelJobQueue {
  sender: mpsc::Sender<Job>,
}

impl ChannelJobQueue {
  pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Job>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (Self { sender }, receiver)
  }
}

impl JobQueue for ChannelJobQueue {
  fn submit(&self, job: Job) -> Result<(), JobQueueError> {
    self.sender.try_send(job).map_err(|err| match err {
      TrySendError::Full(job) => JobQueueError::Full(job.task_id()),
      TrySendError::Closed(job) => JobQueueError::Closed(job.task_id()),
    })
  }
}
