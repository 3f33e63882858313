//! This module contains the background jobs and how they are handed over to a runner.
//!
//! Submitting a job through a [`JobQueue`] is fire-and-forget, the [`JobRunner`] picks them up out of the request path.
//

mod queue;
mod runner;

#[cfg(test)]
pub(crate) use queue::JobQueueError;

pub use queue::{ChannelJobQueue, Job, JobQueue, TaskId};
pub use runner::JobRunner;
