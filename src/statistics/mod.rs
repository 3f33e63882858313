//! This module contains the computation of the aggregated statistics over the transactions.
//!
//! [`compute`] is a pure function, so the same input always produces the same [`StatisticsSnapshot`].
//

mod engine;
mod snapshot;

pub use engine::compute;
pub use snapshot::{StatisticsSnapshot, TopTransaction};
