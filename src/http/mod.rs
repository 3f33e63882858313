//! This module contains the HTTP API on top of the [`crate::service::TransactionService`].
//!
//! The [`dto`] structs are intentionally separated from the domain model, so the wire format can evolve independently.
//

mod dto;
mod error;
mod routes;

pub use routes::router;
