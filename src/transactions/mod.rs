//! This module contains the transaction records and where they are persisted.
//!
//! The [`TransactionStore`] trait is the only thing the rest of the service knows about persistence.
//! [`InMemoryTransactionStore`] is useful for tests and local runs, while [`PgTransactionStore`] keeps them in PostgreSQL.
//

mod postgres;
mod store;
mod transaction;

#[cfg(test)]
pub(crate) use store::MockTestTransactionStore;
#[cfg(test)]
pub(crate) use transaction::with_amount;

pub use postgres::PgTransactionStore;
pub use store::{InMemoryTransactionStore, StoreError, TransactionStore};
pub use transaction::{Transaction, TransactionId};
