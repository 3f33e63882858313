mod config;
mod http;
mod jobs;
mod service;
mod statistics;
mod transactions;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::info;

use crate::config::Config;
use crate::jobs::{ChannelJobQueue, JobRunner};
use crate::service::TransactionService;
use crate::transactions::{InMemoryTransactionStore, PgTransactionStore, TransactionStore};

#[tokio::main]
async fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let config = Config::parse();
  let store = create_store(&config).await?;

  let (job_queue, jobs) = ChannelJobQueue::new(config.job_queue_capacity);
  let job_runner = tokio::spawn(JobRunner::new(store.clone()).run(jobs));

  let service = TransactionService::new(store, Arc::new(job_queue));
  let app = http::router(service, &config.api_key);

  let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
  info!("Listening on {}", listener.local_addr()?);

  // The router owns the last job queue sender, so the runner drains the pending jobs once the server is done.
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  job_runner.await?;

  Ok(())
}

/// This allows to use PostgreSQL if a connection string is configured,
/// or keep everything in memory otherwise, which might be more convenient for local runs.
async fn create_store(config: &Config) -> Result<Arc<dyn TransactionStore>> {
  match &config.database_url {
    Some(database_url) => {
      PgTransactionStore::connect(database_url, config.database_max_connections)
        .await
        .map(|store| Arc::new(store) as Arc<dyn TransactionStore>)
        .map_err(anyhow::Error::from)
    }
    None => {
      info!("No database configured, transactions will be kept in memory");
      Ok(Arc::new(InMemoryTransactionStore::new()))
    }
  }
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    info!("Shutting down");
  }
}
