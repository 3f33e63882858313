use std::net::SocketAddr;

use clap::Parser;

/// Service configuration. Every option can be given in the command line or through its environment variable.
#[derive(Debug, Parser)]
#[command(author, version, about = "Records financial transactions and serves statistics over them")]
pub struct Config {
  /// Address the HTTP server listens on
  #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:8000")]
  pub bind_address: SocketAddr,

  /// Shared secret expected in the `api-key` header of every request
  #[arg(long, env = "API_KEY", hide_env_values = true)]
  pub api_key: String,

  /// PostgreSQL connection string. Transactions are kept in memory when missing.
  #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
  pub database_url: Option<String>,

  #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
  pub database_max_connections: u32,

  /// Maximum number of pending background jobs
  #[arg(long, env = "JOB_QUEUE_CAPACITY", default_value_t = 1024)]
  pub job_queue_capacity: usize,
}
