//! Worker communication module.
//!
//! Talks to an external database worker process that owns the connection
//! pools for network databases. starql sends it compiled SQL with bind
//! values and gets back rows.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            starql (Rust + Tokio)              │
//! │  WorkerClient                                 │
//! │  - spawns the worker as a child process       │
//! │  - NDJSON protocol over stdin/stdout          │
//! │  - request ids correlate concurrent requests  │
//! └───────────────────────────────────────────────┘
//!              stdin (NDJSON) │ stdout (NDJSON)
//!                             ▼
//! ┌───────────────────────────────────────────────┐
//! │        Worker (long-running child process)    │
//! │  - pooled connections per connection string   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use starql::worker::WorkerClient;
//!
//! let client = WorkerClient::spawn("./starql-worker").await?;
//! let response = client
//!     .execute_query("postgres", "postgres://localhost/retail", "SELECT 1", vec![])
//!     .await?;
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
