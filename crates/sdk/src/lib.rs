//! # Redash SDK
//!
//! Async Rust client for the Redash REST API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redash_sdk::{RedashClient, RedashResult};
//!
//! #[tokio::main]
//! async fn main() -> RedashResult<()> {
//!     let client = RedashClient::builder()
//!         .base_url("https://redash.example.com")
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     // Runs the query, polling the execution job until a result is stored.
//!     let result = client.queries().execute(42, None).await?;
//!     println!("{} rows", result.rows().len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use api::{
    AdhocQueryRequest, CreateQueryRequest, CreateVisualizationRequest, ExecutionResponse,
    ListQueriesParams, UpdateQueryRequest, UpdateVisualizationRequest,
};
pub use client::{RedashClient, RedashClientBuilder};
pub use config::{ClientConfig, PollOptions, DEFAULT_TIMEOUT};
pub use error::{RedashError, RedashResult};
pub use types::{
    job_status, ArchiveResult, Dashboard, DataSource, Job, Paginated, Query, QueryResult,
    Visualization,
};
