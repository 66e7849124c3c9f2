//! # OneView
//!
//! An async client for the HPE OneView REST API.
//!
//! Every OneView resource type lives under a base path such as
//! `/rest/fc-networks` and follows the same conventions: paginated
//! collections, addresses that are either a bare id or a full URI, and
//! mutating calls that may hand back a long-running task. This crate
//! implements those conventions once, in
//! [`ResourceClient`](resource::ResourceClient), and layers small typed
//! facades on top of it.
//!
//! ## Features
//!
//! - **Pagination**: `get_all` follows `nextPageUri` until the requested
//!   count is reached or the collection is exhausted
//! - **Tasks**: create, update, patch and delete wait for asynchronous tasks
//!   with a bounded, backing-off poll loop
//! - **Query building**: filters, sort, view and field lists are
//!   percent-encoded and emitted in a fixed order
//! - **Security**: the session id is never logged or exposed in error messages
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with session id sanitization
//! - [`connection`] - The transport trait and its reqwest implementation
//! - [`query`] - Query string construction
//! - [`task_monitor`] - Waiting for asynchronous tasks
//! - [`resource`] - The generic resource client
//! - [`resources`] - Typed facades for individual resource types
//! - [`client`] - Entry point exposing every facade
//! - [`models`] - Resource, collection and task representations
//! - [`mock`] - In-memory transport for tests
//!
//! ## Configuration
//!
//! Required:
//!
//! - `ONEVIEW_BASE_URL`: Base URL of the appliance
//! - `ONEVIEW_SESSION_ID`: Session id from a prior login
//!
//! Optional:
//!
//! - `ONEVIEW_API_VERSION`: `X-API-Version` header value (default 300)
//! - `ONEVIEW_TASK_POLL_MS` / `ONEVIEW_TASK_MAX_POLL_MS`: task polling schedule
//!
//! ## Example
//!
//! ```ignore
//! use oneview::{Config, OneViewClient, QueryParams, RequestOptions};
//! use serde_json::json;
//!
//! async fn example() -> Result<(), oneview::OneViewError> {
//!     let config = Config::load()?;
//!     let client = OneViewClient::new(&config)?;
//!
//!     let networks = client.fc_networks();
//!     let created = networks
//!         .create(
//!             json!({"name": "SAN A"}).as_object().unwrap(),
//!             &RequestOptions::new().with_timeout(std::time::Duration::from_secs(60)),
//!         )
//!         .await?;
//!     println!("created {}", created["uri"]);
//!
//!     let params = QueryParams::new().with_sort("name:ascending");
//!     for network in networks.get_all(&params).await? {
//!         println!("{}", network["name"]);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod mock;
pub mod models;
pub mod query;
pub mod resource;
pub mod resources;
pub mod task_monitor;

pub use client::OneViewClient;
pub use config::Config;
pub use connection::{Connection, HttpConnection, Outcome};
pub use error::{OneViewError, Result};
pub use models::Resource;
pub use query::{QueryParams, UtilizationQuery};
pub use resource::{DeleteOutcome, RequestOptions, ResourceClient, ResourceRef};
pub use task_monitor::TaskMonitor;
