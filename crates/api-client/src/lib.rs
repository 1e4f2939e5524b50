//! Generic REST data-access adapter for the Carebase admin front-end
//!
//! This crate is the layer between the admin UI and the records backend: it
//! translates abstract list/get/create/update/delete operations into REST
//! calls, normalizes every response into a uniform record shape, and
//! classifies failures into a single error type.
//!
//! # Features
//!
//! - **Environment-based configuration**: base URL, timeout, and environment
//!   label read once at startup and immutable thereafter
//! - **Explicit credentials**: a [`CredentialProvider`](credentials::CredentialProvider)
//!   passed at construction instead of ambient global state
//! - **Deadline per call**: every request races a timeout and the loser is
//!   cancelled; nothing retries
//! - **Uniform records**: the origin's native key is mapped onto a canonical
//!   `id` field without losing the original
//! - **Request correlation**: `X-Request-ID` on every outgoing request
//!
//! # Example
//!
//! ```rust,no_run
//! use carebase_api_client::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let transport = Transport::new(config, Arc::new(EnvToken::standard()))?;
//!     let provider = DataProvider::new(transport);
//!
//!     let page = provider
//!         .list("patients", &ListQuery::new().with_filter("status", "active"))
//!         .await?;
//!     println!("{} of {} patients", page.data.len(), page.total);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod provider;
pub mod query;
pub mod record;
pub mod transport;
pub mod url;

pub use config::{ClientConfig, Environment};
pub use error::{ApiError, ApiResult};
pub use provider::{DataProvider, DeleteOutcome};
pub use record::{ListResult, Record};
pub use transport::Transport;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::credentials::{CredentialProvider, EnvToken, NoCredentials, StaticToken};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::provider::{DataProvider, DeleteOutcome};
    pub use crate::query::{ListQuery, Pagination, Sort, SortOrder};
    pub use crate::record::{ListResult, Record};
    pub use crate::transport::{Body, RequestOptions, Transport};
    pub use crate::url::UrlBuilder;
}
