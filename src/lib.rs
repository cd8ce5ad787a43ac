//! graphql over http with caching and retries
//!
//! this crate sends graphql operations to a single endpoint and hands back
//! a [`GraphQlResponse`] carrying data plus a normalized error list. start
//! with [`Client`] and [`ClientConfig`], build a [`GraphQlRequest`], then
//! call [`Client::execute`].
//!
//! ## quick start
//!
//! ```no_run
//! use gqlpipe::{Client, ClientConfig, GraphQlRequest};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("https://api.example.com/graphql"))?;
//! let request = GraphQlRequest::new("query Account($id: ID!) { account(id: $id) { id } }")
//!     .with_variables(json!({ "id": 1 }))
//!     .with_operation_name("Account");
//!
//! let response = client.execute(&request).await;
//! if response.is_success() {
//!     println!("{:?}", response.data);
//! } else {
//!     for error in &response.errors {
//!         eprintln!("{error}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## pipeline
//!
//! `execute` checks the cache first, then rejects queries that name no
//! operation keyword, then posts the request with up to `max_retries`
//! retries on transport failures. error-free responses are cached.
//! `execute` never fails; use [`Client::execute_as`] or
//! [`Client::fetch_field`] to get a `Result` instead.

mod cache;
mod client;
mod config;
mod error;
mod graphql;
mod operation;
mod parser;
mod request;
mod retry;

pub use cache::CacheStore;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlResponse};
pub use operation::Operation;
pub use parser::parse_response;
pub use request::GraphQlRequest;
pub use retry::RetryPolicy;
