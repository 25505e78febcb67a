//! # Flock SDK
//!
//! Rate-limited client for JSON:API 1.0 people-directory services such as
//! the Planning Center People API.
//!
//! Every request is gated through a shared sliding-window rate limiter
//! (100 requests per 60 seconds by default) before it may touch the
//! network, and transient failures are retried with bounded backoff.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flock_sdk::{FlockClient, FlockResult, Include, IncludeSpec};
//!
//! #[tokio::main]
//! async fn main() -> FlockResult<()> {
//!     let client = FlockClient::builder()
//!         .base_url("https://api.planningcenteronline.com/people/v2")
//!         .basic_auth("app-client-id", "app-secret")
//!         .build()?;
//!
//!     let include = IncludeSpec::new().with(Include::PhoneNumbers);
//!     let people = client.people().search("Nick Werhle", include).await?;
//!     for person in &people {
//!         println!("{}", serde_json::to_string_pretty(person).unwrap());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-export main client
pub use client::{FlockClient, FlockClientBuilder, DEFAULT_MAX_PAGES};
pub use config::{ClientConfig, Credentials, RateLimitConfig, RetryConfig};
pub use error::{Error, FlockResult};

// Re-export core types for convenience
pub use flock_core::{
    // Documents
    document::{Document, NextPage, Relationship, RelationshipData, Resource, ResourceIdentifier},
    // Flattening
    flatten::{flatten, FlatRecord},
    // Rate limiting
    limiter::{RateLimitExceeded, RateLimiter},
    // Query building
    query::{
        Filter, FilterSpec, Include, IncludeSpec, Order, PageSpec, Query, ValidationError,
        MAX_PER_PAGE,
    },
};
