//! REST API client module for the upstream record service.
//!
//! This module provides the `ApiClient` for fetching users, posts, comments
//! and albums, and the `RecordSource` trait the data service fetches through.
//! Every call is a single attempt: no retry, no backoff.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{Record, ResourceKind};

pub use client::ApiClient;
pub use error::ApiError;

/// Where records come from when the cache misses.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch a whole collection.
    async fn fetch_collection(&self, kind: ResourceKind) -> Result<Vec<Record>, ApiError>;

    /// Fetch one record by id.
    async fn fetch_item(&self, kind: ResourceKind, id: i64) -> Result<Record, ApiError>;
}
