//! placedash core library.
//!
//! Data access for the placedash dashboard, independent of any UI:
//!
//! - `api`: HTTP client for the upstream REST service
//! - `cache`: TTL-expiring in-memory cache
//! - `service`: cache-in-front-of-fetch access and detail resolution
//! - `filter`: search/user filters and pagination
//! - `query`: view state and location strings
//! - `config`: persisted settings
//! - `models`: record types

pub mod api;
pub mod cache;
pub mod config;
pub mod filter;
pub mod models;
pub mod query;
pub mod service;

pub use api::{ApiClient, ApiError, RecordSource};
pub use cache::TtlCache;
pub use config::Config;
pub use filter::{filter_records, paginate, FilterState, Page, PAGE_SIZE};
pub use models::{Record, ResourceKind};
pub use query::{Route, RouteError, ViewState};
pub use service::{CacheEntry, DataService};
