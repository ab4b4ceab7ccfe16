//! In-memory caching module.
//!
//! This module provides `TtlCache`, a string-keyed store whose entries are
//! considered absent once older than the TTL (five minutes by default).
//! The data service keeps two kinds of entries in one cache:
//! - collections, keyed by resource (`posts`)
//! - single records, keyed by resource and id (`post-5`)

pub mod ttl;

pub use ttl::{CachedData, Clock, ManualClock, SystemClock, TtlCache, DEFAULT_TTL_MINUTES};
