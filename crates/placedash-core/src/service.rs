//! Cached access to upstream records.
//!
//! `DataService` sits between the UI and the `RecordSource`. Collections are
//! cached under their resource key; single records are cached under
//! `<singular>-<id>` and may be seeded from an already cached collection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error};

use crate::api::{ApiError, RecordSource};
use crate::cache::TtlCache;
use crate::models::{Record, ResourceKind};

/// What the shared cache holds.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    Collection(Arc<Vec<Record>>),
    Item(Record),
}

/// Cache plus fetch layer. Clone is cheap; clones share the cache.
#[derive(Clone)]
pub struct DataService {
    source: Arc<dyn RecordSource>,
    cache: Arc<Mutex<TtlCache<CacheEntry>>>,
}

impl DataService {
    pub fn new(source: Arc<dyn RecordSource>, cache: TtlCache<CacheEntry>) -> Self {
        Self {
            source,
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    fn cache(&self) -> MutexGuard<'_, TtlCache<CacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached_collection(&self, kind: ResourceKind) -> Option<Arc<Vec<Record>>> {
        match self.cache().get(&kind.collection_key()) {
            Some(CacheEntry::Collection(records)) => Some(records),
            _ => None,
        }
    }

    fn cached_item(&self, kind: ResourceKind, id: i64) -> Option<Record> {
        match self.cache().get(&kind.item_key(id)) {
            Some(CacheEntry::Item(record)) => Some(record),
            _ => None,
        }
    }

    /// All records of `kind`, from cache when fresh.
    pub async fn collection(&self, kind: ResourceKind) -> Result<Arc<Vec<Record>>, ApiError> {
        if let Some(records) = self.cached_collection(kind) {
            debug!(%kind, count = records.len(), "Collection cache hit");
            return Ok(records);
        }

        let records = match self.source.fetch_collection(kind).await {
            Ok(records) => Arc::new(records),
            Err(e) => {
                error!(%kind, error = %e, "Error fetching collection");
                return Err(e);
            }
        };

        self.cache()
            .set(kind.collection_key(), CacheEntry::Collection(Arc::clone(&records)));
        Ok(records)
    }

    /// One record of `kind`: item cache, then a scan of the cached
    /// collection, then the network.
    pub async fn item(&self, kind: ResourceKind, id: i64) -> Result<Record, ApiError> {
        if let Some(record) = self.cached_item(kind, id) {
            debug!(%kind, id, "Item cache hit");
            return Ok(record);
        }

        if let Some(records) = self.cached_collection(kind) {
            if let Some(found) = records.iter().find(|r| r.id() == id) {
                debug!(%kind, id, "Item found in cached collection");
                self.cache().set(kind.item_key(id), CacheEntry::Item(found.clone()));
                return Ok(found.clone());
            }
        }

        let record = match self.source.fetch_item(kind, id).await {
            Ok(record) => record,
            Err(e) => {
                error!(%kind, id, error = %e, "Error fetching item");
                return Err(e);
            }
        };

        self.cache().set(kind.item_key(id), CacheEntry::Item(record.clone()));
        Ok(record)
    }

    /// Resolve a detail route from raw input. An unknown resource or a
    /// non-numeric id is reported the same way as a missing record.
    pub async fn resolve(&self, segment: &str, raw_id: &str) -> Result<Record, ApiError> {
        let kind = ResourceKind::from_segment(segment)
            .ok_or_else(|| ApiError::NotFound(format!("unknown resource '{}'", segment)))?;
        let id = parse_id(raw_id)
            .ok_or_else(|| ApiError::NotFound(format!("invalid id '{}'", raw_id)))?;
        self.item(kind, id).await
    }

    /// Drop every cached collection and record.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    /// "just now" / "3m ago" for a fresh cached collection.
    pub fn collection_age(&self, kind: ResourceKind) -> Option<String> {
        self.cache().age_display(&kind.collection_key())
    }
}

/// Record ids are integers; surrounding whitespace is tolerated.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use crate::cache::{ManualClock, DEFAULT_TTL_MINUTES};
    use crate::models::Album;

    fn album(id: i64, user_id: i64) -> Record {
        Record::Album(Album {
            id,
            title: format!("Album {}", id),
            user_id,
        })
    }

    #[derive(Default)]
    struct CountingSource {
        collection_calls: AtomicUsize,
        item_calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RecordSource for CountingSource {
        async fn fetch_collection(&self, _kind: ResourceKind) -> Result<Vec<Record>, ApiError> {
            self.collection_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::ServerError("boom".to_string()));
            }
            Ok((1..=10).map(|id| album(id, id % 3)).collect())
        }

        async fn fetch_item(&self, _kind: ResourceKind, id: i64) -> Result<Record, ApiError> {
            self.item_calls.fetch_add(1, Ordering::SeqCst);
            if id > 100 {
                return Err(ApiError::NotFound(String::new()));
            }
            Ok(album(id, 1))
        }
    }

    fn build_service(source: Arc<CountingSource>) -> (DataService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = TtlCache::with_clock(Duration::minutes(DEFAULT_TTL_MINUTES), clock.clone());
        (DataService::new(source, cache), clock)
    }

    #[tokio::test]
    async fn test_collection_is_fetched_once_while_fresh() {
        let source = Arc::new(CountingSource::default());
        let (service, _clock) = build_service(source.clone());

        let first = service.collection(ResourceKind::Albums).await.unwrap();
        let second = service.collection(ResourceKind::Albums).await.unwrap();
        assert_eq!(first.len(), 10);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.collection_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_collection_refetched_after_ttl() {
        let source = Arc::new(CountingSource::default());
        let (service, clock) = build_service(source.clone());

        service.collection(ResourceKind::Albums).await.unwrap();
        clock.advance(Duration::minutes(6));
        service.collection(ResourceKind::Albums).await.unwrap();
        assert_eq!(source.collection_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_item_from_cached_collection_skips_network() {
        let source = Arc::new(CountingSource::default());
        let (service, _clock) = build_service(source.clone());

        service.collection(ResourceKind::Albums).await.unwrap();
        let record = service.item(ResourceKind::Albums, 5).await.unwrap();
        assert_eq!(record.id(), 5);
        assert_eq!(record.user_id(), Some(2));
        assert_eq!(source.item_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_item_seeded_into_item_cache() {
        let source = Arc::new(CountingSource::default());
        let (service, _clock) = build_service(source.clone());

        service.collection(ResourceKind::Albums).await.unwrap();
        service.item(ResourceKind::Albums, 5).await.unwrap();
        {
            let keys = service.cache().keys();
            assert!(keys.contains(&"album-5".to_string()));
        }
        assert_eq!(source.collection_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_item_missing_from_collection_goes_to_network() {
        let source = Arc::new(CountingSource::default());
        let (service, _clock) = build_service(source.clone());

        service.collection(ResourceKind::Albums).await.unwrap();
        service.item(ResourceKind::Albums, 42).await.unwrap();
        service.item(ResourceKind::Albums, 42).await.unwrap();
        assert_eq!(source.item_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate_and_are_not_cached() {
        let source = Arc::new(CountingSource {
            fail: true,
            ..Default::default()
        });
        let (service, _clock) = build_service(source.clone());

        assert!(service.collection(ResourceKind::Posts).await.is_err());
        assert!(service.collection(ResourceKind::Posts).await.is_err());
        assert_eq!(source.collection_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_bad_input_is_not_found() {
        let source = Arc::new(CountingSource::default());
        let (service, _clock) = build_service(source.clone());

        assert!(service.resolve("photos", "1").await.unwrap_err().is_not_found());
        assert!(service.resolve("albums", "abc").await.unwrap_err().is_not_found());
        assert!(service.resolve("albums", "101").await.unwrap_err().is_not_found());
        assert_eq!(service.resolve("albums", " 7 ").await.unwrap().id(), 7);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let source = Arc::new(CountingSource::default());
        let (service, _clock) = build_service(source.clone());

        service.collection(ResourceKind::Albums).await.unwrap();
        assert_eq!(service.collection_age(ResourceKind::Albums).as_deref(), Some("just now"));
        service.clear_cache();
        assert_eq!(service.collection_age(ResourceKind::Albums), None);
        service.collection(ResourceKind::Albums).await.unwrap();
        assert_eq!(source.collection_calls.load(Ordering::SeqCst), 2);
    }
}
