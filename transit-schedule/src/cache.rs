//! Caching layer for calendar queries.
//!
//! Calendar rows change only when a new feed is loaded, while the resolver
//! asks for the same dates and services on every search. `CachedStore`
//! memoises the four calendar queries; trip and stop-time queries pass
//! through untouched.
//!
//! Failed fetches are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{ServiceDate, ServiceId, StopId, TripId};
use crate::store::{CalendarDateRow, CalendarRow, ScheduleStore, StoreError, StopTimeRow, TripDetail};

type RowsEntry<T> = Arc<Vec<T>>;

/// Sizing and expiry for the calendar caches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached row stays valid.
    pub ttl: Duration,

    /// Maximum number of cached entries per query kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

fn build<K, V>(config: &CacheConfig) -> MokaCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    MokaCache::builder()
        .time_to_live(config.ttl)
        .max_capacity(config.max_capacity)
        .build()
}

/// Schedule store with cached calendar lookups.
///
/// Wraps any `ScheduleStore` and is itself one, so the resolver and matcher
/// use it transparently.
pub struct CachedStore<S> {
    inner: S,
    weekday_services: MokaCache<ServiceDate, RowsEntry<CalendarRow>>,
    exceptions_on_date: MokaCache<ServiceDate, RowsEntry<CalendarDateRow>>,
    patterns: MokaCache<ServiceId, Option<CalendarRow>>,
    service_exceptions: MokaCache<ServiceId, RowsEntry<CalendarDateRow>>,
}

impl<S: ScheduleStore> CachedStore<S> {
    /// Create a new cached store.
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        Self {
            inner,
            weekday_services: build(config),
            exceptions_on_date: build(config),
            patterns: build(config),
            service_exceptions: build(config),
        }
    }

    /// Access the underlying store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Forget every cached calendar row, e.g. after the feed is reloaded.
    pub fn invalidate_all(&self) {
        self.weekday_services.invalidate_all();
        self.exceptions_on_date.invalidate_all();
        self.patterns.invalidate_all();
        self.service_exceptions.invalidate_all();
    }
}

impl<S: ScheduleStore> ScheduleStore for CachedStore<S> {
    async fn fetch_weekday_services(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<CalendarRow>, StoreError> {
        if let Some(cached) = self.weekday_services.get(&date).await {
            trace!(%date, "Weekday services cache hit");
            return Ok(cached.as_ref().clone());
        }

        let rows = self.inner.fetch_weekday_services(date).await?;
        self.weekday_services
            .insert(date, Arc::new(rows.clone()))
            .await;
        Ok(rows)
    }

    async fn fetch_service_pattern(
        &self,
        service_id: &ServiceId,
    ) -> Result<Option<CalendarRow>, StoreError> {
        if let Some(cached) = self.patterns.get(service_id).await {
            trace!(service = %service_id, "Service pattern cache hit");
            return Ok(cached);
        }

        let row = self.inner.fetch_service_pattern(service_id).await?;
        self.patterns.insert(service_id.clone(), row.clone()).await;
        Ok(row)
    }

    async fn fetch_exceptions_on_date(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<CalendarDateRow>, StoreError> {
        if let Some(cached) = self.exceptions_on_date.get(&date).await {
            trace!(%date, "Exceptions cache hit");
            return Ok(cached.as_ref().clone());
        }

        let rows = self.inner.fetch_exceptions_on_date(date).await?;
        self.exceptions_on_date
            .insert(date, Arc::new(rows.clone()))
            .await;
        Ok(rows)
    }

    async fn fetch_service_exceptions(
        &self,
        service_id: &ServiceId,
    ) -> Result<Vec<CalendarDateRow>, StoreError> {
        if let Some(cached) = self.service_exceptions.get(service_id).await {
            return Ok(cached.as_ref().clone());
        }

        let rows = self.inner.fetch_service_exceptions(service_id).await?;
        self.service_exceptions
            .insert(service_id.clone(), Arc::new(rows.clone()))
            .await;
        Ok(rows)
    }

    async fn fetch_candidate_trips(
        &self,
        origin: &StopId,
        destination: &StopId,
        departure_seconds: u32,
        services: &[ServiceId],
    ) -> Result<Vec<TripId>, StoreError> {
        self.inner
            .fetch_candidate_trips(origin, destination, departure_seconds, services)
            .await
    }

    async fn fetch_stop_visits(
        &self,
        trip: &TripId,
        stop: &StopId,
    ) -> Result<Vec<StopTimeRow>, StoreError> {
        self.inner.fetch_stop_visits(trip, stop).await
    }

    async fn fetch_trip_detail(&self, trip: &TripId) -> Result<Option<TripDetail>, StoreError> {
        self.inner.fetch_trip_detail(trip).await
    }
}
