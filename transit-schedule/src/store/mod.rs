//! Service record store access.
//!
//! The resolver and matcher read the schedule through the [`ScheduleStore`]
//! trait. Every method is a read-only query; none has a side effect the
//! callers depend on, so fetches for unrelated ids may run concurrently.
//!
//! [`MemoryStore`] is a JSON-backed implementation used by the binary and by
//! tests. Production deployments supply their own database-backed store.

mod convert;
mod error;
mod memory;
mod types;

pub use convert::{
    departure_seconds, exception_from_row, service_from_pattern, service_from_rows,
    stop_time_from_row, trip_from_detail,
};
pub use error::StoreError;
pub use memory::{MemoryStore, ScheduleData};
pub use types::{
    AgencyRow, CalendarDateRow, CalendarRow, RouteRow, StopTimeRow, TripDetail, TripRow,
};

use crate::domain::{ServiceDate, ServiceId, StopId, TripId};

/// Read-only access to a static schedule.
///
/// Implementations return rows in a deterministic order; callers that pick
/// "the first" result rely on it.
#[allow(async_fn_in_trait)]
pub trait ScheduleStore {
    /// Weekday-pattern rows whose flag for `date`'s weekday is set and whose
    /// validity window contains `date`.
    async fn fetch_weekday_services(&self, date: ServiceDate)
    -> Result<Vec<CalendarRow>, StoreError>;

    /// The weekday-pattern row of one service, if it has one.
    async fn fetch_service_pattern(
        &self,
        service_id: &ServiceId,
    ) -> Result<Option<CalendarRow>, StoreError>;

    /// All exception rows dated exactly `date`.
    async fn fetch_exceptions_on_date(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<CalendarDateRow>, StoreError>;

    /// All exception rows of one service, ordered by date ascending.
    async fn fetch_service_exceptions(
        &self,
        service_id: &ServiceId,
    ) -> Result<Vec<CalendarDateRow>, StoreError>;

    /// Trips running under one of `services` that call at `destination` and
    /// depart `origin` at exactly `departure_seconds`.
    async fn fetch_candidate_trips(
        &self,
        origin: &StopId,
        destination: &StopId,
        departure_seconds: u32,
        services: &[ServiceId],
    ) -> Result<Vec<TripId>, StoreError>;

    /// Every stop time of `trip` at `stop`, ordered by sequence. A trip
    /// that calls at the stop more than once yields one row per visit.
    async fn fetch_stop_visits(
        &self,
        trip: &TripId,
        stop: &StopId,
    ) -> Result<Vec<StopTimeRow>, StoreError>;

    /// Trip, route, agency and stop-time rows for one trip.
    async fn fetch_trip_detail(&self, trip: &TripId) -> Result<Option<TripDetail>, StoreError>;
}
