//! JSON-backed in-memory schedule store.
//!
//! Loads a whole feed (agencies, routes, trips, stop times, calendar and
//! calendar dates) from one JSON document and answers store queries from
//! memory. Every query preserves feed order, so results are deterministic.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{ServiceDate, ServiceId, StopId, TripId};

use super::convert::departure_seconds;
use super::error::StoreError;
use super::types::{
    AgencyRow, CalendarDateRow, CalendarRow, RouteRow, StopTimeRow, TripDetail, TripRow,
};
use super::ScheduleStore;

/// A whole feed as plain rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleData {
    #[serde(default)]
    pub agencies: Vec<AgencyRow>,
    #[serde(default)]
    pub routes: Vec<RouteRow>,
    #[serde(default)]
    pub trips: Vec<TripRow>,
    #[serde(default)]
    pub stop_times: Vec<StopTimeRow>,
    #[serde(default)]
    pub calendar: Vec<CalendarRow>,
    #[serde(default)]
    pub calendar_dates: Vec<CalendarDateRow>,
}

/// A stop-time row with its departure resolved to seconds.
#[derive(Debug, Clone)]
struct IndexedStopTime {
    departure_seconds: u32,
    row: StopTimeRow,
}

/// In-memory schedule store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: ScheduleData,
    /// Trip id → index into `data.trips`.
    trips_by_id: HashMap<TripId, usize>,
    /// Trip id → stop times ordered by sequence (stable).
    stop_times_by_trip: HashMap<TripId, Vec<IndexedStopTime>>,
}

impl MemoryStore {
    /// Build a store, indexing stop times by trip.
    ///
    /// Fails if a stop time has no usable time, so queries never see a row
    /// whose departure can't be compared.
    pub fn new(data: ScheduleData) -> Result<Self, StoreError> {
        let mut trips_by_id = HashMap::with_capacity(data.trips.len());
        for (idx, trip) in data.trips.iter().enumerate() {
            trips_by_id.entry(trip.trip_id.clone()).or_insert(idx);
        }

        let mut stop_times_by_trip: HashMap<TripId, Vec<IndexedStopTime>> = HashMap::new();
        for row in &data.stop_times {
            let departure_seconds =
                departure_seconds(row).map_err(|e| StoreError::InvalidRow {
                    table: "stop_times",
                    message: format!(
                        "trip {} stop {} sequence {}: {e}",
                        row.trip_id, row.stop_id, row.stop_sequence
                    ),
                })?;
            stop_times_by_trip
                .entry(row.trip_id.clone())
                .or_default()
                .push(IndexedStopTime {
                    departure_seconds,
                    row: row.clone(),
                });
        }
        for stop_times in stop_times_by_trip.values_mut() {
            stop_times.sort_by_key(|st| st.row.stop_sequence);
        }

        info!(
            trips = data.trips.len(),
            stop_times = data.stop_times.len(),
            calendar = data.calendar.len(),
            calendar_dates = data.calendar_dates.len(),
            "Loaded schedule"
        );

        Ok(Self {
            data,
            trips_by_id,
            stop_times_by_trip,
        })
    }

    /// Parse a feed from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let data: ScheduleData = serde_json::from_str(json)?;
        Self::new(data)
    }

    /// Load a feed from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading schedule file");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The raw feed rows.
    pub fn data(&self) -> &ScheduleData {
        &self.data
    }

    fn stop_times(&self, trip: &TripId) -> &[IndexedStopTime] {
        self.stop_times_by_trip
            .get(trip)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Agency for a route: its own agency id, or the feed's only agency.
    fn agency_for(&self, route: &RouteRow) -> Option<&AgencyRow> {
        match &route.agency_id {
            Some(id) => self
                .data
                .agencies
                .iter()
                .find(|a| a.agency_id.as_ref() == Some(id)),
            None if self.data.agencies.len() == 1 => self.data.agencies.first(),
            None => None,
        }
    }
}

impl ScheduleStore for MemoryStore {
    async fn fetch_weekday_services(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<CalendarRow>, StoreError> {
        Ok(self
            .data
            .calendar
            .iter()
            .filter(|row| row.is_active_on(date))
            .cloned()
            .collect())
    }

    async fn fetch_service_pattern(
        &self,
        service_id: &ServiceId,
    ) -> Result<Option<CalendarRow>, StoreError> {
        Ok(self
            .data
            .calendar
            .iter()
            .find(|row| &row.service_id == service_id)
            .cloned())
    }

    async fn fetch_exceptions_on_date(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<CalendarDateRow>, StoreError> {
        Ok(self
            .data
            .calendar_dates
            .iter()
            .filter(|row| row.date == date)
            .cloned()
            .collect())
    }

    async fn fetch_service_exceptions(
        &self,
        service_id: &ServiceId,
    ) -> Result<Vec<CalendarDateRow>, StoreError> {
        let mut rows: Vec<CalendarDateRow> = self
            .data
            .calendar_dates
            .iter()
            .filter(|row| &row.service_id == service_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    async fn fetch_candidate_trips(
        &self,
        origin: &StopId,
        destination: &StopId,
        departure_seconds: u32,
        services: &[ServiceId],
    ) -> Result<Vec<TripId>, StoreError> {
        let services: HashSet<&ServiceId> = services.iter().collect();

        Ok(self
            .data
            .trips
            .iter()
            .filter(|trip| services.contains(&trip.service_id))
            .filter(|trip| {
                let stop_times = self.stop_times(&trip.trip_id);
                let visits_destination = stop_times.iter().any(|st| &st.row.stop_id == destination);
                let departs_origin = stop_times.iter().any(|st| {
                    &st.row.stop_id == origin && st.departure_seconds == departure_seconds
                });
                visits_destination && departs_origin
            })
            .map(|trip| trip.trip_id.clone())
            .collect())
    }

    async fn fetch_stop_visits(
        &self,
        trip: &TripId,
        stop: &StopId,
    ) -> Result<Vec<StopTimeRow>, StoreError> {
        Ok(self
            .stop_times(trip)
            .iter()
            .filter(|st| &st.row.stop_id == stop)
            .map(|st| st.row.clone())
            .collect())
    }

    async fn fetch_trip_detail(&self, trip: &TripId) -> Result<Option<TripDetail>, StoreError> {
        let Some(&idx) = self.trips_by_id.get(trip) else {
            return Ok(None);
        };
        let trip_row = &self.data.trips[idx];

        let route = self
            .data
            .routes
            .iter()
            .find(|r| r.route_id == trip_row.route_id)
            .ok_or_else(|| StoreError::InvalidRow {
                table: "trips",
                message: format!(
                    "trip {} references unknown route {}",
                    trip_row.trip_id, trip_row.route_id
                ),
            })?;

        Ok(Some(TripDetail {
            trip: trip_row.clone(),
            route: route.clone(),
            agency: self.agency_for(route).cloned(),
            stop_times: self
                .stop_times(trip)
                .iter()
                .map(|st| st.row.clone())
                .collect(),
        }))
    }
}
