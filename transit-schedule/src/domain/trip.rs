//! Trip, route and agency types.
//!
//! A `Trip` is one scheduled run of a vehicle along a route on the days its
//! service operates. Its stop times are ordered by sequence once, when the
//! trip is built, and never change afterwards.

use super::{
    AgencyId, RouteId, ServiceDate, ServiceId, StopId, StopTime, TripId, assemble_stop_times,
    find_stop_time,
};

/// A transit agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agency {
    pub id: Option<AgencyId>,
    pub name: String,
    pub url: Option<String>,
    pub timezone: Option<String>,
}

/// A route, optionally with its operating agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub agency: Option<Agency>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub route_type: Option<u16>,
}

impl Route {
    /// Name for display: short name, else long name, else the id.
    pub fn display_name(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(self.id.as_str())
    }
}

/// GTFS `direction_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    /// Parse a GTFS code (0 or 1).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::Outbound),
            1 => Some(Direction::Inbound),
            _ => None,
        }
    }
}

/// GTFS `wheelchair_accessible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelchairAccessible {
    NoInformation,
    Accessible,
    NotAccessible,
}

impl WheelchairAccessible {
    /// Parse a GTFS code (0-2).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WheelchairAccessible::NoInformation),
            1 => Some(WheelchairAccessible::Accessible),
            2 => Some(WheelchairAccessible::NotAccessible),
            _ => None,
        }
    }
}

/// Optional descriptive fields of a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripInfo {
    pub short_name: Option<String>,
    pub headsign: Option<String>,
    pub direction: Option<Direction>,
    pub wheelchair: Option<WheelchairAccessible>,
    pub description: Option<String>,
}

/// A scheduled trip with its stop times in sequence order.
///
/// # Examples
///
/// ```
/// use transit_schedule::domain::{GtfsTime, Route, RouteId, ServiceId, StopId, StopTime, Trip, TripId, TripInfo};
///
/// let st = |stop: &str, seq| {
///     let t = GtfsTime::parse("08:00").unwrap();
///     StopTime::new(StopId::new(stop), t, t, seq)
/// };
/// let route = Route { id: RouteId::new("R1"), agency: None, short_name: None, long_name: None, route_type: None };
///
/// let trip = Trip::new(
///     TripId::new("T1"),
///     route,
///     ServiceId::new("WKDY"),
///     vec![st("C", 3), st("A", 1), st("B", 2)],
///     TripInfo::default(),
/// );
///
/// let order: Vec<u32> = trip.stop_times().iter().map(|s| s.stop_sequence).collect();
/// assert_eq!(order, vec![1, 2, 3]);
/// assert_eq!(trip.get_stop_time(&StopId::new("B")).unwrap().stop_sequence, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,
    pub route: Route,
    pub service_id: ServiceId,
    pub info: TripInfo,
    stop_times: Vec<StopTime>,
}

impl Trip {
    /// Build a trip; stop times are put in sequence order here.
    pub fn new(
        id: TripId,
        route: Route,
        service_id: ServiceId,
        stop_times: Vec<StopTime>,
        info: TripInfo,
    ) -> Self {
        Self {
            id,
            route,
            service_id,
            info,
            stop_times: assemble_stop_times(stop_times),
        }
    }

    /// Stop times ordered by ascending stop sequence.
    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    /// Returns true if the trip calls at `stop`.
    pub fn has_stop_time(&self, stop: &StopId) -> bool {
        self.get_stop_time(stop).is_some()
    }

    /// The first (lowest sequence) stop time at `stop`.
    pub fn get_stop_time(&self, stop: &StopId) -> Option<&StopTime> {
        find_stop_time(&self.stop_times, stop)
    }

    pub fn first_stop_time(&self) -> Option<&StopTime> {
        self.stop_times.first()
    }

    pub fn last_stop_time(&self) -> Option<&StopTime> {
        self.stop_times.last()
    }

    /// Returns the trip with every stop time tagged with `date`.
    pub fn with_service_date(mut self, date: ServiceDate) -> Self {
        for stop_time in &mut self.stop_times {
            stop_time.service_date = Some(date);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GtfsTime;

    fn st(stop: &str, time: &str, sequence: u32) -> StopTime {
        let t = GtfsTime::parse(time).unwrap();
        StopTime::new(StopId::new(stop), t, t, sequence)
    }

    fn route() -> Route {
        Route {
            id: RouteId::new("R1"),
            agency: None,
            short_name: Some("1".into()),
            long_name: Some("Crosstown".into()),
            route_type: Some(3),
        }
    }

    fn trip(stop_times: Vec<StopTime>) -> Trip {
        Trip::new(
            TripId::new("T1"),
            route(),
            ServiceId::new("WKDY"),
            stop_times,
            TripInfo::default(),
        )
    }

    #[test]
    fn stop_times_sorted_regardless_of_input_order() {
        let t = trip(vec![
            st("C", "08:20", 3),
            st("A", "08:00", 1),
            st("B", "08:10", 2),
        ]);
        let order: Vec<u32> = t.stop_times().iter().map(|s| s.stop_sequence).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(t.first_stop_time().unwrap().stop_id, StopId::new("A"));
        assert_eq!(t.last_stop_time().unwrap().stop_id, StopId::new("C"));
    }

    #[test]
    fn lookup_by_stop() {
        let t = trip(vec![
            st("C", "08:20", 3),
            st("A", "08:00", 1),
            st("B", "08:10", 2),
        ]);
        assert!(t.has_stop_time(&StopId::new("C")));
        assert!(!t.has_stop_time(&StopId::new("Z")));
        assert_eq!(
            t.get_stop_time(&StopId::new("C")).unwrap().departure_text(),
            "08:20:00"
        );
        assert_eq!(t.get_stop_time(&StopId::new("A")).unwrap().stop_sequence, 1);
    }

    #[test]
    fn lookup_first_visit_wins() {
        let t = trip(vec![
            st("A", "08:40", 5),
            st("B", "08:10", 2),
            st("A", "08:00", 1),
        ]);
        assert_eq!(t.get_stop_time(&StopId::new("A")).unwrap().stop_sequence, 1);
    }

    #[test]
    fn tag_with_service_date() {
        let date = ServiceDate::from_yyyymmdd(20240304).unwrap();
        let t = trip(vec![st("A", "08:00", 1), st("B", "08:10", 2)]).with_service_date(date);
        assert!(t.stop_times().iter().all(|s| s.service_date == Some(date)));
    }

    #[test]
    fn route_display_name() {
        let mut r = route();
        assert_eq!(r.display_name(), "1");
        r.short_name = None;
        assert_eq!(r.display_name(), "Crosstown");
        r.long_name = None;
        assert_eq!(r.display_name(), "R1");
    }

    #[test]
    fn codes() {
        assert_eq!(Direction::from_code(1), Some(Direction::Inbound));
        assert_eq!(Direction::from_code(2), None);
        assert_eq!(
            WheelchairAccessible::from_code(2),
            Some(WheelchairAccessible::NotAccessible)
        );
    }
}
