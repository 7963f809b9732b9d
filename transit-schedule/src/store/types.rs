//! Schedule store row DTOs.
//!
//! These types map directly to GTFS table rows as a store returns them.
//! Optional GTFS columns are `Option`; day flags accept either booleans or
//! the GTFS `0`/`1` encoding, and exception types accept either names or
//! the GTFS `1`/`2` codes.

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    AgencyId, ExceptionType, RouteId, ServiceDate, ServiceId, StopId, TripId, ValidityWindow,
    WeekdayFlags,
};

/// A `calendar.txt` row: weekly pattern and validity window of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub service_id: ServiceId,
    #[serde(deserialize_with = "day_flag")]
    pub monday: bool,
    #[serde(deserialize_with = "day_flag")]
    pub tuesday: bool,
    #[serde(deserialize_with = "day_flag")]
    pub wednesday: bool,
    #[serde(deserialize_with = "day_flag")]
    pub thursday: bool,
    #[serde(deserialize_with = "day_flag")]
    pub friday: bool,
    #[serde(deserialize_with = "day_flag")]
    pub saturday: bool,
    #[serde(deserialize_with = "day_flag")]
    pub sunday: bool,
    pub start_date: ServiceDate,
    pub end_date: ServiceDate,
}

impl CalendarRow {
    /// The seven day flags as a bitset.
    pub fn weekdays(&self) -> WeekdayFlags {
        WeekdayFlags::from_bools(
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        )
    }

    /// Returns true if the row's flag for `day` is "available".
    pub fn is_available(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn window(&self) -> ValidityWindow {
        ValidityWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Returns true if the pattern runs on `date`: weekday flag set and date in window.
    pub fn is_active_on(&self, date: ServiceDate) -> bool {
        self.is_available(date.weekday()) && self.window().contains(date)
    }
}

/// A `calendar_dates.txt` row: one exception for one service on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDateRow {
    pub service_id: ServiceId,
    pub date: ServiceDate,
    #[serde(deserialize_with = "exception_type")]
    pub exception_type: ExceptionType,
}

/// An `agency.txt` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyRow {
    #[serde(default)]
    pub agency_id: Option<AgencyId>,
    pub agency_name: String,
    #[serde(default)]
    pub agency_url: Option<String>,
    #[serde(default)]
    pub agency_timezone: Option<String>,
}

/// A `routes.txt` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRow {
    pub route_id: RouteId,
    #[serde(default)]
    pub agency_id: Option<AgencyId>,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
    #[serde(default)]
    pub route_type: Option<u16>,
}

/// A `trips.txt` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRow {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    #[serde(default)]
    pub trip_short_name: Option<String>,
    #[serde(default)]
    pub trip_headsign: Option<String>,
    #[serde(default)]
    pub direction_id: Option<u8>,
    #[serde(default)]
    pub wheelchair_accessible: Option<u8>,
    #[serde(default)]
    pub trip_desc: Option<String>,
}

/// A `stop_times.txt` row.
///
/// Stores may precompute `arrival_seconds`/`departure_seconds`; when absent
/// they are derived from the time strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeRow {
    pub trip_id: TripId,
    pub stop_id: StopId,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_seconds: Option<u32>,
    #[serde(default)]
    pub departure_seconds: Option<u32>,
    pub stop_sequence: u32,
    #[serde(default)]
    pub pickup_type: Option<u8>,
    #[serde(default)]
    pub drop_off_type: Option<u8>,
}

/// Everything needed to build a full trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDetail {
    pub trip: TripRow,
    pub route: RouteRow,
    pub agency: Option<AgencyRow>,
    pub stop_times: Vec<StopTimeRow>,
}

/// Accept `true`/`false` or GTFS `1`/`0` for a day flag.
fn day_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Code(u8),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Code(1) => Ok(true),
        Flag::Code(0) => Ok(false),
        Flag::Code(_) => Err(serde::de::Error::custom("day flag must be 0 or 1")),
    }
}

/// Accept `"added"`/`"removed"` or GTFS `1`/`2` for an exception type.
fn exception_type<'de, D>(deserializer: D) -> Result<ExceptionType, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Named(ExceptionType),
        Code(u8),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Named(t) => Ok(t),
        Raw::Code(code) => ExceptionType::from_code(code)
            .ok_or_else(|| serde::de::Error::custom("exception_type must be 1 or 2")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_row_accepts_gtfs_flags() {
        let json = r#"{
            "service_id": "WKDY",
            "monday": 1, "tuesday": 1, "wednesday": 1, "thursday": 1, "friday": 1,
            "saturday": 0, "sunday": false,
            "start_date": 20240101, "end_date": 20241231
        }"#;
        let row: CalendarRow = serde_json::from_str(json).unwrap();
        assert!(row.monday);
        assert!(!row.saturday);
        assert!(!row.sunday);
        assert_eq!(row.start_date.as_yyyymmdd(), 20240101);
    }

    #[test]
    fn calendar_row_rejects_bad_flag() {
        let json = r#"{
            "service_id": "WKDY",
            "monday": 2, "tuesday": 1, "wednesday": 1, "thursday": 1, "friday": 1,
            "saturday": 0, "sunday": 0,
            "start_date": 20240101, "end_date": 20241231
        }"#;
        assert!(serde_json::from_str::<CalendarRow>(json).is_err());
    }

    #[test]
    fn calendar_row_activity() {
        let row = CalendarRow {
            service_id: ServiceId::new("WKDY"),
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
            start_date: ServiceDate::from_yyyymmdd(20240101).unwrap(),
            end_date: ServiceDate::from_yyyymmdd(20240331).unwrap(),
        };
        let date = |d| ServiceDate::from_yyyymmdd(d).unwrap();
        assert!(row.is_active_on(date(20240304))); // Monday
        assert!(!row.is_active_on(date(20240303))); // Sunday
        assert!(!row.is_active_on(date(20240401))); // Monday, after window
        assert!(row.weekdays().contains(Weekday::Fri));
    }

    #[test]
    fn calendar_date_row_accepts_codes_and_names() {
        let row: CalendarDateRow =
            serde_json::from_str(r#"{"service_id": "S1", "date": 20240304, "exception_type": 2}"#)
                .unwrap();
        assert_eq!(row.exception_type, ExceptionType::Removed);

        let row: CalendarDateRow = serde_json::from_str(
            r#"{"service_id": "S1", "date": 20240304, "exception_type": "added"}"#,
        )
        .unwrap();
        assert_eq!(row.exception_type, ExceptionType::Added);

        assert!(
            serde_json::from_str::<CalendarDateRow>(
                r#"{"service_id": "S1", "date": 20240304, "exception_type": 3}"#
            )
            .is_err()
        );
    }

    #[test]
    fn stop_time_row_optional_columns() {
        let row: StopTimeRow = serde_json::from_str(
            r#"{"trip_id": "T1", "stop_id": "A", "departure_time": "08:00:00", "stop_sequence": 1}"#,
        )
        .unwrap();
        assert_eq!(row.arrival_time, "");
        assert_eq!(row.departure_seconds, None);
        assert_eq!(row.pickup_type, None);
    }
}
