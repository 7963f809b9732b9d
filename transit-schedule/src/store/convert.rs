//! Conversion from store rows to domain types.
//!
//! Rows are trusted for structure (the store decoded them) but time strings
//! are parsed here, so malformed times surface as `ParseError`.

use crate::domain::{
    Agency, Direction, GtfsTime, ParseError, PickupDropOffType, Route, Service, ServiceException,
    ServiceId, StopTime, Trip, TripInfo, WeekdayFlags, WheelchairAccessible,
};

use super::types::{AgencyRow, CalendarDateRow, CalendarRow, RouteRow, StopTimeRow, TripDetail};

/// Convert an exception row.
pub fn exception_from_row(row: &CalendarDateRow) -> ServiceException {
    ServiceException {
        service_id: row.service_id.clone(),
        date: row.date,
        exception_type: row.exception_type,
    }
}

/// Build a service from its weekday pattern alone.
pub fn service_from_pattern(row: &CalendarRow) -> Service {
    Service::new(
        row.service_id.clone(),
        row.weekdays(),
        Some(row.window()),
        Vec::new(),
    )
}

/// Combine a service's weekday pattern (if any) with its exception history.
///
/// Returns `None` when the service has neither a pattern nor exceptions.
pub fn service_from_rows(
    id: &ServiceId,
    pattern: Option<&CalendarRow>,
    exceptions: &[CalendarDateRow],
) -> Option<Service> {
    if pattern.is_none() && exceptions.is_empty() {
        return None;
    }

    let exceptions = exceptions.iter().map(exception_from_row).collect();
    let service = match pattern {
        Some(row) => Service::new(id.clone(), row.weekdays(), Some(row.window()), exceptions),
        None => Service::new(id.clone(), WeekdayFlags::none(), None, exceptions),
    };
    Some(service)
}

/// Resolve one side of a stop time: precomputed seconds first, then the string.
fn row_time(seconds: Option<u32>, text: &str) -> Option<Result<GtfsTime, ParseError>> {
    match seconds {
        Some(s) => Some(GtfsTime::try_from(s)),
        None if text.trim().is_empty() => None,
        None => Some(GtfsTime::parse(text)),
    }
}

/// Departure time of a stop-time row in seconds since midnight.
///
/// A missing departure falls back to the arrival, as GTFS allows a stop time
/// to give only one of the two.
pub fn departure_seconds(row: &StopTimeRow) -> Result<u32, ParseError> {
    let departure = row_time(row.departure_seconds, &row.departure_time)
        .or_else(|| row_time(row.arrival_seconds, &row.arrival_time))
        .ok_or_else(|| ParseError::time("stop time has neither arrival nor departure"))??;
    Ok(departure.seconds())
}

/// Convert a stop-time row.
pub fn stop_time_from_row(row: &StopTimeRow) -> Result<StopTime, ParseError> {
    let arrival = row_time(row.arrival_seconds, &row.arrival_time).transpose()?;
    let departure = row_time(row.departure_seconds, &row.departure_time).transpose()?;

    let (arrival, departure) = match (arrival, departure) {
        (Some(a), Some(d)) => (a, d),
        (Some(a), None) => (a, a),
        (None, Some(d)) => (d, d),
        (None, None) => {
            return Err(ParseError::time(
                "stop time has neither arrival nor departure",
            ));
        }
    };

    let code = |c: Option<u8>| {
        c.and_then(PickupDropOffType::from_code)
            .unwrap_or_default()
    };

    Ok(StopTime {
        stop_id: row.stop_id.clone(),
        arrival,
        departure,
        stop_sequence: row.stop_sequence,
        pickup_type: code(row.pickup_type),
        drop_off_type: code(row.drop_off_type),
        service_date: None,
    })
}

fn agency_from_row(row: &AgencyRow) -> Agency {
    Agency {
        id: row.agency_id.clone(),
        name: row.agency_name.clone(),
        url: row.agency_url.clone(),
        timezone: row.agency_timezone.clone(),
    }
}

fn route_from_rows(route: &RouteRow, agency: Option<&AgencyRow>) -> Route {
    Route {
        id: route.route_id.clone(),
        agency: agency.map(agency_from_row),
        short_name: route.route_short_name.clone(),
        long_name: route.route_long_name.clone(),
        route_type: route.route_type,
    }
}

/// Build a full trip from a store's trip detail.
pub fn trip_from_detail(detail: &TripDetail) -> Result<Trip, ParseError> {
    let stop_times = detail
        .stop_times
        .iter()
        .map(stop_time_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let info = TripInfo {
        short_name: detail.trip.trip_short_name.clone(),
        headsign: detail.trip.trip_headsign.clone(),
        direction: detail.trip.direction_id.and_then(Direction::from_code),
        wheelchair: detail
            .trip
            .wheelchair_accessible
            .and_then(WheelchairAccessible::from_code),
        description: detail.trip.trip_desc.clone(),
    };

    Ok(Trip::new(
        detail.trip.trip_id.clone(),
        route_from_rows(&detail.route, detail.agency.as_ref()),
        detail.trip.service_id.clone(),
        stop_times,
        info,
    ))
}
