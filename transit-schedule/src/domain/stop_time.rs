//! Stop-time types for scheduled trips.
//!
//! A `StopTime` is the scheduled arrival and departure of one trip at one
//! stop, with its position (`stop_sequence`) along the trip. Sequence numbers
//! increase along a trip but need not be contiguous.

use super::{GtfsTime, ScheduleInstant, ServiceDate, StopId};

/// GTFS `pickup_type` / `drop_off_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PickupDropOffType {
    /// Regularly scheduled pickup or drop-off.
    #[default]
    Regular,
    /// No pickup or drop-off available.
    NotAvailable,
    /// Must phone the agency to arrange.
    PhoneAgency,
    /// Must coordinate with the driver.
    CoordinateWithDriver,
}

impl PickupDropOffType {
    /// Parse a GTFS code (0-3).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Regular),
            1 => Some(Self::NotAvailable),
            2 => Some(Self::PhoneAgency),
            3 => Some(Self::CoordinateWithDriver),
            _ => None,
        }
    }

    /// Returns the GTFS code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Regular => 0,
            Self::NotAvailable => 1,
            Self::PhoneAgency => 2,
            Self::CoordinateWithDriver => 3,
        }
    }
}

/// A scheduled call of a trip at a stop.
///
/// Times are relative to the service day. When the stop time has been
/// produced for a particular date, `service_date` records it so that
/// extended (≥ 24:00:00) times can be placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTime {
    pub stop_id: StopId,
    pub arrival: GtfsTime,
    pub departure: GtfsTime,
    pub stop_sequence: u32,
    pub pickup_type: PickupDropOffType,
    pub drop_off_type: PickupDropOffType,
    pub service_date: Option<ServiceDate>,
}

impl StopTime {
    /// Creates a stop time with regular pickup/drop-off and no service date.
    pub fn new(stop_id: StopId, arrival: GtfsTime, departure: GtfsTime, stop_sequence: u32) -> Self {
        Self {
            stop_id,
            arrival,
            departure,
            stop_sequence,
            pickup_type: PickupDropOffType::Regular,
            drop_off_type: PickupDropOffType::Regular,
            service_date: None,
        }
    }

    /// Returns a copy tagged with the service date it applies to.
    pub fn with_service_date(mut self, date: ServiceDate) -> Self {
        self.service_date = Some(date);
        self
    }

    /// Arrival as canonical `"HH:MM:SS"`.
    pub fn arrival_text(&self) -> String {
        self.arrival.to_hms_string()
    }

    /// Departure as canonical `"HH:MM:SS"`.
    pub fn departure_text(&self) -> String {
        self.departure.to_hms_string()
    }

    /// Arrival placed on the service date, if one is tagged.
    pub fn arrival_instant(&self) -> Option<ScheduleInstant> {
        self.service_date
            .map(|date| ScheduleInstant::new(date, self.arrival))
    }

    /// Departure placed on the service date, if one is tagged.
    pub fn departure_instant(&self) -> Option<ScheduleInstant> {
        self.service_date
            .map(|date| ScheduleInstant::new(date, self.departure))
    }
}

/// Order a trip's stop times by ascending `stop_sequence`.
///
/// The sort is stable: if the data repeats a sequence number, the rows keep
/// their input order.
pub fn assemble_stop_times(mut stop_times: Vec<StopTime>) -> Vec<StopTime> {
    stop_times.sort_by_key(|st| st.stop_sequence);
    stop_times
}

/// Find the first stop time at `stop`.
pub fn find_stop_time<'a>(stop_times: &'a [StopTime], stop: &StopId) -> Option<&'a StopTime> {
    stop_times.iter().find(|st| &st.stop_id == stop)
}
