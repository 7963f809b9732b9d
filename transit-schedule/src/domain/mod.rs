//! Domain types for the schedule resolver.
//!
//! This module contains the validated value types that represent a static
//! GTFS schedule. Types that can be invalid (times, dates) enforce their
//! invariants at construction, so code that receives them can trust them.

mod error;
mod ids;
mod service;
mod stop_time;
mod time;
mod trip;

pub use error::{ParseError, ParseTarget};
pub use ids::{AgencyId, RouteId, ServiceId, StopId, TripId};
pub use service::{ExceptionType, Service, ServiceException, ValidityWindow, WeekdayFlags};
pub use stop_time::{PickupDropOffType, StopTime, assemble_stop_times, find_stop_time};
pub use time::{GtfsTime, MAX_TIME_SECONDS, SECONDS_PER_DAY, ScheduleInstant, ServiceDate};
pub use trip::{Agency, Direction, Route, Trip, TripInfo, WheelchairAccessible};
