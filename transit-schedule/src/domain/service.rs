//! Service calendar types.
//!
//! A `Service` is a named weekly operating pattern with a validity window,
//! plus date-specific `ServiceException` overlays (GTFS `calendar.txt` and
//! `calendar_dates.txt`).

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{ServiceDate, ServiceId};

/// Which days of the week a service pattern runs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdayFlags(u8);

impl WeekdayFlags {
    /// No days set.
    pub fn none() -> Self {
        Self(0)
    }

    /// Build from the seven GTFS columns, Monday first.
    pub fn from_bools(
        mon: bool,
        tue: bool,
        wed: bool,
        thu: bool,
        fri: bool,
        sat: bool,
        sun: bool,
    ) -> Self {
        let mut flags = Self::none();
        for (day, on) in [
            (Weekday::Mon, mon),
            (Weekday::Tue, tue),
            (Weekday::Wed, wed),
            (Weekday::Thu, thu),
            (Weekday::Fri, fri),
            (Weekday::Sat, sat),
            (Weekday::Sun, sun),
        ] {
            if on {
                flags.set(day);
            }
        }
        flags
    }

    /// Mark the service available on a day.
    pub fn set(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    /// Returns true if the service is available on the day.
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Returns true if no day is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Debug for WeekdayFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const DAYS: [(Weekday, char); 7] = [
            (Weekday::Mon, 'M'),
            (Weekday::Tue, 'T'),
            (Weekday::Wed, 'W'),
            (Weekday::Thu, 'T'),
            (Weekday::Fri, 'F'),
            (Weekday::Sat, 'S'),
            (Weekday::Sun, 'S'),
        ];
        let pattern: String = DAYS
            .iter()
            .map(|(day, c)| if self.contains(*day) { *c } else { '-' })
            .collect();
        write!(f, "WeekdayFlags({pattern})")
    }
}

/// Whether an exception adds or removes service on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionType {
    /// Service runs on the date even if the weekday pattern says it doesn't.
    Added,
    /// Service does not run on the date even if the weekday pattern says it does.
    Removed,
}

impl ExceptionType {
    /// Parse a GTFS `exception_type` code (1 = added, 2 = removed).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ExceptionType::Added),
            2 => Some(ExceptionType::Removed),
            _ => None,
        }
    }

    /// Returns the GTFS `exception_type` code.
    pub fn code(&self) -> u8 {
        match self {
            ExceptionType::Added => 1,
            ExceptionType::Removed => 2,
        }
    }
}

/// A date-specific override of a service's weekday pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceException {
    pub service_id: ServiceId,
    pub date: ServiceDate,
    pub exception_type: ExceptionType,
}

/// Inclusive date range in which a weekday pattern applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidityWindow {
    pub start: ServiceDate,
    pub end: ServiceDate,
}

impl ValidityWindow {
    /// Returns true if `date` lies within the window (inclusive at both ends).
    pub fn contains(&self, date: ServiceDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A service calendar: weekday pattern, validity window and exceptions.
///
/// A service known only through `calendar_dates` has no weekday pattern;
/// that is represented as `validity: None` with empty flags.
///
/// # Examples
///
/// ```
/// use transit_schedule::domain::{
///     ExceptionType, Service, ServiceDate, ServiceException, ServiceId, ValidityWindow,
///     WeekdayFlags,
/// };
///
/// let date = |d| ServiceDate::from_yyyymmdd(d).unwrap();
/// let id = ServiceId::new("WKDY");
/// let service = Service::new(
///     id.clone(),
///     WeekdayFlags::from_bools(true, true, true, true, true, false, false),
///     Some(ValidityWindow { start: date(20240101), end: date(20241231) }),
///     vec![ServiceException {
///         service_id: id,
///         date: date(20240101),
///         exception_type: ExceptionType::Removed,
///     }],
/// );
///
/// assert!(service.runs_on(date(20240102)));  // Tuesday
/// assert!(!service.runs_on(date(20240101))); // removed
/// assert!(!service.runs_on(date(20240106))); // Saturday
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: ServiceId,
    pub weekdays: WeekdayFlags,
    pub validity: Option<ValidityWindow>,
    exceptions: Vec<ServiceException>,
}

impl Service {
    /// Create a service. Exceptions are stored ordered by date (stable).
    pub fn new(
        id: ServiceId,
        weekdays: WeekdayFlags,
        validity: Option<ValidityWindow>,
        mut exceptions: Vec<ServiceException>,
    ) -> Self {
        exceptions.sort_by_key(|e| e.date);
        Self {
            id,
            weekdays,
            validity,
            exceptions,
        }
    }

    /// Returns true if the service has a weekday pattern.
    pub fn has_pattern(&self) -> bool {
        self.validity.is_some()
    }

    /// All exceptions for this service, ordered by date.
    pub fn exceptions(&self) -> &[ServiceException] {
        &self.exceptions
    }

    /// Exceptions that apply on a given date.
    pub fn exceptions_on(&self, date: ServiceDate) -> impl Iterator<Item = &ServiceException> {
        self.exceptions.iter().filter(move |e| e.date == date)
    }

    /// Returns true if the weekday pattern alone would run on `date`.
    pub fn pattern_runs_on(&self, date: ServiceDate) -> bool {
        self.validity.is_some_and(|window| window.contains(date))
            && self.weekdays.contains(date.weekday())
    }

    /// Returns true if the service operates on `date` after applying exceptions.
    ///
    /// An `Added` exception on the date wins over a `Removed` one.
    pub fn runs_on(&self, date: ServiceDate) -> bool {
        let mut removed = false;
        for exception in self.exceptions_on(date) {
            match exception.exception_type {
                ExceptionType::Added => return true,
                ExceptionType::Removed => removed = true,
            }
        }
        !removed && self.pattern_runs_on(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: u32) -> ServiceDate {
        ServiceDate::from_yyyymmdd(value).unwrap()
    }

    fn exception(id: &str, d: u32, exception_type: ExceptionType) -> ServiceException {
        ServiceException {
            service_id: ServiceId::new(id),
            date: date(d),
            exception_type,
        }
    }

    fn weekday_service(exceptions: Vec<ServiceException>) -> Service {
        Service::new(
            ServiceId::new("WKDY"),
            WeekdayFlags::from_bools(true, true, true, true, true, false, false),
            Some(ValidityWindow {
                start: date(20240101),
                end: date(20241231),
            }),
            exceptions,
        )
    }

    #[test]
    fn weekday_flags() {
        let flags = WeekdayFlags::from_bools(true, false, true, false, true, false, false);
        assert!(flags.contains(Weekday::Mon));
        assert!(!flags.contains(Weekday::Tue));
        assert!(flags.contains(Weekday::Wed));
        assert!(!flags.contains(Weekday::Sun));
        assert!(!flags.is_empty());
        assert!(WeekdayFlags::none().is_empty());
        assert_eq!(format!("{flags:?}"), "WeekdayFlags(M-W-F--)");
    }

    #[test]
    fn exception_codes() {
        assert_eq!(ExceptionType::from_code(1), Some(ExceptionType::Added));
        assert_eq!(ExceptionType::from_code(2), Some(ExceptionType::Removed));
        assert_eq!(ExceptionType::from_code(0), None);
        assert_eq!(ExceptionType::Removed.code(), 2);
    }

    #[test]
    fn exception_type_serde() {
        let t: ExceptionType = serde_json::from_str("\"added\"").unwrap();
        assert_eq!(t, ExceptionType::Added);
    }

    #[test]
    fn pattern_and_window() {
        let service = weekday_service(vec![]);
        assert!(service.runs_on(date(20240304))); // Monday
        assert!(!service.runs_on(date(20240303))); // Sunday
        assert!(!service.runs_on(date(20250106))); // Monday, outside window
        assert!(service.runs_on(date(20241231))); // Tuesday, last day
    }

    #[test]
    fn exceptions_override_pattern() {
        let service = weekday_service(vec![
            exception("WKDY", 20240304, ExceptionType::Removed),
            exception("WKDY", 20240309, ExceptionType::Added),
        ]);
        assert!(!service.runs_on(date(20240304)));
        assert!(service.runs_on(date(20240309))); // Saturday, added
        assert!(service.runs_on(date(20240305)));
    }

    #[test]
    fn added_wins_over_removed_on_same_date() {
        let service = weekday_service(vec![
            exception("WKDY", 20240304, ExceptionType::Removed),
            exception("WKDY", 20240304, ExceptionType::Added),
        ]);
        assert!(service.runs_on(date(20240304)));
    }

    #[test]
    fn exceptions_sorted_by_date() {
        let service = weekday_service(vec![
            exception("WKDY", 20240310, ExceptionType::Added),
            exception("WKDY", 20240301, ExceptionType::Removed),
            exception("WKDY", 20240305, ExceptionType::Removed),
        ]);
        let dates: Vec<u32> = service
            .exceptions()
            .iter()
            .map(|e| e.date.as_yyyymmdd())
            .collect();
        assert_eq!(dates, vec![20240301, 20240305, 20240310]);
    }

    #[test]
    fn service_without_pattern() {
        let service = Service::new(
            ServiceId::new("XMAS"),
            WeekdayFlags::none(),
            None,
            vec![exception("XMAS", 20241225, ExceptionType::Added)],
        );
        assert!(!service.has_pattern());
        assert!(service.runs_on(date(20241225)));
        assert!(!service.runs_on(date(20241226)));
    }
}
