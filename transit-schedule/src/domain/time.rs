//! Schedule time handling for GTFS data.
//!
//! GTFS expresses times of day relative to the start of a *service day*, so a
//! trip that leaves at 23:50 and arrives after midnight is written with times
//! such as "24:20:00" or "25:30:00" under the earlier date. This module
//! provides types for those extended times, for service dates, and for the
//! combination of the two.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::ParseError;

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Latest representable time of day (32:00:00).
///
/// Post-midnight service of a prior service day is written with hours of 24
/// or more; 32 hours is the upper bound this model accepts.
pub const MAX_TIME_SECONDS: u32 = 32 * 3600;

const MAX_HOUR: u32 = 32;

/// A time of day within a service day, as seconds since midnight.
///
/// Values range from 00:00:00 up to and including 32:00:00.
///
/// # Examples
///
/// ```
/// use transit_schedule::domain::GtfsTime;
///
/// let t = GtfsTime::parse("1:30 PM").unwrap();
/// assert_eq!(t.seconds(), 48_600);
/// assert_eq!(t.to_string(), "13:30:00");
///
/// // Post-midnight service of the previous day
/// let late = GtfsTime::parse("25:00:00").unwrap();
/// assert_eq!(late.seconds(), 90_000);
///
/// assert!(GtfsTime::parse("33:00:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GtfsTime(u32);

impl GtfsTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: GtfsTime = GtfsTime(0);

    /// Create a time from seconds since midnight.
    pub fn from_seconds(seconds: i64) -> Result<Self, ParseError> {
        if seconds < 0 {
            return Err(ParseError::time("seconds must not be negative"));
        }
        if seconds > MAX_TIME_SECONDS as i64 {
            return Err(ParseError::time("time must not exceed 32:00:00"));
        }
        Ok(Self(seconds as u32))
    }

    /// Create a time from hour, minute and second components.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, ParseError> {
        if hour > MAX_HOUR {
            return Err(ParseError::time("hour must be 0-32"));
        }
        if minute > 59 {
            return Err(ParseError::time("minute must be 0-59"));
        }
        if second > 59 {
            return Err(ParseError::time("second must be 0-59"));
        }
        Self::from_seconds((hour * 3600 + minute * 60 + second) as i64)
    }

    /// Parse a time of day.
    ///
    /// Accepted formats, tried in this order:
    /// - `"H:MM AM"` / `"H:MM PM"` (12-hour clock, suffix case-insensitive)
    /// - `"HH:MM:SS"` (hour may be a single digit)
    /// - `"HH:MM"`
    /// - `"HHMM"`
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_schedule::domain::GtfsTime;
    ///
    /// for s in ["1:30 PM", "13:30:00", "13:30", "1330"] {
    ///     assert_eq!(GtfsTime::parse(s).unwrap().to_string(), "13:30:00");
    /// }
    ///
    /// assert!(GtfsTime::parse("12:60").is_err());
    /// assert!(GtfsTime::parse("noon").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::time("empty time string"));
        }

        if let Some((clock, is_pm)) = split_meridiem(s) {
            return parse_twelve_hour(clock, is_pm);
        }

        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [hour, minute, second] => Self::from_hms(
                parse_hour(hour)?,
                parse_minute_or_second(minute, "invalid minute digits")?,
                parse_minute_or_second(second, "invalid second digits")?,
            ),
            [hour, minute] => Self::from_hms(
                parse_hour(hour)?,
                parse_minute_or_second(minute, "invalid minute digits")?,
                0,
            ),
            [compact] if compact.len() == 4 && compact.bytes().all(|b| b.is_ascii_digit()) => {
                let hour = parse_digits(&compact[0..2])
                    .ok_or_else(|| ParseError::time("invalid hour digits"))?;
                let minute = parse_digits(&compact[2..4])
                    .ok_or_else(|| ParseError::time("invalid minute digits"))?;
                Self::from_hms(hour, minute, 0)
            }
            _ => Err(ParseError::time("unrecognised time format")),
        }
    }

    /// Returns seconds since midnight of the service day.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Returns the hour component (0-32).
    pub fn hours(&self) -> u32 {
        self.0 / 3600
    }

    /// Returns the minute component (0-59).
    pub fn minutes(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Returns the second component (0-59).
    pub fn secs(&self) -> u32 {
        self.0 % 60
    }

    /// Returns true for times at or after 24:00:00, i.e. on the following calendar day.
    pub fn is_next_day(&self) -> bool {
        self.0 >= SECONDS_PER_DAY
    }

    /// Canonical zero-padded `"HH:MM:SS"` rendering.
    pub fn to_hms_string(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.secs()
        )
    }

    /// Human `"H:MM AM/PM"` rendering.
    ///
    /// Extended hours (24 and above) are shown as the early-morning time of
    /// the following day.
    ///
    /// ```
    /// use transit_schedule::domain::GtfsTime;
    ///
    /// assert_eq!(GtfsTime::parse("00:05").unwrap().to_12h_string(), "12:05 AM");
    /// assert_eq!(GtfsTime::parse("12:00").unwrap().to_12h_string(), "12:00 PM");
    /// assert_eq!(GtfsTime::parse("25:30").unwrap().to_12h_string(), "1:30 AM");
    /// ```
    pub fn to_12h_string(&self) -> String {
        let hour = self.hours() % 24;
        let (display_hour, suffix) = match hour {
            0 => (12, "AM"),
            1..=11 => (hour, "AM"),
            12 => (12, "PM"),
            _ => (hour - 12, "PM"),
        };
        format!("{display_hour}:{:02} {suffix}", self.minutes())
    }

    /// Add (or subtract) seconds, returning `None` outside 00:00:00..=32:00:00.
    pub fn checked_add_seconds(&self, seconds: i64) -> Option<Self> {
        Self::from_seconds(self.0 as i64 + seconds).ok()
    }
}

impl fmt::Debug for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GtfsTime({})", self.to_hms_string())
    }
}

impl fmt::Display for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hms_string())
    }
}

impl FromStr for GtfsTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for GtfsTime {
    type Error = ParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_seconds(value as i64)
    }
}

impl TryFrom<String> for GtfsTime {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GtfsTime> for String {
    fn from(value: GtfsTime) -> Self {
        value.to_hms_string()
    }
}

/// Split a trailing AM/PM marker off a 12-hour clock string.
fn split_meridiem(s: &str) -> Option<(&str, bool)> {
    let split_at = s.len().checked_sub(2)?;
    let suffix = s.get(split_at..)?;
    let is_pm = if suffix.eq_ignore_ascii_case("pm") {
        true
    } else if suffix.eq_ignore_ascii_case("am") {
        false
    } else {
        return None;
    };
    Some((s[..split_at].trim_end(), is_pm))
}

fn parse_twelve_hour(clock: &str, is_pm: bool) -> Result<GtfsTime, ParseError> {
    let (hour, minute) = clock
        .split_once(':')
        .ok_or_else(|| ParseError::time("expected H:MM before AM/PM"))?;
    let hour = parse_hour(hour)?;
    let minute = parse_minute_or_second(minute, "invalid minute digits")?;
    if !(1..=12).contains(&hour) {
        return Err(ParseError::time("12-hour clock hour must be 1-12"));
    }

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    GtfsTime::from_hms(hour, minute, 0)
}

/// Hours are one or two digits.
fn parse_hour(s: &str) -> Result<u32, ParseError> {
    if s.is_empty() || s.len() > 2 {
        return Err(ParseError::time("hour must be one or two digits"));
    }
    parse_digits(s).ok_or_else(|| ParseError::time("invalid hour digits"))
}

/// Minutes and seconds are exactly two digits.
fn parse_minute_or_second(s: &str, reason: &'static str) -> Result<u32, ParseError> {
    if s.len() != 2 {
        return Err(ParseError::time(reason));
    }
    parse_digits(s).ok_or_else(|| ParseError::time(reason))
}

/// Parse a short run of ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A calendar date on which a service may operate.
///
/// Stored GTFS dates are `yyyymmdd` integers; this type accepts dates from
/// 1970-01-01 through 2100-12-31.
///
/// # Examples
///
/// ```
/// use transit_schedule::domain::ServiceDate;
///
/// let date = ServiceDate::from_yyyymmdd(20240304).unwrap();
/// assert_eq!(date.day_name(), "Monday");
/// assert_eq!(date.add_days(-1).unwrap().as_yyyymmdd(), 20240303);
///
/// assert!(ServiceDate::from_yyyymmdd(19691231).is_err());
/// assert!(ServiceDate::from_yyyymmdd(20240230).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ServiceDate(NaiveDate);

impl ServiceDate {
    /// Earliest accepted date, as `yyyymmdd`.
    pub const MIN_YYYYMMDD: u32 = 19700101;

    /// Latest accepted date, as `yyyymmdd`.
    pub const MAX_YYYYMMDD: u32 = 21001231;

    /// Create a date from a `yyyymmdd` integer.
    pub fn from_yyyymmdd(value: u32) -> Result<Self, ParseError> {
        if !(Self::MIN_YYYYMMDD..=Self::MAX_YYYYMMDD).contains(&value) {
            return Err(ParseError::date(
                "date must be between 19700101 and 21001231",
            ));
        }
        let year = (value / 10_000) as i32;
        let month = (value / 100) % 100;
        let day = value % 100;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ParseError::date("not a calendar date"))
    }

    /// Parse an 8-digit `yyyymmdd` string.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::date("expected yyyymmdd format"));
        }
        let value: u32 = s
            .parse()
            .map_err(|_| ParseError::date("expected yyyymmdd format"))?;
        Self::from_yyyymmdd(value)
    }

    /// Create a date from a chrono date, enforcing the accepted range.
    pub fn from_naive(date: NaiveDate) -> Result<Self, ParseError> {
        let value = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
        if value < Self::MIN_YYYYMMDD as i64 || value > Self::MAX_YYYYMMDD as i64 {
            return Err(ParseError::date(
                "date must be between 19700101 and 21001231",
            ));
        }
        Ok(Self(date))
    }

    /// Returns the date as a `yyyymmdd` integer.
    pub fn as_yyyymmdd(&self) -> u32 {
        self.0.year() as u32 * 10_000 + self.0.month() * 100 + self.0.day()
    }

    /// Returns the underlying chrono date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// Returns the day of the week.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Returns the English name of the day of the week ("Sunday" … "Saturday").
    pub fn day_name(&self) -> &'static str {
        match self.weekday() {
            Weekday::Sun => "Sunday",
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
        }
    }

    /// Shift by a (possibly negative) number of days.
    pub fn add_days(&self, days: i64) -> Result<Self, ParseError> {
        let shifted = Duration::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .ok_or_else(|| ParseError::date("date overflow"))?;
        Self::from_naive(shifted)
    }

    /// Signed number of days from `other` to `self`.
    pub fn days_since(&self, other: ServiceDate) -> i64 {
        self.0.signed_duration_since(other.0).num_days()
    }
}

impl fmt::Debug for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceDate({})", self.as_yyyymmdd())
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.as_yyyymmdd())
    }
}

impl FromStr for ServiceDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u32> for ServiceDate {
    type Error = ParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_yyyymmdd(value)
    }
}

impl From<ServiceDate> for u32 {
    fn from(value: ServiceDate) -> Self {
        value.as_yyyymmdd()
    }
}

/// A point in a schedule: a service date plus a time within that service day.
///
/// Ordering is lexicographic by `(date, time)`. That is only meaningful when
/// both instants belong to the same logical day; to compare an extended time
/// on one date with a time on the next, normalise both with
/// [`ScheduleInstant::seconds_relative_to`].
///
/// # Examples
///
/// ```
/// use transit_schedule::domain::{GtfsTime, ScheduleInstant, ServiceDate};
///
/// let date = ServiceDate::from_yyyymmdd(20240305).unwrap();
/// let at = ScheduleInstant::new(date, GtfsTime::parse("01:30:00").unwrap());
///
/// let rolled = at.previous_service_day().unwrap();
/// assert_eq!(rolled.date().as_yyyymmdd(), 20240304);
/// assert_eq!(rolled.time().to_string(), "25:30:00");
/// assert_eq!(rolled.seconds_relative_to(date), at.seconds_relative_to(date));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleInstant {
    date: ServiceDate,
    time: GtfsTime,
}

impl ScheduleInstant {
    /// Create a new instant from its components.
    pub fn new(date: ServiceDate, time: GtfsTime) -> Self {
        Self { date, time }
    }

    /// Parse an instant from a `yyyymmdd` date and a time string.
    pub fn parse(date: u32, time: &str) -> Result<Self, ParseError> {
        Ok(Self {
            date: ServiceDate::from_yyyymmdd(date)?,
            time: GtfsTime::parse(time)?,
        })
    }

    /// Returns the service date.
    pub fn date(&self) -> ServiceDate {
        self.date
    }

    /// Returns the time within the service day.
    pub fn time(&self) -> GtfsTime {
        self.time
    }

    /// Same time of day, shifted by a number of days.
    pub fn add_days(&self, days: i64) -> Result<Self, ParseError> {
        Ok(Self {
            date: self.date.add_days(days)?,
            time: self.time,
        })
    }

    /// Shift by a number of minutes.
    ///
    /// The date is kept while the result stays within 00:00:00..=32:00:00, so
    /// extended times remain attributed to their service day. Outside that
    /// range whole days are carried into the date.
    ///
    /// ```
    /// use transit_schedule::domain::ScheduleInstant;
    ///
    /// let at = ScheduleInstant::parse(20240304, "23:50:00").unwrap();
    /// assert_eq!(at.add_minutes(20).unwrap().to_string(), "20240304 24:10:00");
    ///
    /// let early = ScheduleInstant::parse(20240304, "00:10:00").unwrap();
    /// assert_eq!(early.add_minutes(-20).unwrap().to_string(), "20240303 23:50:00");
    /// ```
    pub fn add_minutes(&self, minutes: i64) -> Result<Self, ParseError> {
        let delta = minutes
            .checked_mul(60)
            .ok_or_else(|| ParseError::time("time overflow"))?;
        let total = self.time.seconds() as i64 + delta;
        if (0..=MAX_TIME_SECONDS as i64).contains(&total) {
            return Ok(Self {
                date: self.date,
                time: GtfsTime(total as u32),
            });
        }

        let day = SECONDS_PER_DAY as i64;
        let days = total.div_euclid(day);
        let seconds = total.rem_euclid(day);
        Ok(Self {
            date: self.date.add_days(days)?,
            time: GtfsTime::from_seconds(seconds)?,
        })
    }

    /// The same moment expressed under the previous service day.
    ///
    /// Moves the date back one day and adds 24 hours to the time. Returns
    /// `None` if the extended time would exceed 32:00:00 or the date would
    /// leave the accepted range.
    pub fn previous_service_day(&self) -> Option<Self> {
        let time = self.time.checked_add_seconds(SECONDS_PER_DAY as i64)?;
        let date = self.date.add_days(-1).ok()?;
        Some(Self { date, time })
    }

    /// Seconds between midnight of `base` and this instant.
    pub fn seconds_relative_to(&self, base: ServiceDate) -> i64 {
        self.date.days_since(base) * SECONDS_PER_DAY as i64 + self.time.seconds() as i64
    }
}

impl fmt::Debug for ScheduleInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduleInstant({} {})", self.date, self.time)
    }
}

impl fmt::Display for ScheduleInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}
