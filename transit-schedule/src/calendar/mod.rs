//! Service calendar resolution.
//!
//! A service runs on a date when its weekday pattern covers the date and no
//! `Removed` exception suppresses it, or when an `Added` exception names
//! the date explicitly.

mod resolver;

pub use resolver::{ActiveServices, CalendarResolver};
