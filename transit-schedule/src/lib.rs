//! Static transit schedule resolution.
//!
//! Answers two questions against a GTFS-style schedule:
//! which services operate on a given date, and which scheduled trip leaves
//! a given stop at a given time bound for another stop.

pub mod cache;
pub mod calendar;
pub mod domain;
pub mod matcher;
pub mod store;
