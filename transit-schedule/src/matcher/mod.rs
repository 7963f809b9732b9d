//! Departure matching.
//!
//! Answers "which scheduled trip leaves this stop at this time and goes on
//! to that stop?", looking at the previous service day as well so that
//! trips running past midnight are found.

mod config;
mod search;


pub use config::MatcherConfig;
pub use search::{DepartureMatcher, DepartureQuery, MatchError, SearchPhase, TripMatch};
