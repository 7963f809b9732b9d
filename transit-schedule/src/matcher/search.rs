//! Departure matching algorithm.
//!
//! Given an origin, a destination and a departure instant, finds the
//! scheduled trip that leaves the origin at exactly that time and later
//! calls at the destination.
//!
//! The search runs in up to two phases. The same-day phase looks at
//! services active on the query date. If it finds nothing, the rollover
//! phase repeats the search on the previous service day with the time
//! shifted by 24 hours, which catches late-night trips published as
//! `25:30:00` and the like.

use futures::future::join_all;
use tracing::{debug, trace};

use crate::calendar::CalendarResolver;
use crate::domain::{ParseError, ScheduleInstant, StopId, StopTime, Trip, TripId};
use crate::store::{ScheduleStore, StoreError, departure_seconds, trip_from_detail};

use super::config::MatcherConfig;

/// Error from departure matching.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The query itself is unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A store fetch failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored schedule data could not be interpreted
    #[error("malformed schedule data: {0}")]
    Parse(#[from] ParseError),
}

/// A departure to match against the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureQuery {
    /// Stop the trip must depart from.
    pub origin: StopId,

    /// Stop the trip must later call at.
    pub destination: StopId,

    /// Service date and departure time at the origin.
    pub at: ScheduleInstant,
}

impl DepartureQuery {
    /// Create a new query.
    pub fn new(origin: StopId, destination: StopId, at: ScheduleInstant) -> Self {
        Self {
            origin,
            destination,
            at,
        }
    }

    /// Validate the query.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.origin.is_empty() {
            return Err(MatchError::InvalidArgument(
                "origin stop id is empty".to_string(),
            ));
        }
        if self.destination.is_empty() {
            return Err(MatchError::InvalidArgument(
                "destination stop id is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which search phase produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPhase {
    /// Services of the query date, at the query time.
    SameDay,
    /// Services of the day before, at the query time plus 24 hours.
    PreviousDay,
}

/// A matched trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripMatch {
    /// The full trip, with stop times tagged with its service date.
    pub trip: Trip,

    pub phase: SearchPhase,

    /// The instant the match was made at. For a rollover match this is the
    /// previous service day with the extended time, e.g. `25:30:00`.
    pub service_instant: ScheduleInstant,

    pub origin_sequence: u32,

    pub destination_sequence: u32,
}

impl TripMatch {
    /// Returns true if the trip was found on the previous service day.
    pub fn is_rollover(&self) -> bool {
        self.phase == SearchPhase::PreviousDay
    }

    /// The stop time at which the trip was boarded.
    pub fn origin_stop_time(&self) -> Option<&StopTime> {
        self.trip
            .stop_times()
            .iter()
            .find(|st| st.stop_sequence == self.origin_sequence)
    }

    /// The stop time at which the trip reaches the destination.
    pub fn destination_stop_time(&self) -> Option<&StopTime> {
        self.trip
            .stop_times()
            .iter()
            .find(|st| st.stop_sequence == self.destination_sequence)
    }
}

/// A candidate that passed the sequence check.
struct Verified {
    trip_id: TripId,
    origin_sequence: u32,
    destination_sequence: u32,
}

/// Matches departures to scheduled trips.
pub struct DepartureMatcher<'a, S: ScheduleStore> {
    store: &'a S,
    config: MatcherConfig,
}

impl<'a, S: ScheduleStore> DepartureMatcher<'a, S> {
    /// Create a new matcher.
    pub fn new(store: &'a S, config: MatcherConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Find the trip departing `query.origin` at exactly `query.at` that
    /// later calls at `query.destination`.
    ///
    /// Returns `Ok(None)` when no scheduled trip matches. When several trips
    /// match, the first one the store returns wins.
    pub async fn find_trip(&self, query: &DepartureQuery) -> Result<Option<TripMatch>, MatchError> {
        query.validate()?;

        if let Some(found) = self
            .search_phase(query, query.at, SearchPhase::SameDay)
            .await?
        {
            return Ok(Some(found));
        }

        if !self.config.rollover {
            return Ok(None);
        }

        let Some(shifted) = query.at.previous_service_day() else {
            debug!(at = %query.at, "No previous service day; skipping rollover");
            return Ok(None);
        };

        self.search_phase(query, shifted, SearchPhase::PreviousDay)
            .await
    }

    async fn search_phase(
        &self,
        query: &DepartureQuery,
        instant: ScheduleInstant,
        phase: SearchPhase,
    ) -> Result<Option<TripMatch>, MatchError> {
        let resolver = CalendarResolver::new(self.store);
        let active = resolver.active_services(instant.date()).await?;
        if active.is_empty() {
            debug!(?phase, %instant, "No active services");
            return Ok(None);
        }

        let candidates = self
            .store
            .fetch_candidate_trips(
                &query.origin,
                &query.destination,
                instant.time().seconds(),
                &active.ids(),
            )
            .await?;

        debug!(
            ?phase,
            %instant,
            origin = %query.origin,
            destination = %query.destination,
            services = active.len(),
            candidates = candidates.len(),
            "Searching candidates"
        );

        for batch in candidates.chunks(self.config.batch_size()) {
            let checks = join_all(
                batch
                    .iter()
                    .map(|trip| self.verify(query, trip, instant.time().seconds())),
            )
            .await;

            // Results are consumed in store order; anything after an
            // acceptable candidate in the same batch is ignored.
            for check in checks {
                let Some(verified) = check? else {
                    continue;
                };

                let Some(detail) = self.store.fetch_trip_detail(&verified.trip_id).await? else {
                    trace!(trip = %verified.trip_id, "Trip detail missing; rejecting");
                    continue;
                };

                let trip = trip_from_detail(&detail)?.with_service_date(instant.date());
                debug!(?phase, trip = %trip.id, %instant, "Matched trip");
                return Ok(Some(TripMatch {
                    trip,
                    phase,
                    service_instant: instant,
                    origin_sequence: verified.origin_sequence,
                    destination_sequence: verified.destination_sequence,
                }));
            }
        }

        Ok(None)
    }

    /// Check that a candidate departs the origin at `at_seconds` and
    /// calls at the destination later in the same trip.
    ///
    /// The origin visit is the one departing at the queried time; the
    /// destination visit is the first one after it. Earlier visits to either
    /// stop play no part.
    async fn verify(
        &self,
        query: &DepartureQuery,
        trip: &TripId,
        at_seconds: u32,
    ) -> Result<Option<Verified>, MatchError> {
        let (origin_visits, destination_visits) = futures::try_join!(
            self.store.fetch_stop_visits(trip, &query.origin),
            self.store.fetch_stop_visits(trip, &query.destination),
        )?;

        let mut origin = None;
        for visit in &origin_visits {
            if departure_seconds(visit)? == at_seconds {
                origin = Some(visit.stop_sequence);
                break;
            }
        }
        let Some(origin_sequence) = origin else {
            trace!(%trip, at_seconds, "Candidate has no origin visit at the queried time");
            return Ok(None);
        };

        let Some(destination_sequence) = destination_visits
            .iter()
            .map(|visit| visit.stop_sequence)
            .filter(|&sequence| sequence > origin_sequence)
            .min()
        else {
            trace!(
                %trip,
                origin_sequence,
                destination_visits = destination_visits.len(),
                "Candidate does not reach destination after origin"
            );
            return Ok(None);
        };

        Ok(Some(Verified {
            trip_id: trip.clone(),
            origin_sequence,
            destination_sequence,
        }))
    }
}
