//! End-to-end resolution and matching against a small JSON feed.

use transit_schedule::cache::{CacheConfig, CachedStore};
use transit_schedule::calendar::CalendarResolver;
use transit_schedule::domain::{
    ScheduleInstant, ServiceDate, ServiceId, StopId, TripId, WheelchairAccessible,
};
use transit_schedule::matcher::{DepartureMatcher, DepartureQuery, MatcherConfig, SearchPhase};
use transit_schedule::store::MemoryStore;

// 2024-03-04 is a Monday; 2024-07-04 is a Thursday holiday.
const MONDAY: u32 = 20240304;
const TUESDAY: u32 = 20240305;
const SATURDAY: u32 = 20240309;
const HOLIDAY: u32 = 20240704;
const AFTER_HOLIDAY: u32 = 20240705;

fn fixture() -> MemoryStore {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/schedule.json");
    MemoryStore::load(path).unwrap()
}

fn date(value: u32) -> ServiceDate {
    ServiceDate::from_yyyymmdd(value).unwrap()
}

fn ids(values: &[&str]) -> Vec<ServiceId> {
    values.iter().map(|v| ServiceId::new(*v)).collect()
}

fn query(origin: &str, destination: &str, d: u32, time: &str) -> DepartureQuery {
    DepartureQuery::new(
        StopId::new(origin),
        StopId::new(destination),
        ScheduleInstant::parse(d, time).unwrap(),
    )
}

#[tokio::test]
async fn active_services_follow_weekly_pattern() {
    let store = fixture();
    let resolver = CalendarResolver::new(&store);

    let weekday = resolver.active_services(date(MONDAY)).await.unwrap();
    assert_eq!(weekday.ids(), ids(&["WKDY"]));

    let weekend = resolver.active_services(date(SATURDAY)).await.unwrap();
    assert_eq!(weekend.ids(), ids(&["WKND"]));
}

#[tokio::test]
async fn holiday_swaps_services() {
    let store = fixture();
    let resolver = CalendarResolver::new(&store);

    let holiday = resolver.active_services(date(HOLIDAY)).await.unwrap();
    assert_eq!(holiday.ids(), ids(&["WKND", "PARADE"]));
    assert!(!holiday.contains(&ServiceId::new("WKDY")));

    let resolved = resolver
        .get_services(&ids(&["PARADE", "WKDY", "NOPE"]))
        .await
        .unwrap();
    let parade = resolved[0].1.as_ref().unwrap();
    assert!(!parade.has_pattern());
    assert!(parade.runs_on(date(HOLIDAY)));
    assert!(!parade.runs_on(date(MONDAY)));
    let weekday = resolved[1].1.as_ref().unwrap();
    assert!(weekday.runs_on(date(MONDAY)));
    assert!(!weekday.runs_on(date(HOLIDAY)));
    assert!(resolved[2].1.is_none());
}

#[tokio::test]
async fn weekday_departure_matched() {
    let store = fixture();
    let matcher = DepartureMatcher::new(&store, MatcherConfig::default());

    let found = matcher
        .find_trip(&query("ELM", "UNION", MONDAY, "8:00 AM"))
        .await
        .unwrap()
        .unwrap();

    let trip = &found.trip;
    assert_eq!(trip.id, TripId::new("R10-WKDY-0800"));
    assert_eq!(trip.route.display_name(), "10");
    assert_eq!(trip.route.agency.as_ref().unwrap().name, "Metro Transit");
    assert_eq!(trip.info.headsign.as_deref(), Some("Union Station"));
    assert_eq!(found.phase, SearchPhase::SameDay);

    let oak = trip.get_stop_time(&StopId::new("OAK")).unwrap();
    assert_eq!(oak.arrival_text(), "08:09:00");
    assert_eq!(oak.departure_text(), "08:10:00");
    assert_eq!(oak.service_date, Some(date(MONDAY)));
}

#[tokio::test]
async fn weekend_and_holiday_use_weekend_trip() {
    let store = fixture();
    let matcher = DepartureMatcher::new(&store, MatcherConfig::default());

    for day in [SATURDAY, HOLIDAY] {
        let found = matcher
            .find_trip(&query("ELM", "UNION", day, "0800"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.trip.id, TripId::new("R10-WKND-0800"));
        assert_eq!(found.service_instant.date(), date(day));
    }
}

#[tokio::test]
async fn loop_trip_matches_the_visit_at_the_queried_time() {
    let store = fixture();
    let matcher = DepartureMatcher::new(&store, MatcherConfig::default());

    // The loop runs UNION, OAK (09:00), ELM, OAK (09:20), UNION.
    let outbound = matcher
        .find_trip(&query("OAK", "ELM", MONDAY, "09:00"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outbound.trip.id, TripId::new("R10-WKDY-0900-LOOP"));
    assert_eq!((outbound.origin_sequence, outbound.destination_sequence), (2, 3));

    // OAK is visited before ELM as well, but the visit after it counts.
    let inbound = matcher
        .find_trip(&query("ELM", "OAK", MONDAY, "09:10"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inbound.trip.id, TripId::new("R10-WKDY-0900-LOOP"));
    assert_eq!((inbound.origin_sequence, inbound.destination_sequence), (3, 4));
    assert_eq!(
        inbound.destination_stop_time().unwrap().arrival_text(),
        "09:20:00"
    );

    // Leaving OAK the second time, ELM is behind the bus.
    let behind = matcher
        .find_trip(&query("OAK", "ELM", MONDAY, "09:20"))
        .await
        .unwrap();
    assert!(behind.is_none());

    let round_trip = matcher
        .find_trip(&query("UNION", "UNION", MONDAY, "08:50"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        (round_trip.origin_sequence, round_trip.destination_sequence),
        (1, 5)
    );
}

#[tokio::test]
async fn night_trip_found_on_previous_service_day() {
    let store = fixture();
    let matcher = DepartureMatcher::new(&store, MatcherConfig::default());

    let found = matcher
        .find_trip(&query("UNION", "AIRPORT", TUESDAY, "1:30 AM"))
        .await
        .unwrap()
        .unwrap();

    assert!(found.is_rollover());
    assert_eq!(found.trip.id, TripId::new("OWL-WKDY-2530"));
    assert_eq!(found.trip.route.display_name(), "Night Owl");
    assert_eq!(
        found.trip.info.wheelchair,
        Some(WheelchairAccessible::Accessible)
    );
    assert_eq!(found.service_instant.date(), date(MONDAY));

    let airport = found.destination_stop_time().unwrap();
    assert_eq!(airport.arrival_text(), "26:05:00");
    assert_eq!(airport.service_date, Some(date(MONDAY)));
    assert_eq!(airport.arrival.to_12h_string(), "2:05 AM");
}

#[tokio::test]
async fn night_trip_suppressed_when_previous_day_removed() {
    let store = fixture();
    let matcher = DepartureMatcher::new(&store, MatcherConfig::default());

    // The owl trip belongs to the weekday service, which does not run on
    // the holiday, so the early-morning departure after it does not exist.
    let found = matcher
        .find_trip(&query("UNION", "AIRPORT", AFTER_HOLIDAY, "01:30"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn cached_store_matches_uncached() {
    let plain = fixture();
    let cached = CachedStore::new(fixture(), &CacheConfig::default());

    for d in [MONDAY, SATURDAY, HOLIDAY] {
        let expected = CalendarResolver::new(&plain)
            .active_services(date(d))
            .await
            .unwrap();
        for _ in 0..2 {
            let actual = CalendarResolver::new(&cached)
                .active_services(date(d))
                .await
                .unwrap();
            assert_eq!(actual, expected);
        }
    }

    let q = query("UNION", "AIRPORT", TUESDAY, "01:30");
    let expected = DepartureMatcher::new(&plain, MatcherConfig::default())
        .find_trip(&q)
        .await
        .unwrap();
    let actual = DepartureMatcher::new(&cached, MatcherConfig::default())
        .find_trip(&q)
        .await
        .unwrap();
    assert_eq!(actual, expected);
}
