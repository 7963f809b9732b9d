use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use transit_schedule::cache::{CacheConfig, CachedStore};
use transit_schedule::calendar::CalendarResolver;
use transit_schedule::domain::{ParseError, ScheduleInstant, ServiceDate, StopId};
use transit_schedule::matcher::{DepartureMatcher, DepartureQuery, MatchError, MatcherConfig};
use transit_schedule::store::{MemoryStore, StoreError};

const USAGE: &str = "usage: transit-schedule <yyyymmdd> [<origin> <destination> <time>]";

/// Default schedule file when `SCHEDULE_DATA` is not set.
const DEFAULT_DATA: &str = "schedule.json";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),

    #[error("invalid SCHEDULE_CACHE_TTL_SECS: {0}")]
    CacheTtl(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("schedule store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(std::env::args().skip(1).collect()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cache_config() -> Result<CacheConfig, CliError> {
    let config = CacheConfig::default();
    match std::env::var("SCHEDULE_CACHE_TTL_SECS") {
        Ok(raw) => {
            let secs: u64 = raw.parse().map_err(|_| CliError::CacheTtl(raw.clone()))?;
            Ok(config.with_ttl(Duration::from_secs(secs)))
        }
        Err(_) => Ok(config),
    }
}

async fn run(args: Vec<String>) -> Result<(), CliError> {
    let (date, trip_args) = match args.as_slice() {
        [date] => (date, None),
        [date, origin, destination, time] => (date, Some((origin, destination, time))),
        _ => return Err(CliError::Usage("expected 1 or 4 arguments".to_string())),
    };
    let date = ServiceDate::parse(date)?;

    let path = std::env::var("SCHEDULE_DATA").unwrap_or_else(|_| DEFAULT_DATA.to_string());
    let store = CachedStore::new(MemoryStore::load(&path)?, &cache_config()?);

    let Some((origin, destination, time)) = trip_args else {
        let active = CalendarResolver::new(&store).active_services(date).await?;
        println!(
            "{} service(s) active on {date} ({}):",
            active.len(),
            date.day_name()
        );
        for service in active.iter() {
            let source = if service.pattern_runs_on(date) {
                "weekly"
            } else {
                "added"
            };
            println!("  {} ({source})", service.id);
        }
        return Ok(());
    };

    let at = ScheduleInstant::new(date, time.parse()?);
    let query = DepartureQuery::new(
        StopId::new(origin.as_str()),
        StopId::new(destination.as_str()),
        at,
    );
    let matcher = DepartureMatcher::new(&store, MatcherConfig::default());

    let Some(found) = matcher.find_trip(&query).await? else {
        println!("No trip departs {origin} at {at} for {destination}");
        return Ok(());
    };

    let trip = &found.trip;
    println!(
        "Trip {} on route {} (service {}, day {})",
        trip.id,
        trip.route.display_name(),
        trip.service_id,
        found.service_instant.date()
    );
    if let Some(headsign) = &trip.info.headsign {
        println!("  towards {headsign}");
    }
    if found.is_rollover() {
        println!(
            "  runs on the previous service day at {}",
            found.service_instant.time()
        );
    }
    for st in trip.stop_times() {
        let marker = if st.stop_sequence == found.origin_sequence
            || st.stop_sequence == found.destination_sequence
        {
            '*'
        } else {
            ' '
        };
        println!(
            " {marker} {:>3}  {:<12} arr {}  dep {}",
            st.stop_sequence,
            st.stop_id.as_str(),
            st.arrival_text(),
            st.departure_text()
        );
    }
    Ok(())
}
