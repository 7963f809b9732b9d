//! Active-service resolution.
//!
//! Combines weekday patterns (`calendar.txt`) with date exceptions
//! (`calendar_dates.txt`) to find the services operating on a date.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{debug, trace};

use crate::domain::{ExceptionType, Service, ServiceDate, ServiceId, WeekdayFlags};
use crate::store::{ScheduleStore, StoreError, service_from_pattern, service_from_rows};

/// Services operating on one date, in resolution order.
///
/// Order is the weekday-pattern services as the store returned them,
/// followed by services added by exceptions in the order their exceptions
/// were returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveServices {
    date: ServiceDate,
    services: Vec<Service>,
}

impl ActiveServices {
    /// The date these services were resolved for.
    pub fn date(&self) -> ServiceDate {
        self.date
    }

    /// Ids of the active services, in resolution order.
    pub fn ids(&self) -> Vec<ServiceId> {
        self.services.iter().map(|s| s.id.clone()).collect()
    }

    /// Returns true if the service is active.
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.services.iter().any(|s| &s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn into_services(self) -> Vec<Service> {
        self.services
    }
}

/// Resolves service calendars against a schedule store.
pub struct CalendarResolver<'a, S: ScheduleStore> {
    store: &'a S,
}

impl<'a, S: ScheduleStore> CalendarResolver<'a, S> {
    /// Create a new resolver.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Compute the services operating on `date`.
    ///
    /// 1. Weekday-pattern services for the date form the default set.
    /// 2. `Removed` exceptions on the date drop services from that set.
    /// 3. `Added` exceptions on the date for services not in the set are
    ///    resolved in full and appended.
    ///
    /// Duplicate rows are tolerated: each id enters the result at most once.
    /// Store failures are returned unchanged.
    pub async fn active_services(&self, date: ServiceDate) -> Result<ActiveServices, StoreError> {
        let weekday_rows = self.store.fetch_weekday_services(date).await?;
        let exceptions = self.store.fetch_exceptions_on_date(date).await?;

        let mut seen: HashSet<ServiceId> = HashSet::new();
        let mut services: Vec<Service> = weekday_rows
            .iter()
            .filter(|row| seen.insert(row.service_id.clone()))
            .map(service_from_pattern)
            .collect();

        let removed: HashSet<&ServiceId> = exceptions
            .iter()
            .filter(|e| e.exception_type == ExceptionType::Removed)
            .map(|e| &e.service_id)
            .collect();
        let weekday_count = services.len();
        let dropped = remove_services(&mut services, &removed, date);

        let present: HashSet<&ServiceId> = services.iter().map(|s| &s.id).collect();
        let mut marked: HashSet<&ServiceId> = HashSet::new();
        let to_add: Vec<&ServiceId> = exceptions
            .iter()
            .filter(|e| e.exception_type == ExceptionType::Added)
            .map(|e| &e.service_id)
            .filter(|id| !present.contains(id) && marked.insert(*id))
            .collect();

        let added = try_join_all(to_add.iter().map(|id| self.get_service(id))).await?;
        let default_count = services.len();
        for (id, service) in to_add.iter().zip(added) {
            // An added id always has at least the exception that added it.
            let service = service.unwrap_or_else(|| {
                Service::new((*id).clone(), WeekdayFlags::none(), None, Vec::new())
            });
            trace!(service = %service.id, %date, "Service added by exception");
            services.push(service);
        }

        debug!(
            %date,
            weekday = date.day_name(),
            by_pattern = weekday_count,
            removed = dropped,
            added = services.len() - default_count,
            active = services.len(),
            "Resolved active services"
        );

        Ok(ActiveServices { date, services })
    }

    /// Assemble one service from its weekday pattern (if any) and its full
    /// exception history, ordered by date.
    ///
    /// Returns `None` if the store knows nothing about the id.
    pub async fn get_service(&self, id: &ServiceId) -> Result<Option<Service>, StoreError> {
        let (pattern, exceptions) = futures::try_join!(
            self.store.fetch_service_pattern(id),
            self.store.fetch_service_exceptions(id),
        )?;
        Ok(service_from_rows(id, pattern.as_ref(), &exceptions))
    }

    /// Resolve several services independently, preserving the caller's order.
    ///
    /// Every id gets an entry; unknown ids map to `None`. A store failure for
    /// any id fails the whole call rather than dropping that id.
    pub async fn get_services(
        &self,
        ids: &[ServiceId],
    ) -> Result<Vec<(ServiceId, Option<Service>)>, StoreError> {
        let resolved = try_join_all(ids.iter().map(|id| self.get_service(id))).await?;
        Ok(ids.iter().cloned().zip(resolved).collect())
    }
}

/// Drop every service in `removed`, returning how many were dropped. Ids
/// with no scheduled service on the date count for nothing.
fn remove_services(
    services: &mut Vec<Service>,
    removed: &HashSet<&ServiceId>,
    date: ServiceDate,
) -> usize {
    let before = services.len();
    services.retain(|service| {
        let keep = !removed.contains(&service.id);
        if !keep {
            trace!(service = %service.id, %date, "Service removed by exception");
        }
        keep
    });
    before - services.len()
}
