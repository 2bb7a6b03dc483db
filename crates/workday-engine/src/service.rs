//! Async facade tying configuration, holidays, and the calculation core together.
//!
//! The core functions in [`crate::advance`] are synchronous and take a
//! [`HolidayCalendar`](crate::authority::HolidayCalendar). This service primes
//! the [`CalendarAuthority`] (the only step that may suspend), then runs the
//! core on the resulting view.

use std::sync::Arc;

use serde::Serialize;

use crate::advance::calculate_working_datetime;
use crate::authority::CalendarAuthority;
use crate::business::BusinessClock;
use crate::cache::{HolidayCache, InMemoryHolidayCache, Provenance};
use crate::clock::{Clock, SystemClock};
use crate::config::WorkdayConfig;
use crate::error::Result;
use crate::holidays::HolidayRecord;
use crate::request::{CalculationRequest, CalculationResult};
use crate::source::{HolidaySource, HttpHolidaySource};

/// Holidays observed in one year and where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidayListing {
    pub year: i32,
    pub provenance: Provenance,
    pub holidays: Vec<HolidayRecord>,
}

/// Entry point for callers that hold a typed request.
pub struct WorkdayService {
    business: BusinessClock,
    authority: CalendarAuthority,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for WorkdayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkdayService")
            .field("business", &self.business)
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}

impl WorkdayService {
    pub fn new(business: BusinessClock, authority: CalendarAuthority, clock: Arc<dyn Clock>) -> Self {
        Self {
            business,
            authority,
            clock,
        }
    }

    /// Service backed by the configured HTTP holiday provider and the system clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a bad URL, offset, or zone.
    pub fn from_config(config: &WorkdayConfig) -> Result<Self> {
        let source = HttpHolidaySource::new(config.holidays_url()?, config.timeout())?;
        Self::with_source(config, Arc::new(source), Arc::new(SystemClock))
    }

    /// Service with an explicit holiday source and clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a bad offset or zone.
    pub fn with_source(
        config: &WorkdayConfig,
        source: Arc<dyn HolidaySource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let business = config.business_clock(clock.now())?;
        let cache: Arc<dyn HolidayCache> = match config.cache_ttl() {
            Some(ttl) => Arc::new(InMemoryHolidayCache::with_ttl(ttl, Arc::clone(&clock))),
            None => Arc::new(InMemoryHolidayCache::new()),
        };
        Ok(Self::new(business, CalendarAuthority::new(source, cache), clock))
    }

    pub fn business_clock(&self) -> &BusinessClock {
        &self.business
    }

    pub fn authority(&self) -> &CalendarAuthority {
        &self.authority
    }

    /// Run a calculation. A request without anchor starts from the service clock's "now".
    ///
    /// # Errors
    ///
    /// Returns [`crate::WorkdayError::CalendarExhausted`] if a day search exceeds its cap.
    pub async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult> {
        let anchor = request.anchor.unwrap_or_else(|| self.clock.now());
        let calendar = self.authority.calendar().await;
        let result_instant = calculate_working_datetime(
            &self.business,
            &calendar,
            request.days_or_zero(),
            request.hours_or_zero(),
            anchor,
        )?;
        Ok(CalculationResult { result_instant })
    }

    pub async fn holidays(&self, year: i32) -> HolidayListing {
        let (provenance, holidays) = self.authority.holiday_records(year).await;
        HolidayListing {
            year,
            provenance,
            holidays,
        }
    }
}
