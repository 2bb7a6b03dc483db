//! Holiday authority: external data first, local rules as fallback.
//!
//! The external provider is asked once per cache lifetime. For each year the
//! authority then decides which source answers holiday questions:
//!
//! - the external list, if it contains at least one date in that year;
//! - otherwise [`local_holidays_for_year`].
//!
//! The decision is stored in the [`HolidayCache`] and holds until the cache is
//! cleared or expires. Provider failures never reach callers; they are logged
//! and treated as "no external data".

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::cache::{ExternalSnapshot, HolidayCache, Provenance, YearHolidays};
use crate::holidays::{local_holiday_records, local_holidays_for_year, HolidayClass, HolidayRecord};
use crate::source::HolidaySource;

/// Answers whether a civil date is a holiday.
///
/// The calculation core depends only on this capability, so tests can
/// substitute a fixed set.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// An explicit holiday set.
#[derive(Debug, Clone, Default)]
pub struct FixedHolidays(BTreeSet<NaiveDate>);

impl FixedHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self(dates.into_iter().collect())
    }
}

impl HolidayCalendar for FixedHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }
}

/// The local rules alone, recomputed on every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRules;

impl HolidayCalendar for LocalRules {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        local_holidays_for_year(date.year()).contains(&date)
    }
}

/// Holiday source of truth for calculations.
pub struct CalendarAuthority {
    source: Arc<dyn HolidaySource>,
    cache: Arc<dyn HolidayCache>,
    fetch_gate: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for CalendarAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarAuthority")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl CalendarAuthority {
    pub fn new(source: Arc<dyn HolidaySource>, cache: Arc<dyn HolidayCache>) -> Self {
        Self {
            source,
            cache,
            fetch_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// The memoized external holiday list.
    ///
    /// Concurrent first callers wait on a single fetch. A failed fetch is
    /// memoized as an empty, unavailable snapshot.
    pub async fn holiday_set(&self) -> Arc<ExternalSnapshot> {
        if let Some(snapshot) = self.cache.external() {
            return snapshot;
        }

        let _gate = self.fetch_gate.lock().await;
        if let Some(snapshot) = self.cache.external() {
            return snapshot;
        }

        let snapshot = match self.source.fetch().await {
            Ok(dates) => {
                let snapshot = ExternalSnapshot::from_dates(dates);
                tracing::info!(
                    source = self.source.name(),
                    dates = snapshot.dates.len(),
                    years = ?snapshot.years(),
                    "fetched external holidays"
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    error = %e,
                    "holiday provider failed, using local rules"
                );
                ExternalSnapshot::unavailable()
            }
        };
        self.cache.set_external(snapshot)
    }

    /// A synchronous holiday view backed by the current external snapshot.
    pub async fn calendar(&self) -> CalendarView {
        CalendarView {
            snapshot: self.holiday_set().await,
            cache: Arc::clone(&self.cache),
        }
    }

    pub async fn is_holiday(&self, date: NaiveDate) -> bool {
        self.calendar().await.is_holiday(date)
    }

    /// The holiday set that answers for `year`, with its provenance.
    pub async fn year(&self, year: i32) -> Arc<YearHolidays> {
        self.calendar().await.year(year)
    }

    /// Holiday records for `year`.
    ///
    /// Local years carry rule names; external dates carry no names from the
    /// provider, so they are labelled generically.
    pub async fn holiday_records(&self, year: i32) -> (Provenance, Vec<HolidayRecord>) {
        let entry = self.year(year).await;
        let records = match entry.provenance {
            Provenance::Local => local_holiday_records(year),
            Provenance::External => {
                let named = local_holiday_records(year);
                entry
                    .dates
                    .iter()
                    .map(|&date| HolidayRecord {
                        date,
                        name: named
                            .iter()
                            .find(|r| r.date == date)
                            .map_or_else(|| "Festivo".to_string(), |r| r.name.clone()),
                        classification: HolidayClass::National,
                    })
                    .collect()
            }
        };
        (entry.provenance, records)
    }

    /// Drop every memoized value, including the external fetch.
    pub fn invalidate(&self) {
        tracing::debug!("holiday cache invalidated");
        self.cache.clear();
    }
}

/// Synchronous holiday lookups over one external snapshot.
#[derive(Clone)]
pub struct CalendarView {
    snapshot: Arc<ExternalSnapshot>,
    cache: Arc<dyn HolidayCache>,
}

impl std::fmt::Debug for CalendarView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarView")
            .field("external_dates", &self.snapshot.dates.len())
            .field("available", &self.snapshot.available)
            .finish_non_exhaustive()
    }
}

impl CalendarView {
    /// The holiday set for `year`, deciding and caching its provenance on first use.
    ///
    /// Once the cache has dropped or replaced this view's snapshot, answers are
    /// computed from the view's snapshot and not stored.
    pub fn year(&self, year: i32) -> Arc<YearHolidays> {
        let current = self
            .cache
            .external()
            .is_some_and(|stored| Arc::ptr_eq(&stored, &self.snapshot));
        if current {
            if let Some(entry) = self.cache.get(year) {
                return entry;
            }
        }

        let external = self.snapshot.dates_in_year(year);
        let entry = if external.is_empty() {
            YearHolidays {
                year,
                provenance: Provenance::Local,
                dates: local_holidays_for_year(year).into_iter().collect(),
            }
        } else {
            YearHolidays {
                year,
                provenance: Provenance::External,
                dates: external,
            }
        };
        tracing::debug!(year, provenance = ?entry.provenance, dates = entry.dates.len(), "holiday year resolved");
        if current {
            self.cache.set(entry)
        } else {
            tracing::debug!(year, "holiday snapshot superseded, year not cached");
            Arc::new(entry)
        }
    }
}

impl HolidayCalendar for CalendarView {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.year(date.year()).contains(date)
    }
}
