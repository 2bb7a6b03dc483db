//! Holiday cache port and its in-memory implementation.
//!
//! The cache memoizes two things: the single external fetch
//! ([`ExternalSnapshot`]) and the per-year holiday set derived from it or
//! from the local rules ([`YearHolidays`]). Entries are write-once: a second
//! `set` for the same key returns the value already stored, so concurrent
//! populators converge on one value.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::clock::{Clock, SystemClock};

/// Where a year's holiday set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    External,
    Local,
}

/// Holiday dates for one year, tagged with their provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearHolidays {
    pub year: i32,
    pub provenance: Provenance,
    pub dates: BTreeSet<NaiveDate>,
}

impl YearHolidays {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Result of the one external fetch. Empty when the provider failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalSnapshot {
    pub dates: BTreeSet<NaiveDate>,
    /// False when the fetch failed and the snapshot stands in for "no data".
    pub available: bool,
}

impl ExternalSnapshot {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    /// External dates that fall in `year`.
    pub fn dates_in_year(&self, year: i32) -> BTreeSet<NaiveDate> {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return BTreeSet::new();
        };
        self.dates.range(first..=last).copied().collect()
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.dates.iter().map(|d| d.year()).collect()
    }
}

/// Storage port for memoized holiday data.
pub trait HolidayCache: Send + Sync {
    fn get(&self, year: i32) -> Option<Arc<YearHolidays>>;

    /// Store `entry` unless its year is already present; returns the stored value.
    fn set(&self, entry: YearHolidays) -> Arc<YearHolidays>;

    fn external(&self) -> Option<Arc<ExternalSnapshot>>;

    /// Store the external snapshot unless one is present; returns the stored value.
    fn set_external(&self, snapshot: ExternalSnapshot) -> Arc<ExternalSnapshot>;

    fn clear(&self);
}

#[derive(Debug, Default)]
struct CacheState {
    populated_at: Option<DateTime<Utc>>,
    external: Option<Arc<ExternalSnapshot>>,
    years: HashMap<i32, Arc<YearHolidays>>,
}

/// Process-local [`HolidayCache`] with optional whole-cache expiry.
///
/// The TTL clock starts at the first write after construction or `clear`;
/// once it elapses every entry is dropped together.
pub struct InMemoryHolidayCache {
    state: RwLock<CacheState>,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryHolidayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryHolidayCache")
            .field("ttl", &self.ttl)
            .field("populated_at", &state.populated_at)
            .field("years", &state.years.len())
            .field("external", &state.external.is_some())
            .finish()
    }
}

impl Default for InMemoryHolidayCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHolidayCache {
    /// A cache that never expires.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            ttl: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// A cache whose contents expire `ttl` after first population.
    pub fn with_ttl(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            ttl: Some(ttl),
            clock,
        }
    }

    fn expire_if_stale(&self) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let now = self.clock.now();
        let is_stale = |state: &CacheState| {
            state
                .populated_at
                .is_some_and(|populated| now - populated >= ttl)
        };
        if !is_stale(&self.state.read()) {
            return;
        }
        let mut state = self.state.write();
        if is_stale(&state) {
            tracing::debug!(?ttl, "holiday cache expired");
            *state = CacheState::default();
        }
    }

    fn touch(&self, state: &mut CacheState) {
        if state.populated_at.is_none() {
            state.populated_at = Some(self.clock.now());
        }
    }
}

impl HolidayCache for InMemoryHolidayCache {
    fn get(&self, year: i32) -> Option<Arc<YearHolidays>> {
        self.expire_if_stale();
        self.state.read().years.get(&year).cloned()
    }

    fn set(&self, entry: YearHolidays) -> Arc<YearHolidays> {
        self.expire_if_stale();
        let mut state = self.state.write();
        self.touch(&mut state);
        state
            .years
            .entry(entry.year)
            .or_insert_with(|| Arc::new(entry))
            .clone()
    }

    fn external(&self) -> Option<Arc<ExternalSnapshot>> {
        self.expire_if_stale();
        self.state.read().external.clone()
    }

    fn set_external(&self, snapshot: ExternalSnapshot) -> Arc<ExternalSnapshot> {
        self.expire_if_stale();
        let mut state = self.state.write();
        self.touch(&mut state);
        state
            .external
            .get_or_insert_with(|| Arc::new(snapshot))
            .clone()
    }

    fn clear(&self) {
        *self.state.write() = CacheState::default();
    }
}
