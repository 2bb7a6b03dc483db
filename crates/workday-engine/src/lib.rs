//! # workday-engine
//!
//! Deterministic working-time computation for the Colombian civil calendar.
//!
//! Given an instant, the engine answers "what instant is N working days and
//! H working hours later?", honoring weekends, national holidays (fixed,
//! Monday-transposed, and Easter-relative), business hours with an excluded
//! lunch window, and the fixed UTC−05:00 civil offset.
//!
//! ## Modules
//!
//! - [`holidays`] - Easter computation and the local Colombian holiday rules
//! - [`source`] - External holiday providers (HTTP, static)
//! - [`cache`] - Holiday cache port with an in-memory, TTL-capable implementation
//! - [`authority`] - External-first holiday lookups with per-year local fallback
//! - [`policy`] - Business-hours policy and its lunch rule
//! - [`business`] - UTC ↔ civil conversion and the working-day/hour predicates
//! - [`anchor`] - Backward anchoring to the nearest business instant
//! - [`advance`] - Adding working days, then working hours
//! - [`request`] - Typed request/response and raw-parameter validation
//! - [`service`] - Async facade for transports
//! - [`config`] - Configuration from the environment
//! - [`clock`] - Injectable "now"
//! - [`error`] - Error types

pub mod advance;
pub mod anchor;
pub mod authority;
pub mod business;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod holidays;
pub mod policy;
pub mod request;
pub mod service;
pub mod source;

pub use advance::{
    add_working_days, add_working_hours, calculate_working_datetime, MAX_WORKING_DAYS,
    MAX_WORKING_HOURS,
};
pub use anchor::{backward_anchor, MAX_SEARCH_STEPS};
pub use authority::{CalendarAuthority, CalendarView, FixedHolidays, HolidayCalendar, LocalRules};
pub use business::{BusinessClock, LocalReading};
pub use cache::{ExternalSnapshot, HolidayCache, InMemoryHolidayCache, Provenance, YearHolidays};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::WorkdayConfig;
pub use error::WorkdayError;
pub use holidays::{
    easter_sunday, local_holiday_records, local_holidays_for_year, HolidayClass, HolidayRecord,
};
pub use policy::BusinessHoursPolicy;
pub use request::{CalculationRequest, CalculationResult, ErrorBody};
pub use service::{HolidayListing, WorkdayService};
pub use source::{HolidaySource, HttpHolidaySource, StaticHolidaySource};
