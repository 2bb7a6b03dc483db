//! Engine configuration.
//!
//! Defaults describe Colombia: UTC−05:00, 08:00-17:00 with lunch 12:00-13:00,
//! and the public holiday feed. Override via environment variables or
//! explicit construction for testing.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use url::Url;

use crate::business::{parse_utc_offset, BusinessClock};
use crate::error::{Result, WorkdayError};
use crate::policy::BusinessHoursPolicy;
use crate::source::DEFAULT_HOLIDAYS_URL;

/// Configuration for the working-time engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkdayConfig {
    /// Holiday provider endpoint.
    pub holidays_url: String,
    /// HTTP timeout for the holiday fetch, in seconds.
    pub timeout_secs: u64,
    /// Whole-cache expiry in seconds. `None` keeps holidays for the process lifetime.
    pub cache_ttl_secs: Option<u64>,
    /// Fixed civil offset, `±HH:MM`.
    pub utc_offset: String,
    /// IANA zone name; when set it replaces `utc_offset`.
    pub timezone: Option<String>,
    pub business_hours: BusinessHoursPolicy,
}

impl Default for WorkdayConfig {
    fn default() -> Self {
        Self {
            holidays_url: DEFAULT_HOLIDAYS_URL.to_string(),
            timeout_secs: 10,
            cache_ttl_secs: None,
            utc_offset: "-05:00".to_string(),
            timezone: None,
            business_hours: BusinessHoursPolicy::default(),
        }
    }
}

impl WorkdayConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `WORKDAY_HOLIDAYS_URL` (default: the public holiday feed)
    /// - `WORKDAY_TIMEOUT_SECS` (default: 10)
    /// - `WORKDAY_CACHE_TTL_SECS` (default: unset, no expiry)
    /// - `WORKDAY_UTC_OFFSET` (default: `-05:00`)
    /// - `WORKDAY_TIMEZONE` (default: unset)
    /// - `WORKDAY_BUSINESS_HOURS` (default: `08:00-12:00-13:00-17:00`)
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidConfig`] if a variable is set but malformed,
    /// or [`WorkdayError::InvalidTimezone`] for an unknown zone or offset. Whether
    /// a zone has a fixed offset is checked later, by [`WorkdayConfig::business_clock`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`WorkdayConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let holidays_url = match get("WORKDAY_HOLIDAYS_URL") {
            Some(raw) => parse_url("WORKDAY_HOLIDAYS_URL", &raw)?.to_string(),
            None => defaults.holidays_url,
        };
        let timeout_secs = match get("WORKDAY_TIMEOUT_SECS") {
            Some(raw) => parse_u64("WORKDAY_TIMEOUT_SECS", &raw)?,
            None => defaults.timeout_secs,
        };
        let cache_ttl_secs = get("WORKDAY_CACHE_TTL_SECS")
            .map(|raw| parse_u64("WORKDAY_CACHE_TTL_SECS", &raw))
            .transpose()?;
        let business_hours = match get("WORKDAY_BUSINESS_HOURS") {
            Some(raw) => raw.parse()?,
            None => defaults.business_hours,
        };

        let config = Self {
            holidays_url,
            timeout_secs,
            cache_ttl_secs,
            utc_offset: get("WORKDAY_UTC_OFFSET").unwrap_or(defaults.utc_offset),
            timezone: get("WORKDAY_TIMEZONE"),
            business_hours,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that do not depend on the current time. A zone's daylight-saving
    /// status is judged in [`WorkdayConfig::business_clock`] against the
    /// caller's reference instant.
    fn validate(&self) -> Result<()> {
        match &self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map(|_| ())
                .map_err(|_| WorkdayError::InvalidTimezone(format!("'{name}'"))),
            None => parse_utc_offset(&self.utc_offset).map(|_| ()),
        }
    }

    /// The civil clock this configuration describes.
    ///
    /// `reference` is the instant at which an IANA zone's offset is frozen.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidTimezone`] for a bad offset or zone.
    pub fn business_clock(&self, reference: DateTime<Utc>) -> Result<BusinessClock> {
        match &self.timezone {
            Some(name) => BusinessClock::from_timezone(name, self.business_hours, reference),
            None => BusinessClock::from_offset_str(&self.utc_offset, self.business_hours),
        }
    }

    /// The holiday provider endpoint as a URL.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidConfig`] if `holidays_url` does not parse.
    pub fn holidays_url(&self) -> Result<Url> {
        parse_url("holidays_url", &self.holidays_url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        self.cache_ttl_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|e| WorkdayError::InvalidConfig(format!("{key}='{raw}': {e}")))
}

fn parse_u64(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| WorkdayError::InvalidConfig(format!("{key} must be a non-negative integer, got '{raw}'")))
}
