//! Typed calculation request and response.
//!
//! Transports hand the engine raw strings (query parameters, CLI flags);
//! [`CalculationRequest::from_raw`] turns them into a validated request or an
//! [`WorkdayError::InvalidRequest`]. Responses serialize to the wire shapes
//!
//! ```json
//! { "date": "2025-04-21T13:00:00.000Z" }
//! { "error": "InvalidParameters", "message": "..." }
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::advance::{MAX_WORKING_DAYS, MAX_WORKING_HOURS};
use crate::error::{Result, WorkdayError};

/// Working days and hours to add to an optional anchor.
///
/// At least one of `days` / `hours` is present. A missing anchor means "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationRequest {
    pub days: Option<u32>,
    pub hours: Option<u32>,
    pub anchor: Option<DateTime<Utc>>,
}

impl CalculationRequest {
    /// Validate signed counts into a request.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidRequest`] if both counts are missing,
    /// either is negative, or they exceed [`MAX_WORKING_DAYS`] /
    /// [`MAX_WORKING_HOURS`].
    pub fn new(
        days: Option<i64>,
        hours: Option<i64>,
        anchor: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if days.is_none() && hours.is_none() {
            return Err(WorkdayError::InvalidRequest(
                "at least one of 'days' or 'hours' is required".to_string(),
            ));
        }
        Ok(Self {
            days: days.map(|n| count("days", n, MAX_WORKING_DAYS)).transpose()?,
            hours: hours.map(|n| count("hours", n, MAX_WORKING_HOURS)).transpose()?,
            anchor,
        })
    }

    /// Parse untyped parameters. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidRequest`] for non-integer counts, negative
    /// counts, or a `date` that is not an ISO-8601 instant ending in `Z`.
    pub fn from_raw(days: Option<&str>, hours: Option<&str>, date: Option<&str>) -> Result<Self> {
        let days = present(days).map(|s| parse_integer("days", s)).transpose()?;
        let hours = present(hours).map(|s| parse_integer("hours", s)).transpose()?;
        let anchor = present(date).map(parse_utc_instant).transpose()?;
        Self::new(days, hours, anchor)
    }

    pub fn days_or_zero(&self) -> u32 {
        self.days.unwrap_or(0)
    }

    pub fn hours_or_zero(&self) -> u32 {
        self.hours.unwrap_or(0)
    }
}

/// Parse an instant that carries an explicit UTC designator (`Z`).
///
/// # Errors
///
/// Returns [`WorkdayError::InvalidRequest`] for anything else, including
/// offsets such as `-05:00` and bare local datetimes.
pub fn parse_utc_instant(s: &str) -> Result<DateTime<Utc>> {
    if !s.ends_with('Z') && !s.ends_with('z') {
        return Err(WorkdayError::InvalidRequest(format!(
            "'date' must be an ISO-8601 UTC instant ending in 'Z', got '{s}'"
        )));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WorkdayError::InvalidRequest(format!("'date' '{s}': {e}")))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_integer(field: &str, s: &str) -> Result<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WorkdayError::InvalidRequest(format!(
            "'{field}' must be an integer, got '{s}'"
        )));
    }
    s.parse()
        .map_err(|_| WorkdayError::InvalidRequest(format!("'{field}' is out of range: '{s}'")))
}

fn count(field: &str, n: i64, max: u32) -> Result<u32> {
    if n < 0 {
        return Err(WorkdayError::InvalidRequest(format!(
            "'{field}' must be non-negative, got {n}"
        )));
    }
    match u32::try_from(n) {
        Ok(n) if n <= max => Ok(n),
        _ => Err(WorkdayError::InvalidRequest(format!(
            "'{field}' must be at most {max}, got {n}"
        ))),
    }
}

/// Successful calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    #[serde(rename = "date", serialize_with = "serialize_instant")]
    pub result_instant: DateTime<Utc>,
}

/// Render an instant as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_instant<S: Serializer>(instant: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_instant(instant))
}

/// Failed calculation, as rendered to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&WorkdayError> for ErrorBody {
    fn from(e: &WorkdayError) -> Self {
        Self {
            error: e.code().to_string(),
            message: e.to_string(),
        }
    }
}
