//! Error types for workday-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkdayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Holiday provider unavailable: {0}")]
    HolidayProviderUnavailable(String),

    #[error("Calendar exhausted: no valid business instant reachable from {from} (after {steps} steps)")]
    CalendarExhausted { steps: usize, from: String },
}

impl WorkdayError {
    /// Stable code rendered in the `error` field of an error response.
    pub fn code(&self) -> &'static str {
        match self {
            WorkdayError::InvalidRequest(_) => "InvalidParameters",
            WorkdayError::InvalidConfig(_) | WorkdayError::InvalidTimezone(_) => "InvalidConfig",
            WorkdayError::HolidayProviderUnavailable(_) => "HolidayProviderUnavailable",
            WorkdayError::CalendarExhausted { .. } => "InternalError",
        }
    }

    /// Whether the caller can fix the failure by changing its input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, WorkdayError::InvalidRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, WorkdayError>;
