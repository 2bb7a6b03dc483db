//! External holiday providers.
//!
//! A provider returns a flat list of civil dates covering every year it
//! knows about. The payload format is a JSON array of `YYYY-MM-DD` strings:
//!
//! ```json
//! ["2025-01-01", "2025-01-06", "2025-03-24"]
//! ```
//!
//! Providers report failures as [`WorkdayError::HolidayProviderUnavailable`];
//! [`crate::authority::CalendarAuthority`] absorbs them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use url::Url;

use crate::error::{Result, WorkdayError};

/// Default provider of Colombian holiday dates.
pub const DEFAULT_HOLIDAYS_URL: &str = "https://content.capta.co/Recruitment/WorkingDays.json";

#[async_trait]
pub trait HolidaySource: Send + Sync {
    /// Every holiday date the provider knows, in any order.
    async fn fetch(&self) -> Result<Vec<NaiveDate>>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Fetches the holiday list over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHolidaySource {
    http: reqwest::Client,
    url: Url,
}

impl HttpHolidaySource {
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidConfig`] if the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkdayError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HolidaySource for HttpHolidaySource {
    async fn fetch(&self) -> Result<Vec<NaiveDate>> {
        let unavailable =
            |detail: String| WorkdayError::HolidayProviderUnavailable(format!("{}: {detail}", self.url));

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!("status {}", resp.status().as_u16())));
        }

        let body = resp.text().await.map_err(|e| unavailable(e.to_string()))?;
        parse_holiday_payload(&body).map_err(unavailable)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// A provider with a fixed answer. An empty list means "no data for any year".
#[derive(Debug, Clone, Default)]
pub struct StaticHolidaySource {
    dates: Vec<NaiveDate>,
}

impl StaticHolidaySource {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self { dates }
    }

    /// No external data: every year falls back to the local rules.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HolidaySource for StaticHolidaySource {
    async fn fetch(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.dates.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Parse the provider body. Any malformed entry rejects the whole payload.
pub fn parse_holiday_payload(body: &str) -> std::result::Result<Vec<NaiveDate>, String> {
    let raw: Vec<String> =
        serde_json::from_str(body).map_err(|e| format!("malformed payload: {e}"))?;
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| format!("malformed date '{s}': {e}"))
        })
        .collect()
}
