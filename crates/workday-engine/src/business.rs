//! Civil-time view of instants and the business predicates.
//!
//! Instants travel as `DateTime<Utc>`. Every business rule, however, is
//! stated in civil time at a fixed offset (Colombia has not observed daylight
//! saving since 1993). [`BusinessClock`] converts between the two and answers
//! "is this a working day?" and "is this a working time of day?".

use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::authority::HolidayCalendar;
use crate::error::{Result, WorkdayError};
use crate::holidays::is_weekend;
use crate::policy::BusinessHoursPolicy;

/// Colombia's civil offset, UTC−05:00.
pub const COLOMBIA_UTC_OFFSET_SECS: i32 = -5 * 3600;

/// A civil date and time in the clock's fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalReading(NaiveDateTime);

impl LocalReading {
    pub fn new(civil: NaiveDateTime) -> Self {
        Self(civil)
    }

    pub fn from_parts(date: NaiveDate, time: NaiveTime) -> Self {
        Self(date.and_time(time))
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Same date, different time of day.
    pub fn with_time(&self, time: NaiveTime) -> Self {
        Self(self.date().and_time(time))
    }

    /// Same time of day, `days` civil days away.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::CalendarExhausted`] if the result falls outside
    /// the representable calendar.
    pub fn shift_days(&self, days: i64) -> Result<Self> {
        Duration::try_days(days)
            .ok_or_else(|| self.out_of_range())
            .and_then(|by| self.plus(by))
    }

    /// # Errors
    ///
    /// Returns [`WorkdayError::CalendarExhausted`] if the result falls outside
    /// the representable calendar.
    pub fn plus(&self, by: Duration) -> Result<Self> {
        self.0
            .checked_add_signed(by)
            .map(Self)
            .ok_or_else(|| self.out_of_range())
    }

    fn out_of_range(&self) -> WorkdayError {
        tracing::error!(from = %self, "civil date arithmetic overflowed");
        WorkdayError::CalendarExhausted {
            steps: 0,
            from: self.to_string(),
        }
    }
}

impl fmt::Display for LocalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.format("%Y-%m-%d %H:%M:%S"), self.weekday())
    }
}

/// Fixed-offset civil clock carrying the business-hours policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
    policy: BusinessHoursPolicy,
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::colombia(BusinessHoursPolicy::default())
    }
}

impl BusinessClock {
    pub fn new(offset: FixedOffset, policy: BusinessHoursPolicy) -> Self {
        Self { offset, policy }
    }

    /// Bogotá civil time (UTC−05:00) with the given policy.
    pub fn colombia(policy: BusinessHoursPolicy) -> Self {
        let offset = FixedOffset::east_opt(COLOMBIA_UTC_OFFSET_SECS)
            .unwrap_or_else(|| Utc.fix());
        Self { offset, policy }
    }

    /// Build a clock from a `±HH:MM` offset string.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidTimezone`] if the string is not a valid offset.
    pub fn from_offset_str(offset: &str, policy: BusinessHoursPolicy) -> Result<Self> {
        Ok(Self::new(parse_utc_offset(offset)?, policy))
    }

    /// Build a clock from an IANA zone name, freezing its offset.
    ///
    /// The zone's offset is read at `reference`. Zones whose January and July
    /// offsets differ in that year (daylight saving) are rejected, since every
    /// rule here assumes one fixed civil offset.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidTimezone`] for unknown zones or zones
    /// with a seasonal offset change.
    pub fn from_timezone(
        name: &str,
        policy: BusinessHoursPolicy,
        reference: DateTime<Utc>,
    ) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| WorkdayError::InvalidTimezone(format!("'{name}'")))?;
        let offset_at = |month: u32| {
            Utc.with_ymd_and_hms(reference.year(), month, 1, 12, 0, 0)
                .single()
                .map(|at| at.with_timezone(&tz).offset().fix())
        };
        let (january, july) = (offset_at(1), offset_at(7));
        if january != july {
            return Err(WorkdayError::InvalidTimezone(format!(
                "'{name}' observes daylight saving; a fixed offset is required"
            )));
        }
        Ok(Self::new(reference.with_timezone(&tz).offset().fix(), policy))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn policy(&self) -> &BusinessHoursPolicy {
        &self.policy
    }

    /// Civil reading of `instant`.
    pub fn to_local(&self, instant: DateTime<Utc>) -> LocalReading {
        LocalReading(instant.with_timezone(&self.offset).naive_local())
    }

    /// Instant of a civil reading. Inverse of [`BusinessClock::to_local`].
    pub fn to_instant(&self, reading: LocalReading) -> DateTime<Utc> {
        let utc = reading.0 - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// Monday to Friday and not a holiday.
    pub fn is_working_day(&self, reading: LocalReading, holidays: &dyn HolidayCalendar) -> bool {
        is_working_date(reading.date(), holidays)
    }

    /// Inside `[start, end]` and outside the closed lunch window.
    pub fn is_within_business_hours(&self, reading: LocalReading) -> bool {
        self.policy.contains(reading.time())
    }

    /// Both predicates at once.
    pub fn is_business_instant(&self, reading: LocalReading, holidays: &dyn HolidayCalendar) -> bool {
        self.is_working_day(reading, holidays) && self.is_within_business_hours(reading)
    }
}

pub(crate) fn is_working_date(date: NaiveDate, holidays: &dyn HolidayCalendar) -> bool {
    !is_weekend(date) && !holidays.is_holiday(date)
}

/// Parse `±HH:MM` (or `Z`) into a fixed offset.
///
/// # Errors
///
/// Returns [`WorkdayError::InvalidTimezone`] on malformed input or offsets
/// of a day or more.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    let invalid = || WorkdayError::InvalidTimezone(format!("'{s}' is not a ±HH:MM offset"));

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{FixedHolidays, LocalRules};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_to_local_applies_minus_five() {
        let clock = BusinessClock::default();
        let local = clock.to_local(utc(2025, 4, 18, 22, 0));
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2025, 4, 18).unwrap());
        assert_eq!(local.time(), t(17, 0));
        assert_eq!(local.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_to_local_crosses_midnight() {
        let clock = BusinessClock::default();
        let local = clock.to_local(utc(2025, 4, 19, 3, 0));
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2025, 4, 18).unwrap());
        assert_eq!(local.time(), t(22, 0));
    }

    #[test]
    fn test_roundtrip_identity() {
        let clock = BusinessClock::default();
        let instant = Utc.with_ymd_and_hms(2025, 8, 1, 16, 37, 12).unwrap();
        assert_eq!(clock.to_instant(clock.to_local(instant)), instant);
    }

    #[test]
    fn test_weekend_is_not_working_day() {
        let clock = BusinessClock::default();
        let none = FixedHolidays::default();
        assert!(!clock.is_working_day(clock.to_local(utc(2025, 4, 19, 15, 0)), &none));
        assert!(!clock.is_working_day(clock.to_local(utc(2025, 4, 20, 15, 0)), &none));
        assert!(clock.is_working_day(clock.to_local(utc(2025, 4, 21, 15, 0)), &none));
    }

    #[test]
    fn test_holiday_is_not_working_day() {
        let clock = BusinessClock::default();
        // Good Friday 2025 in local time
        let reading = clock.to_local(utc(2025, 4, 18, 15, 0));
        assert!(!clock.is_working_day(reading, &LocalRules));
        assert!(clock.is_working_day(reading, &FixedHolidays::default()));
    }

    #[test]
    fn test_working_day_uses_local_date() {
        let clock = BusinessClock::default();
        // 2025-04-17 02:00 UTC is still Wednesday 16th in Bogotá.
        let reading = clock.to_local(utc(2025, 4, 17, 2, 0));
        assert_eq!(reading.weekday(), Weekday::Wed);
        assert!(clock.is_working_day(reading, &LocalRules));
    }

    #[test]
    fn test_business_hours_boundaries() {
        let clock = BusinessClock::default();
        let day = NaiveDate::from_ymd_opt(2025, 4, 16).unwrap();
        let at = |h, m| LocalReading::from_parts(day, t(h, m));
        assert!(clock.is_within_business_hours(at(8, 0)));
        assert!(clock.is_within_business_hours(at(17, 0)));
        assert!(!clock.is_within_business_hours(at(12, 0)));
        assert!(!clock.is_within_business_hours(at(13, 0)));
        assert!(clock.is_within_business_hours(at(13, 1)));
        assert!(!clock.is_within_business_hours(at(7, 59)));
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("-05:00").unwrap().local_minus_utc(), -18000);
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19800);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("-5").is_err());
        assert!(parse_utc_offset("05:00").is_err());
        assert!(parse_utc_offset("+24:00").is_err());
        assert!(parse_utc_offset("+01:75").is_err());
    }

    #[test]
    fn test_from_timezone_accepts_bogota() {
        let clock = BusinessClock::from_timezone(
            "America/Bogota",
            BusinessHoursPolicy::default(),
            utc(2025, 1, 1, 0, 0),
        )
        .unwrap();
        assert_eq!(clock, BusinessClock::default());
    }

    #[test]
    fn test_from_timezone_rejects_dst_zone() {
        let err = BusinessClock::from_timezone(
            "America/New_York",
            BusinessHoursPolicy::default(),
            utc(2025, 1, 1, 0, 0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("daylight saving"), "got: {err}");

        // Both the reference and six months later fall inside summer time.
        let spring = utc(2025, 4, 1, 0, 0);
        assert!(BusinessClock::from_timezone("Europe/Madrid", BusinessHoursPolicy::default(), spring)
            .is_err());
    }

    #[test]
    fn test_from_timezone_rejects_unknown_zone() {
        let result = BusinessClock::from_timezone(
            "Invalid/Zone",
            BusinessHoursPolicy::default(),
            utc(2025, 1, 1, 0, 0),
        );
        assert!(matches!(result, Err(WorkdayError::InvalidTimezone(_))));
    }
}
