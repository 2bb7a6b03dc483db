//! Forward advancement: working days, then working hours.
//!
//! # Semantics
//!
//! - **Days** move the reading forward one civil day at a time, skipping
//!   weekends and holidays. The time of day is carried over untouched, even
//!   if it lies outside business hours.
//! - **Hours** consume the business time left in the current day. Crossing
//!   the lunch window costs nothing: the clock jumps from lunch start to lunch
//!   end. Hours that do not fit carry over to the next working day's opening.
//! - A day with no business time left and a request for exactly one hour goes
//!   straight to the next working day's opening, without adding the hour.
//!
//! [`calculate_working_datetime`] anchors the input backwards when needed and
//! always applies days before hours.

use chrono::{DateTime, Duration, Utc};

use crate::anchor::{backward_anchor, MAX_SEARCH_STEPS};
use crate::authority::HolidayCalendar;
use crate::business::{is_working_date, BusinessClock, LocalReading};
use crate::error::{Result, WorkdayError};
use crate::policy::BusinessHoursPolicy;

/// Largest day count [`calculate_working_datetime`] accepts (about 380 years).
pub const MAX_WORKING_DAYS: u32 = 100_000;

/// Largest hour count [`calculate_working_datetime`] accepts.
pub const MAX_WORKING_HOURS: u32 = 800_000;

/// Add `days` working days, keeping the time of day.
///
/// # Errors
///
/// Returns [`WorkdayError::CalendarExhausted`] if a run of non-working days
/// longer than the search cap is encountered.
pub fn add_working_days(
    holidays: &dyn HolidayCalendar,
    from: LocalReading,
    days: u32,
) -> Result<LocalReading> {
    let mut current = from;
    for _ in 0..days {
        current = next_working_day(holidays, current.shift_days(1)?)?;
    }
    Ok(current)
}

/// Add `hours` working hours.
///
/// # Errors
///
/// Returns [`WorkdayError::CalendarExhausted`] if a run of non-working days
/// longer than the search cap is encountered.
pub fn add_working_hours(
    clock: &BusinessClock,
    holidays: &dyn HolidayCalendar,
    from: LocalReading,
    hours: u32,
) -> Result<LocalReading> {
    if hours == 0 {
        return Ok(from);
    }
    let policy = clock.policy();

    // Closed for the day: one hour means "first thing next working day".
    if hours == 1 && policy.remaining_from(from.time()).is_zero() {
        return next_opening(policy, holidays, from);
    }

    let mut current = from;
    let mut left = Duration::hours(i64::from(hours));
    loop {
        let available = policy.remaining_from(current.time());
        if left <= available {
            return advance_within_day(policy, current, left);
        }
        left -= available;
        current = next_opening(policy, holidays, current)?;
    }
}

/// Add `days` then `hours` to `anchor`, returning the resulting instant.
///
/// An anchor that is not a business instant is first replaced by its
/// [`backward_anchor`]. With zero days and zero hours the result is the
/// (anchored) input itself.
///
/// # Errors
///
/// Returns [`WorkdayError::InvalidRequest`] if `days` exceeds
/// [`MAX_WORKING_DAYS`] or `hours` exceeds [`MAX_WORKING_HOURS`], and
/// [`WorkdayError::CalendarExhausted`] if any day search exceeds the step cap.
pub fn calculate_working_datetime(
    clock: &BusinessClock,
    holidays: &dyn HolidayCalendar,
    days: u32,
    hours: u32,
    anchor: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    if days > MAX_WORKING_DAYS {
        return Err(WorkdayError::InvalidRequest(format!(
            "'days' must be at most {MAX_WORKING_DAYS}, got {days}"
        )));
    }
    if hours > MAX_WORKING_HOURS {
        return Err(WorkdayError::InvalidRequest(format!(
            "'hours' must be at most {MAX_WORKING_HOURS}, got {hours}"
        )));
    }

    let local = clock.to_local(anchor);
    let mut current = if clock.is_business_instant(local, holidays) {
        local
    } else {
        backward_anchor(clock, holidays, local)?
    };

    if days > 0 {
        current = add_working_days(holidays, current, days)?;
    }
    if hours > 0 {
        current = add_working_hours(clock, holidays, current, hours)?;
    }

    let result = clock.to_instant(current);
    tracing::debug!(%anchor, days, hours, %result, "working time calculated");
    Ok(result)
}

/// First working day on or after `from`'s date, same time of day.
fn next_working_day(holidays: &dyn HolidayCalendar, from: LocalReading) -> Result<LocalReading> {
    let mut candidate = from;
    for _ in 0..MAX_SEARCH_STEPS {
        if is_working_date(candidate.date(), holidays) {
            return Ok(candidate);
        }
        candidate = candidate.shift_days(1)?;
    }
    tracing::error!(%from, steps = MAX_SEARCH_STEPS, "forward day search exhausted");
    Err(WorkdayError::CalendarExhausted {
        steps: MAX_SEARCH_STEPS,
        from: from.to_string(),
    })
}

/// Business start of the first working day after `from`'s date.
fn next_opening(
    policy: &BusinessHoursPolicy,
    holidays: &dyn HolidayCalendar,
    from: LocalReading,
) -> Result<LocalReading> {
    Ok(next_working_day(holidays, from.shift_days(1)?)?.with_time(policy.start()))
}

/// Move forward `need` business time within the current day.
///
/// Caller guarantees `need` fits in the day's remaining business time.
fn advance_within_day(
    policy: &BusinessHoursPolicy,
    current: LocalReading,
    need: Duration,
) -> Result<LocalReading> {
    let t = current.time();
    let from = if t < policy.start() {
        current.with_time(policy.start())
    } else {
        current
    };
    let t = from.time();

    if t < policy.lunch_start() {
        let before_lunch = policy.lunch_start() - t;
        if need <= before_lunch {
            from.plus(need)
        } else {
            from.with_time(policy.lunch_end()).plus(need - before_lunch)
        }
    } else if t <= policy.lunch_end() {
        from.with_time(policy.lunch_end()).plus(need)
    } else {
        from.plus(need)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{FixedHolidays, LocalRules};
    use chrono::{NaiveDate, NaiveTime, TimeZone, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> LocalReading {
        LocalReading::from_parts(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(h, min, 0).unwrap(),
        )
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn hours(from: LocalReading, h: u32) -> LocalReading {
        add_working_hours(&BusinessClock::default(), &LocalRules, from, h).unwrap()
    }

    // ── scenarios ───────────────────────────────────────────────────────

    #[test]
    fn test_friday_close_plus_one_hour_is_monday_opening() {
        let clock = BusinessClock::default();
        // 2025-04-11 is a Friday; 17:00 local = 22:00 UTC
        let result =
            calculate_working_datetime(&clock, &LocalRules, 0, 1, utc(2025, 4, 11, 22, 0)).unwrap();
        assert_eq!(result, utc(2025, 4, 14, 13, 0));
    }

    #[test]
    fn test_saturday_plus_one_hour_is_monday_opening() {
        let clock = BusinessClock::default();
        // 2025-04-05 is a Saturday; 14:00 local = 19:00 UTC
        let result =
            calculate_working_datetime(&clock, &LocalRules, 0, 1, utc(2025, 4, 5, 19, 0)).unwrap();
        assert_eq!(result, utc(2025, 4, 7, 13, 0));
    }

    #[test]
    fn test_three_hours_across_lunch() {
        let clock = BusinessClock::default();
        // Wednesday 2025-04-09 11:30 local
        let result =
            calculate_working_datetime(&clock, &LocalRules, 0, 3, utc(2025, 4, 9, 16, 30)).unwrap();
        assert_eq!(result, utc(2025, 4, 9, 20, 30));
    }

    #[test]
    fn test_one_day_over_holy_week_holidays() {
        let clock = BusinessClock::default();
        // Wednesday 2025-04-16 10:00 local; Thursday and Friday are holidays.
        let result =
            calculate_working_datetime(&clock, &LocalRules, 1, 0, utc(2025, 4, 16, 15, 0)).unwrap();
        assert_eq!(result, utc(2025, 4, 21, 15, 0));
    }

    #[test]
    fn test_lunch_anchor_with_nothing_to_add() {
        let clock = BusinessClock::default();
        let result =
            calculate_working_datetime(&clock, &LocalRules, 0, 0, utc(2025, 4, 9, 17, 30)).unwrap();
        assert_eq!(result, utc(2025, 4, 9, 17, 0));
    }

    // ── days ────────────────────────────────────────────────────────────

    #[test]
    fn test_add_days_keeps_time_of_day_outside_hours() {
        let r = add_working_days(&LocalRules, at(2025, 4, 9, 19, 45), 2).unwrap();
        assert_eq!(r, at(2025, 4, 11, 19, 45));
    }

    #[test]
    fn test_add_days_skips_weekend() {
        let r = add_working_days(&FixedHolidays::default(), at(2025, 4, 11, 9, 0), 1).unwrap();
        assert_eq!(r, at(2025, 4, 14, 9, 0));
        assert_eq!(r.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_add_days_zero_is_identity() {
        let r = at(2025, 4, 12, 3, 0);
        assert_eq!(add_working_days(&LocalRules, r, 0).unwrap(), r);
    }

    #[test]
    fn test_add_days_across_year_end() {
        // Wed 2025-12-24 + 2: Dec 25 and Jan 1 holidays, weekend in between.
        let r = add_working_days(&LocalRules, at(2025, 12, 24, 9, 0), 2).unwrap();
        assert_eq!(r, at(2025, 12, 29, 9, 0));
        let r = add_working_days(&LocalRules, at(2025, 12, 31, 9, 0), 1).unwrap();
        assert_eq!(r, at(2026, 1, 2, 9, 0));
    }

    // ── hours ───────────────────────────────────────────────────────────

    #[test]
    fn test_hours_fill_morning_to_lunch_start() {
        assert_eq!(hours(at(2025, 4, 9, 8, 0), 4), at(2025, 4, 9, 12, 0));
    }

    #[test]
    fn test_hours_fill_whole_day() {
        assert_eq!(hours(at(2025, 4, 9, 8, 0), 8), at(2025, 4, 9, 17, 0));
    }

    #[test]
    fn test_hours_from_lunch_start_resume_after_lunch() {
        assert_eq!(hours(at(2025, 4, 9, 12, 0), 1), at(2025, 4, 9, 14, 0));
        assert_eq!(hours(at(2025, 4, 9, 12, 0), 4), at(2025, 4, 9, 17, 0));
    }

    #[test]
    fn test_hours_carry_over_to_next_day() {
        // Tuesday 15:00 + 4h: 2h today, 2h Wednesday from 08:00
        assert_eq!(hours(at(2025, 4, 8, 15, 0), 4), at(2025, 4, 9, 10, 0));
    }

    #[test]
    fn test_hours_carry_over_across_lunch_next_day() {
        // Tuesday 16:00 + 5h: 1h today, 4h Wednesday ends at lunch start
        assert_eq!(hours(at(2025, 4, 8, 16, 0), 5), at(2025, 4, 9, 12, 0));
        assert_eq!(hours(at(2025, 4, 8, 16, 0), 6), at(2025, 4, 9, 14, 0));
    }

    #[test]
    fn test_hours_carry_over_across_holidays() {
        // Wednesday 2025-04-16 16:00 + 2h -> Monday 21st 09:00
        assert_eq!(hours(at(2025, 4, 16, 16, 0), 2), at(2025, 4, 21, 9, 0));
    }

    #[test]
    fn test_multi_day_hours() {
        // 16 working hours from Monday opening ends Tuesday close.
        assert_eq!(hours(at(2025, 4, 7, 8, 0), 16), at(2025, 4, 8, 17, 0));
        assert_eq!(hours(at(2025, 4, 7, 8, 0), 17), at(2025, 4, 9, 9, 0));
    }

    #[test]
    fn test_closed_day_single_hour_shortcut() {
        assert_eq!(hours(at(2025, 4, 11, 17, 0), 1), at(2025, 4, 14, 8, 0));
    }

    #[test]
    fn test_closed_day_multiple_hours_use_general_carry_over() {
        // Same boundary as the shortcut, but two hours are actually worked.
        assert_eq!(hours(at(2025, 4, 11, 17, 0), 2), at(2025, 4, 14, 10, 0));
    }

    #[test]
    fn test_hours_keep_seconds() {
        let clock = BusinessClock::default();
        let from = LocalReading::from_parts(
            NaiveDate::from_ymd_opt(2025, 4, 9).unwrap(),
            NaiveTime::from_hms_opt(9, 15, 42).unwrap(),
        );
        let r = add_working_hours(&clock, &LocalRules, from, 1).unwrap();
        assert_eq!(r.time(), NaiveTime::from_hms_opt(10, 15, 42).unwrap());
    }

    // ── calculate ───────────────────────────────────────────────────────

    #[test]
    fn test_days_then_hours() {
        let clock = BusinessClock::default();
        let anchor = utc(2025, 4, 11, 21, 0); // Friday 16:00 local
        let result = calculate_working_datetime(&clock, &LocalRules, 1, 2, anchor).unwrap();
        let local = clock.to_local(anchor);
        let expected = add_working_hours(
            &clock,
            &LocalRules,
            add_working_days(&LocalRules, local, 1).unwrap(),
            2,
        )
        .unwrap();
        assert_eq!(result, clock.to_instant(expected));
        // Monday 16:00 + 2h -> Tuesday 09:00 local
        assert_eq!(result, utc(2025, 4, 15, 14, 0));
    }

    #[test]
    fn test_valid_anchor_with_nothing_to_add_is_identity() {
        let clock = BusinessClock::default();
        let anchor = Utc.with_ymd_and_hms(2025, 4, 9, 14, 7, 33).unwrap();
        assert_eq!(
            calculate_working_datetime(&clock, &LocalRules, 0, 0, anchor).unwrap(),
            anchor
        );
    }

    #[test]
    fn test_anchor_before_open_then_day() {
        let clock = BusinessClock::default();
        // Monday 2025-04-14 06:00 local -> anchored Friday 17:00 -> +1 day Monday 17:00
        let result =
            calculate_working_datetime(&clock, &LocalRules, 1, 0, utc(2025, 4, 14, 11, 0)).unwrap();
        assert_eq!(result, utc(2025, 4, 14, 22, 0));
    }

    #[test]
    fn test_anchor_on_holiday_then_hours() {
        let clock = BusinessClock::default();
        // Good Friday 2025 10:00 local -> anchored Wednesday 17:00 -> +1h -> Monday 08:00
        let result =
            calculate_working_datetime(&clock, &LocalRules, 0, 1, utc(2025, 4, 18, 15, 0)).unwrap();
        assert_eq!(result, utc(2025, 4, 21, 13, 0));
    }

    #[test]
    fn test_counts_above_limits_are_rejected() {
        let clock = BusinessClock::default();
        let anchor = utc(2025, 4, 9, 15, 0);
        for (days, hours) in [(100_000_000, 0), (0, 520_000_000), (u32::MAX, u32::MAX)] {
            let err = calculate_working_datetime(&clock, &FixedHolidays::default(), days, hours, anchor)
                .unwrap_err();
            assert!(matches!(err, WorkdayError::InvalidRequest(_)), "{days}d {hours}h: {err:?}");
        }
    }

    #[test]
    fn test_counts_at_limits_complete() {
        let clock = BusinessClock::default();
        let anchor = utc(2025, 4, 9, 15, 0);
        let far = calculate_working_datetime(&clock, &LocalRules, MAX_WORKING_DAYS, 0, anchor).unwrap();
        assert!(far > anchor);
        let far = calculate_working_datetime(&clock, &LocalRules, 0, MAX_WORKING_HOURS, anchor).unwrap();
        assert!(far > anchor);
    }

    #[test]
    fn test_days_past_calendar_end_fail_without_panicking() {
        let end = LocalReading::from_parts(NaiveDate::MAX, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        let err = add_working_days(&FixedHolidays::default(), end, 1).unwrap_err();
        assert!(matches!(err, WorkdayError::CalendarExhausted { .. }));
    }

    #[test]
    fn test_hours_past_calendar_end_fail_without_panicking() {
        let clock = BusinessClock::default();
        let end = LocalReading::from_parts(NaiveDate::MAX, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
        let err = add_working_hours(&clock, &FixedHolidays::default(), end, 3).unwrap_err();
        assert!(matches!(err, WorkdayError::CalendarExhausted { .. }));
    }

    #[test]
    fn test_exhausted_calendar_surfaces_error() {
        struct Always;
        impl HolidayCalendar for Always {
            fn is_holiday(&self, _date: NaiveDate) -> bool {
                true
            }
        }
        let clock = BusinessClock::default();
        let err = calculate_working_datetime(&clock, &Always, 1, 0, utc(2025, 4, 9, 15, 0))
            .unwrap_err();
        assert!(matches!(err, WorkdayError::CalendarExhausted { .. }));
    }
}
