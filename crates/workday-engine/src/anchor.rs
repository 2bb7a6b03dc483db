//! Backward anchoring: the nearest business instant at or before a reading.
//!
//! The search walks a candidate backwards through two phases:
//!
//! - **day**: while the candidate's date is not a working day, move to the
//!   previous civil day at business end;
//! - **hour**: on a working day, a time before business start moves to the
//!   previous day's end (and the day phase runs again); a time after business
//!   end snaps to business end; a time inside lunch snaps to lunch start.
//!
//! The snap targets are resting points: the search stops there. Every step
//! moves the candidate strictly backwards, and the walk is capped at
//! [`MAX_SEARCH_STEPS`].

use crate::authority::HolidayCalendar;
use crate::business::{BusinessClock, LocalReading};
use crate::error::{Result, WorkdayError};

/// Upper bound on search transitions before giving up with
/// [`WorkdayError::CalendarExhausted`].
pub const MAX_SEARCH_STEPS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seek {
    Day,
    Hour,
    Done,
}

/// Normalize `from` to the nearest valid business reading at or before it.
///
/// Readings that already satisfy both business predicates come back unchanged.
///
/// # Errors
///
/// Returns [`WorkdayError::CalendarExhausted`] if no business day is found
/// within the step cap, which only happens with a corrupted holiday set.
pub fn backward_anchor(
    clock: &BusinessClock,
    holidays: &dyn HolidayCalendar,
    from: LocalReading,
) -> Result<LocalReading> {
    let policy = clock.policy();
    let previous_close =
        |r: LocalReading| r.shift_days(-1).map(|day| day.with_time(policy.end()));

    let mut candidate = from;
    let mut state = Seek::Day;
    let mut steps = 0;

    while state != Seek::Done {
        if steps == MAX_SEARCH_STEPS {
            tracing::error!(%from, steps, "backward anchor search exhausted");
            return Err(WorkdayError::CalendarExhausted {
                steps,
                from: from.to_string(),
            });
        }
        steps += 1;

        state = match state {
            Seek::Day if clock.is_working_day(candidate, holidays) => Seek::Hour,
            Seek::Day => {
                candidate = previous_close(candidate)?;
                Seek::Day
            }
            Seek::Hour => {
                let t = candidate.time();
                if t < policy.start() {
                    candidate = previous_close(candidate)?;
                    Seek::Day
                } else if t > policy.end() {
                    candidate = candidate.with_time(policy.end());
                    Seek::Done
                } else if policy.is_lunch(t) {
                    candidate = candidate.with_time(policy.lunch_start());
                    Seek::Done
                } else {
                    Seek::Done
                }
            }
            Seek::Done => Seek::Done,
        };
    }

    if candidate != from {
        tracing::debug!(%from, to = %candidate, steps, "anchored backward");
    }
    Ok(candidate)
}
