//! Business-hours policy: the daily working window and its lunch exclusion.
//!
//! The policy is immutable once constructed and validated. All boundaries are
//! civil times of day in the local offset; see [`crate::business`] for how the
//! policy is applied to instants.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkdayError};

/// Daily working window with an excluded lunch interval.
///
/// Invariant: `start <= lunch_start < lunch_end <= end`, and at least one
/// working minute remains once lunch is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessHoursPolicy {
    start: NaiveTime,
    lunch_start: NaiveTime,
    lunch_end: NaiveTime,
    end: NaiveTime,
}

impl Default for BusinessHoursPolicy {
    /// 08:00 to 17:00 with lunch from 12:00 to 13:00.
    fn default() -> Self {
        Self {
            start: hm(8, 0),
            lunch_start: hm(12, 0),
            lunch_end: hm(13, 0),
            end: hm(17, 0),
        }
    }
}

impl BusinessHoursPolicy {
    /// Build a policy from hour/minute pairs, validating the ordering invariant.
    ///
    /// # Errors
    ///
    /// Returns [`WorkdayError::InvalidConfig`] if any pair is not a valid time
    /// of day or the boundaries are out of order.
    pub fn new(
        start: (u32, u32),
        lunch_start: (u32, u32),
        lunch_end: (u32, u32),
        end: (u32, u32),
    ) -> Result<Self> {
        let policy = Self {
            start: parse_pair(start)?,
            lunch_start: parse_pair(lunch_start)?,
            lunch_end: parse_pair(lunch_end)?,
            end: parse_pair(end)?,
        };
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> Result<()> {
        if !(self.start <= self.lunch_start
            && self.lunch_start < self.lunch_end
            && self.lunch_end <= self.end)
        {
            return Err(WorkdayError::InvalidConfig(format!(
                "business hours must satisfy start <= lunch start < lunch end <= end, got {self}"
            )));
        }
        if self.working_minutes_per_day() <= 0 {
            return Err(WorkdayError::InvalidConfig(format!(
                "business hours leave no working time outside lunch: {self}"
            )));
        }
        Ok(())
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn lunch_start(&self) -> NaiveTime {
        self.lunch_start
    }

    pub fn lunch_end(&self) -> NaiveTime {
        self.lunch_end
    }

    pub fn lunch_duration(&self) -> Duration {
        self.lunch_end - self.lunch_start
    }

    /// Working minutes in a full business day, lunch excluded.
    pub fn working_minutes_per_day(&self) -> i64 {
        ((self.end - self.start) - self.lunch_duration()).num_minutes()
    }

    /// Whether `t` falls inside the lunch window.
    ///
    /// Both ends are closed: `lunch_start` and `lunch_end` themselves count as
    /// lunch.
    pub fn is_lunch(&self, t: NaiveTime) -> bool {
        t >= self.lunch_start && t <= self.lunch_end
    }

    /// Whether `t` is a working time of day: inside `[start, end]` and not lunch.
    pub fn contains(&self, t: NaiveTime) -> bool {
        t >= self.start && t <= self.end && !self.is_lunch(t)
    }

    /// Business time still available on a day whose clock reads `t`.
    ///
    /// Times before `start` count from `start`. Only the part of lunch that
    /// has not yet elapsed is subtracted.
    pub fn remaining_from(&self, t: NaiveTime) -> Duration {
        if t >= self.end {
            return Duration::zero();
        }
        let from = t.max(self.start);
        let lunch_left = (self.lunch_end - from.max(self.lunch_start)).max(Duration::zero());
        (self.end - from) - lunch_left
    }
}

impl fmt::Display for BusinessHoursPolicy {
    /// Renders as `HH:MM-HH:MM-HH:MM-HH:MM` (start, lunch start, lunch end, end).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.start.format("%H:%M"),
            self.lunch_start.format("%H:%M"),
            self.lunch_end.format("%H:%M"),
            self.end.format("%H:%M"),
        )
    }
}

impl FromStr for BusinessHoursPolicy {
    type Err = WorkdayError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 4 {
            return Err(WorkdayError::InvalidConfig(format!(
                "business hours must look like 08:00-12:00-13:00-17:00, got '{s}'"
            )));
        }
        let mut times = [NaiveTime::MIN; 4];
        for (slot, part) in times.iter_mut().zip(&parts) {
            *slot = NaiveTime::parse_from_str(part, "%H:%M").map_err(|e| {
                WorkdayError::InvalidConfig(format!("'{part}' in business hours: {e}"))
            })?;
        }
        let pair = |t: NaiveTime| (t.hour(), t.minute());
        Self::new(pair(times[0]), pair(times[1]), pair(times[2]), pair(times[3]))
    }
}

impl TryFrom<String> for BusinessHoursPolicy {
    type Error = WorkdayError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<BusinessHoursPolicy> for String {
    fn from(policy: BusinessHoursPolicy) -> Self {
        policy.to_string()
    }
}

fn parse_pair((hour, minute): (u32, u32)) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        WorkdayError::InvalidConfig(format!("{hour:02}:{minute:02} is not a time of day"))
    })
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
