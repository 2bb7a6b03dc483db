//! Colombian holiday rules, computed locally.
//!
//! Three rule classes make up the national calendar:
//!
//! - **Fixed**: observed on the literal calendar date every year.
//! - **Bridge** (Ley Emiliani): a fixed nominal date moved forward to the
//!   following Monday when it does not already fall on one.
//! - **Easter-relative**: an offset from Easter Sunday. Holy Thursday and Good
//!   Friday stay on their computed date; the remaining feasts are moved to
//!   Monday with the same rule as the bridge class.
//!
//! This computation is the fallback used by [`crate::authority`] when the
//! external provider has no data for a year.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Whether a holiday applies nationally or only in some regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayClass {
    National,
    Regional,
}

/// A single observed holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayRecord {
    /// Civil date on which the holiday is observed.
    pub date: NaiveDate,
    pub name: String,
    pub classification: HolidayClass,
}

/// How a rule maps its nominal date to the observed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observance {
    Literal,
    NextMonday,
}

const FIXED: &[(u32, u32, &str)] = &[
    (1, 1, "Año Nuevo"),
    (5, 1, "Día del Trabajo"),
    (7, 20, "Día de la Independencia"),
    (8, 7, "Batalla de Boyacá"),
    (12, 8, "Inmaculada Concepción"),
    (12, 25, "Navidad"),
];

const BRIDGE: &[(u32, u32, &str)] = &[
    (1, 6, "Día de los Reyes Magos"),
    (3, 19, "Día de San José"),
    (6, 29, "San Pedro y San Pablo"),
    (8, 15, "La Asunción de la Virgen"),
    (10, 12, "Día de la Raza"),
    (11, 1, "Todos los Santos"),
    (11, 11, "Independencia de Cartagena"),
];

/// Offsets in days from Easter Sunday.
const EASTER_RELATIVE: &[(i64, Observance, &str)] = &[
    (-3, Observance::Literal, "Jueves Santo"),
    (-2, Observance::Literal, "Viernes Santo"),
    (39, Observance::NextMonday, "Ascensión del Señor"),
    (60, Observance::NextMonday, "Corpus Christi"),
    (68, Observance::NextMonday, "Sagrado Corazón de Jesús"),
];

/// Easter Sunday for `year` in the Gregorian calendar.
///
/// Anonymous Gregorian algorithm (Meeus/Jones/Butcher). Returns `None` only for
/// years chrono cannot represent.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Move `date` forward to the next Monday unless it already is one.
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    let shift = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(i64::from(shift))
}

fn observe(date: NaiveDate, observance: Observance) -> NaiveDate {
    match observance {
        Observance::Literal => date,
        Observance::NextMonday => next_monday(date),
    }
}

/// Named national holidays for `year`, sorted by date.
///
/// When two rules land on the same day both records are kept; use
/// [`local_holidays_for_year`] for the deduplicated date set.
pub fn local_holiday_records(year: i32) -> Vec<HolidayRecord> {
    let mut records = Vec::with_capacity(FIXED.len() + BRIDGE.len() + EASTER_RELATIVE.len());

    let fixed = FIXED.iter().map(|&(m, d, name)| (m, d, name, Observance::Literal));
    let bridge = BRIDGE.iter().map(|&(m, d, name)| (m, d, name, Observance::NextMonday));
    for (month, day, name, observance) in fixed.chain(bridge) {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            records.push(national(observe(date, observance), name));
        }
    }

    if let Some(easter) = easter_sunday(year) {
        for &(offset, observance, name) in EASTER_RELATIVE {
            let nominal = easter + Duration::days(offset);
            records.push(national(observe(nominal, observance), name));
        }
    }

    records.sort_by_key(|r| r.date);
    records
}

/// Deduplicated, sorted holiday dates for `year` from the local rules.
pub fn local_holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = local_holiday_records(year)
        .into_iter()
        .map(|r| r.date)
        .collect();
    dates.dedup();
    dates
}

fn national(date: NaiveDate, name: &str) -> HolidayRecord {
    HolidayRecord {
        date,
        name: name.to_string(),
        classification: HolidayClass::National,
    }
}

/// Whether `date` falls on a weekend.
pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
