// src/lunar.rs
//
// Lunisolar civil-date conversion. Months run new moon to new moon, the
// month containing the winter solstice is month 11, and a cycle of 13
// lunations gets a leap month at the first month without a major term
// (junggi). Supported civil years: 1900..=2100.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use chrono_tz::Tz;

use super::{SajuError, SajuResult};
use crate::solar::{
    from_julian_day, normalize_deg, normalize_to_pm180, solar_longitude, solar_term_jd,
};

const MEAN_SYNODIC_MONTH: f64 = 29.530_588_861;

/// Mean elongation growth in degrees per day, for Newton steps.
const ELONGATION_DEG_PER_DAY: f64 = 12.190_749;

const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

fn sin_deg(deg: f64) -> f64 {
    deg.to_radians().sin()
}

/// Geocentric lunar longitude in degrees (principal periodic terms only;
/// about 0.05 degree accuracy, a few minutes of new-moon timing).
pub fn lunar_longitude(jd: f64) -> f64 {
    let t = (jd - 2_451_545.0) / 36_525.0;

    // mean longitude, elongation, anomalies and latitude argument
    let lp = 218.316_447_7 + 481_267.881_234_21 * t;
    let d = 297.850_192_1 + 445_267.111_403_4 * t;
    let m = 357.529_109_2 + 35_999.050_290_9 * t;
    let mp = 134.963_396_4 + 477_198.867_505_5 * t;
    let f = 93.272_095_0 + 483_202.017_523_3 * t;

    let lon = lp
        + 6.288_774 * sin_deg(mp)
        + 1.274_027 * sin_deg(2.0 * d - mp)
        + 0.658_314 * sin_deg(2.0 * d)
        + 0.213_618 * sin_deg(2.0 * mp)
        - 0.185_116 * sin_deg(m)
        - 0.114_332 * sin_deg(2.0 * f)
        + 0.058_793 * sin_deg(2.0 * d - 2.0 * mp)
        + 0.057_066 * sin_deg(2.0 * d - m - mp)
        + 0.053_322 * sin_deg(2.0 * d + mp)
        + 0.045_758 * sin_deg(2.0 * d - m)
        - 0.040_923 * sin_deg(m - mp)
        - 0.034_720 * sin_deg(d)
        - 0.030_383 * sin_deg(m + mp);

    normalize_deg(lon)
}

fn elongation(jd: f64) -> f64 {
    normalize_to_pm180(lunar_longitude(jd) - solar_longitude(jd))
}

/// The new-moon instant nearest `seed_jd`.
pub fn new_moon_near(seed_jd: f64) -> f64 {
    let mut jd = seed_jd;
    for _ in 0..30 {
        let diff = elongation(jd);
        if diff.abs() < 1e-6 {
            break;
        }
        jd -= diff / ELONGATION_DEG_PER_DAY;
    }
    jd
}

/// The last new moon at or before `jd`.
pub fn new_moon_on_or_before(jd: f64) -> f64 {
    let mut nm = new_moon_near(jd);
    while nm > jd {
        nm = new_moon_near(nm - MEAN_SYNODIC_MONTH);
    }
    nm
}

fn next_new_moon(nm: f64) -> f64 {
    new_moon_near(nm + MEAN_SYNODIC_MONTH)
}

/// Local civil date on which the instant `jd` falls, in `tz`.
fn civil_date(jd: f64, tz: Tz) -> NaiveDate {
    from_julian_day(jd).with_timezone(&tz).date_naive()
}

/// Whether the lunation starting at `start` contains a major term (junggi,
/// a multiple of 30 degrees of solar longitude).
fn contains_major_term(start: f64, end: f64) -> bool {
    let lon_start = solar_longitude(start);
    let travel = normalize_deg(solar_longitude(end) - lon_start);
    let lon_end = lon_start + travel;
    (lon_end / 30.0).floor() > (lon_start / 30.0).floor()
}

fn winter_solstice_jd(year: i32) -> f64 {
    solar_term_jd(year, 270.0, 12, 21)
}

/// One lunation of a solstice-to-solstice cycle, numbered 1..=12 with a
/// leap flag.
#[derive(Debug, Clone, Copy)]
struct Lunation {
    number: u32,
    leap: bool,
    start: f64,
    end: f64,
}

/// Enumerate the lunations of the cycle between the winter solstices of
/// `ws_year` and `ws_year + 1`, numbered from month 11.
fn solstice_cycle(ws_year: i32) -> Vec<Lunation> {
    let ws_a = winter_solstice_jd(ws_year);
    let ws_b = winter_solstice_jd(ws_year + 1);

    let mut starts = vec![new_moon_on_or_before(ws_a)];
    loop {
        let next = next_new_moon(*starts.last().unwrap());
        starts.push(next);
        // the first new moon past the far solstice opens the next cycle's
        // month 11 and only serves as the final end boundary here
        if next > ws_b || starts.len() > 15 {
            break;
        }
    }
    let month_count = starts.len() - 1;
    let is_leap_cycle = month_count == 13;

    let mut leap_taken = false;
    let mut number: u32 = 11;
    let mut out = Vec::with_capacity(month_count);
    for i in 0..month_count {
        let start = starts[i];
        let end = starts[i + 1];
        let leap = is_leap_cycle
            && !leap_taken
            && i > 0
            && !contains_major_term(start, end);
        if leap {
            leap_taken = true;
            // a leap month repeats the previous month's number
            out.push(Lunation {
                number: if number == 1 { 12 } else { number - 1 },
                leap: true,
                start,
                end,
            });
            continue;
        }
        out.push(Lunation {
            number,
            leap: false,
            start,
            end,
        });
        number = if number == 12 { 1 } else { number + 1 };
    }
    out
}

/// Convert a lunisolar date to the solar civil date, using `tz` for the
/// day boundaries of the lunation starts.
pub fn lunar_to_solar(
    year: i32,
    month: u32,
    leap: bool,
    day: u32,
    tz: Tz,
) -> SajuResult<NaiveDate> {
    if !SUPPORTED_YEARS.contains(&year) {
        return Err(SajuError::InvalidInput(format!(
            "lunar year {} outside supported range 1900..=2100",
            year
        )));
    }
    if !(1..=12).contains(&month) || !(1..=30).contains(&day) {
        return Err(SajuError::InvalidInput(format!(
            "lunar month {} day {} out of range",
            month, day
        )));
    }

    // months 11 and 12 sit in the cycle anchored at this year's solstice,
    // months 1..=10 in the cycle anchored at the previous year's
    let ws_year = if month >= 11 { year } else { year - 1 };
    let cycle = solstice_cycle(ws_year);

    let lunation = cycle
        .iter()
        .find(|l| l.number == month && l.leap == leap)
        .copied()
        .ok_or_else(|| {
            SajuError::InvalidInput(format!(
                "lunar {}-{}{} has no defined solar mapping",
                year,
                month,
                if leap { " (leap)" } else { "" }
            ))
        })?;

    let start_date = civil_date(lunation.start, tz);
    let end_date = civil_date(lunation.end, tz);
    let length = (end_date - start_date).num_days();
    if i64::from(day) > length {
        return Err(SajuError::InvalidInput(format!(
            "lunar month {}-{} has only {} days",
            year, month, length
        )));
    }
    Ok(start_date + ChronoDuration::days(i64::from(day) - 1))
}

/// Convert a solar civil date to its lunisolar (year, month, leap, day).
pub fn solar_to_lunar(date: NaiveDate, tz: Tz) -> SajuResult<(i32, u32, bool, u32)> {
    if !SUPPORTED_YEARS.contains(&date.year()) {
        return Err(SajuError::InvalidInput(format!(
            "solar year {} outside supported range 1900..=2100",
            date.year()
        )));
    }

    // the date may belong to the cycle anchored at either this year's or
    // the previous year's solstice
    for ws_year in [date.year(), date.year() - 1] {
        let cycle = solstice_cycle(ws_year);
        for l in &cycle {
            let start_date = civil_date(l.start, tz);
            let end_date = civil_date(l.end, tz);
            if date >= start_date && date < end_date {
                let day = (date - start_date).num_days() as u32 + 1;
                let lunar_year = if l.number >= 11 { ws_year } else { ws_year + 1 };
                return Ok((lunar_year, l.number, l.leap, day));
            }
        }
    }
    Err(SajuError::InvalidInput(format!(
        "no lunar mapping found for {}",
        date
    )))
}
