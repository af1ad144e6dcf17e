// src/calendar.rs
//
// Chart derivation: birth instant -> four pillars. The year and month
// pillars follow solar-term boundaries, the day pillar is a continuous
// sexagenary day count, the hour pillar a two-hour bin of local time.

use chrono::{DateTime, Datelike, Duration as ChronoDuration, LocalResult, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::*;
use crate::solar::{
    julian_day, julian_day_number, normalize_deg, solar_longitude, solar_term_crossing,
    solar_term_jd, SUN_DEG_PER_DAY,
};

/// Sexagenary index of the reference epoch day: Julian day number plus this
/// offset, modulo 60, yields the day pillar (0 = Gap-Ja). Anchored on
/// 1900-01-01 being a Gap-Sul day.
const DAY_EPOCH_OFFSET: i64 = 49;

/// Years are offset so that 1984 (and every year ≡ 4 mod 60) is Gap-Ja.
const YEAR_EPOCH_OFFSET: i64 = 4;

/// The twelve month-defining solar terms (jeolgi): name, solar longitude,
/// and an approximate civil date used to seed the crossing search. Index 0
/// opens the In month; index 11 (Sohan) falls in January of the following
/// civil year.
pub static JEOLGI: [(&str, f64, u32, u32); 12] = [
    ("Ipchun", 315.0, 2, 4),
    ("Gyeongchip", 345.0, 3, 6),
    ("Cheongmyeong", 15.0, 4, 5),
    ("Ipha", 45.0, 5, 6),
    ("Mangjong", 75.0, 6, 6),
    ("Soseo", 105.0, 7, 7),
    ("Ipchu", 135.0, 8, 8),
    ("Baekno", 165.0, 9, 8),
    ("Hallo", 195.0, 10, 8),
    ("Ipdong", 225.0, 11, 7),
    ("Daeseol", 255.0, 12, 7),
    ("Sohan", 285.0, 1, 6),
];

/// Month-stem origin (five tigers): the stem of the In month for each year
/// stem. Subsequent months advance one stem each.
static MONTH_STEM_ORIGIN: [(HeavenlyStem, HeavenlyStem); 10] = [
    (HeavenlyStem::Gap, HeavenlyStem::Byeong),
    (HeavenlyStem::Eul, HeavenlyStem::Mu),
    (HeavenlyStem::Byeong, HeavenlyStem::Gyeong),
    (HeavenlyStem::Jeong, HeavenlyStem::Im),
    (HeavenlyStem::Mu, HeavenlyStem::Gap),
    (HeavenlyStem::Gi, HeavenlyStem::Byeong),
    (HeavenlyStem::Gyeong, HeavenlyStem::Mu),
    (HeavenlyStem::Sin, HeavenlyStem::Gyeong),
    (HeavenlyStem::Im, HeavenlyStem::Im),
    (HeavenlyStem::Gye, HeavenlyStem::Gap),
];

/// Hour-stem origin (five rats): the stem of the Ja hour for each day stem.
static HOUR_STEM_ORIGIN: [(HeavenlyStem, HeavenlyStem); 10] = [
    (HeavenlyStem::Gap, HeavenlyStem::Gap),
    (HeavenlyStem::Eul, HeavenlyStem::Byeong),
    (HeavenlyStem::Byeong, HeavenlyStem::Mu),
    (HeavenlyStem::Jeong, HeavenlyStem::Gyeong),
    (HeavenlyStem::Mu, HeavenlyStem::Im),
    (HeavenlyStem::Gi, HeavenlyStem::Gap),
    (HeavenlyStem::Gyeong, HeavenlyStem::Byeong),
    (HeavenlyStem::Sin, HeavenlyStem::Mu),
    (HeavenlyStem::Im, HeavenlyStem::Gyeong),
    (HeavenlyStem::Gye, HeavenlyStem::Im),
];

/// The solar term opening a chart's month, with its exact instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarTermInfo {
    pub name: String,
    /// 0 = Ipchun .. 11 = Sohan.
    pub index: usize,
    pub instant: DateTime<Utc>,
}

pub(crate) fn resolve_timezone(id: &str) -> SajuResult<Tz> {
    id.parse::<Tz>()
        .map_err(|_| SajuError::InvalidInput(format!("unknown timezone '{}'", id)))
}

/// Normalize the birth date/time to a zoned instant, converting lunar input
/// to the solar calendar first.
pub(crate) fn birth_instant(birth: &BirthInfo) -> SajuResult<(DateTime<Tz>, Tz)> {
    let tz = resolve_timezone(&birth.timezone)?;

    let solar_date = match birth.calendar {
        CalendarType::Solar => birth.date,
        CalendarType::Lunar => lunar::lunar_to_solar(
            birth.date.year(),
            birth.date.month(),
            false,
            birth.date.day(),
            tz,
        )?,
        CalendarType::LunarLeap => lunar::lunar_to_solar(
            birth.date.year(),
            birth.date.month(),
            true,
            birth.date.day(),
            tz,
        )?,
    };

    let local = match tz.from_local_datetime(&solar_date.and_time(birth.time)) {
        LocalResult::Single(dt) => dt,
        // spring-forward gap or fall-back fold; take the earlier mapping
        LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            return Err(SajuError::InvalidInput(format!(
                "local time {} {} does not exist in {}",
                solar_date, birth.time, birth.timezone
            )))
        }
    };
    Ok((local, tz))
}

/// Sexagenary month index (0 = In month .. 11 = Chuk month) of an instant,
/// straight from the solar longitude: each month is one 30-degree step from
/// Ipchun at 315 degrees.
pub(crate) fn month_index(instant: DateTime<Utc>) -> usize {
    let lon = solar_longitude(julian_day(instant));
    (normalize_deg(lon - 315.0) / 30.0).floor() as usize % 12
}

/// Sexagenary year of an instant: the civil year, decremented when the
/// instant precedes that year's Ipchun.
pub(crate) fn sexagenary_year(local: DateTime<Tz>) -> i32 {
    let utc = local.with_timezone(&Utc);
    let civil_year = local.year();
    let ipchun = solar_term_jd(civil_year, 315.0, 2, 4);
    if julian_day(utc) < ipchun {
        civil_year - 1
    } else {
        civil_year
    }
}

pub(crate) fn year_pillar_of(year: i32) -> Pillar {
    Pillar::from_sexagenary_index(year as i64 - YEAR_EPOCH_OFFSET)
}

pub(crate) fn month_pillar_of(year_stem: HeavenlyStem, month_idx: usize) -> Pillar {
    let origin = MONTH_STEM_ORIGIN
        .iter()
        .find(|&&(y, _)| y == year_stem)
        .map(|&(_, m)| m)
        // the origin table is total over the ten stems
        .unwrap_or(HeavenlyStem::Byeong);
    let stem = origin.offset(month_idx as i64);
    let branch = EarthlyBranch::In.offset(month_idx as i64);
    Pillar { stem, branch }
}

/// Day pillar of a local civil date, with the birth time applied for the
/// 23:00 boundary (the early Ja hour belongs to the next day).
pub(crate) fn day_pillar_of(date: NaiveDate, hour: u32) -> Pillar {
    let date = if hour >= 23 {
        date + ChronoDuration::days(1)
    } else {
        date
    };
    Pillar::from_sexagenary_index(julian_day_number(date) + DAY_EPOCH_OFFSET)
}

/// Two-hour bin of the hour branch; 23:00-00:59 is Ja.
pub(crate) fn hour_branch_of(hour: u32) -> EarthlyBranch {
    let bin = ((hour + 1) / 2) % 12;
    EarthlyBranch::from_index(bin as usize).unwrap_or(EarthlyBranch::Ja)
}

pub(crate) fn hour_pillar_of(day_stem: HeavenlyStem, hour: u32) -> Pillar {
    let branch = hour_branch_of(hour);
    let origin = HOUR_STEM_ORIGIN
        .iter()
        .find(|&&(d, _)| d == day_stem)
        .map(|&(_, h)| h)
        .unwrap_or(HeavenlyStem::Gap);
    let stem = origin.offset(branch.index() as i64);
    Pillar { stem, branch }
}

/// Derives the four-pillar chart for a birth.
pub fn derive_chart(birth: &BirthInfo) -> SajuResult<Chart> {
    let (local, _tz) = birth_instant(birth)?;
    let utc = local.with_timezone(&Utc);

    let year_num = sexagenary_year(local);
    let year = year_pillar_of(year_num);

    let month_idx = month_index(utc);
    let month = month_pillar_of(year.stem, month_idx);

    let day = day_pillar_of(local.date_naive(), local.hour());
    let hour = hour_pillar_of(day.stem, local.hour());

    Ok(Chart {
        year,
        month,
        day,
        hour,
    })
}

/// The solar term that opened the month containing `instant`, with its
/// exact crossing time. Display layers show this next to the chart.
pub fn month_term_of(instant: DateTime<Utc>) -> SolarTermInfo {
    let idx = month_index(instant);
    let (name, target, _, _) = JEOLGI[idx];
    let jd = julian_day(instant);
    let lon = solar_longitude(jd);
    // walk back from the instant to the opening crossing
    let seed = jd - normalize_deg(lon - target) / SUN_DEG_PER_DAY;
    let crossing = solar_term_crossing(target, seed);
    SolarTermInfo {
        name: name.to_string(),
        index: idx,
        instant: solar::from_julian_day(crossing),
    }
}

/// The next jeolgi crossing strictly after `instant` (used for the decade
/// cycle start age). Returns the term and its instant.
pub(crate) fn next_term_after(instant: DateTime<Utc>) -> SolarTermInfo {
    let idx = (month_index(instant) + 1) % 12;
    let (name, target, _, _) = JEOLGI[idx];
    let jd = julian_day(instant);
    let lon = solar_longitude(jd);
    let seed = jd + normalize_deg(target - lon) / SUN_DEG_PER_DAY;
    let crossing = solar_term_crossing(target, seed);
    SolarTermInfo {
        name: name.to_string(),
        index: idx,
        instant: solar::from_julian_day(crossing),
    }
}

/// The jeolgi crossing at or before `instant` (the month's opening term).
pub(crate) fn prev_term_before(instant: DateTime<Utc>) -> SolarTermInfo {
    month_term_of(instant)
}
