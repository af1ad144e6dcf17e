// src/solar.rs
//
// Low-precision solar ephemeris: apparent solar longitude and solar-term
// (jeolgi) crossing search. Accuracy is a few thousandths of a degree,
// comfortably below what civil-date boundary decisions need.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Julian day of the Unix epoch midnight.
const UNIX_EPOCH_JD: f64 = 2440587.5;

/// Mean motion of the sun in degrees per day, used to seed crossing searches.
pub const SUN_DEG_PER_DAY: f64 = 360.0 / 365.2422;

pub fn julian_day(dt: DateTime<Utc>) -> f64 {
    UNIX_EPOCH_JD + dt.timestamp() as f64 / 86_400.0
}

pub fn from_julian_day(jd: f64) -> DateTime<Utc> {
    let secs = (jd - UNIX_EPOCH_JD) * 86_400.0;
    Utc.timestamp_opt(secs.round() as i64, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

/// Julian day number of a civil date (the JD of noon that day, as integer).
pub fn julian_day_number(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    date.num_days_from_ce() as i64 + 1_721_425
}

pub fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Map an angle difference into (-180, 180].
pub fn normalize_to_pm180(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

fn sin_deg(deg: f64) -> f64 {
    deg.to_radians().sin()
}

/// Apparent geocentric solar longitude in degrees (Meeus, low precision).
pub fn solar_longitude(jd: f64) -> f64 {
    let t = (jd - 2_451_545.0) / 36_525.0;

    // geometric mean longitude and mean anomaly
    let l0 = 280.46646 + 36_000.76983 * t + 0.000_303_2 * t * t;
    let m = 357.52911 + 35_999.05029 * t - 0.000_153_7 * t * t;

    // equation of center
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * sin_deg(m)
        + (0.019_993 - 0.000_101 * t) * sin_deg(2.0 * m)
        + 0.000_289 * sin_deg(3.0 * m);

    let true_longitude = l0 + c;

    // aberration and nutation in longitude
    let omega = 125.04 - 1_934.136 * t;
    let apparent = true_longitude - 0.005_69 - 0.004_78 * sin_deg(omega);

    normalize_deg(apparent)
}

/// Refine the instant the sun reaches `target_deg`, starting from `seed_jd`.
/// Newton steps against the sun's mean motion; converges in a handful of
/// iterations for any seed within a couple of weeks of the crossing.
pub fn solar_term_crossing(target_deg: f64, seed_jd: f64) -> f64 {
    let mut jd = seed_jd;
    for _ in 0..20 {
        let diff = normalize_to_pm180(solar_longitude(jd) - target_deg);
        if diff.abs() < 1e-7 {
            break;
        }
        jd -= diff / SUN_DEG_PER_DAY;
    }
    jd
}

/// Approximate then refine the JD at which the sun reaches `target_deg`
/// during solar year `year`. `approx_month`/`approx_day` seed the search so
/// the right crossing of the 360-degree cycle is picked.
pub fn solar_term_jd(year: i32, target_deg: f64, approx_month: u32, approx_day: u32) -> f64 {
    let seed_date = NaiveDate::from_ymd_opt(year, approx_month, approx_day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).unwrap());
    let seed = julian_day_number(seed_date) as f64 - 0.5;
    solar_term_crossing(target_deg, seed)
}
