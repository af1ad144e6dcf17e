// src/cycles.rs
//
// Time cycles anchored to a chart (decade) or to absolute calendar time
// (annual, monthly, daily). All step the sexagenary cycle one index at a
// time; only the decade cycle can run backward.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::*;
use crate::calendar::{
    day_pillar_of, month_pillar_of, next_term_after, prev_term_before, year_pillar_of,
};

/// Roughly three days between jeolgi boundaries correspond to one year of
/// decade-cycle age.
const DAYS_PER_DECADE_YEAR: f64 = 3.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl CycleDirection {
    pub fn step(self) -> i64 {
        match self {
            CycleDirection::Forward => 1,
            CycleDirection::Backward => -1,
        }
    }
}

/// Gender × year-stem polarity → decade direction, kept as data so the
/// rule cannot drift if enumerations are reordered.
static DECADE_DIRECTION: [(Gender, Polarity, CycleDirection); 4] = [
    (Gender::Male, Polarity::Yang, CycleDirection::Forward),
    (Gender::Male, Polarity::Yin, CycleDirection::Backward),
    (Gender::Female, Polarity::Yang, CycleDirection::Backward),
    (Gender::Female, Polarity::Yin, CycleDirection::Forward),
];

pub fn decade_direction(gender: Gender, year_stem_polarity: Polarity) -> CycleDirection {
    DECADE_DIRECTION
        .iter()
        .find(|&&(g, p, _)| g == gender && p == year_stem_polarity)
        .map(|&(_, _, d)| d)
        // the table is total over the four combinations
        .unwrap_or(CycleDirection::Forward)
}

/// One entry of a generated cycle; `index` is the age (decade), calendar
/// year (annual), month number (monthly) or day of month (daily).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleEntry {
    pub index: i64,
    pub pillar: Pillar,
}

/// The decade (daeun) cycle: ten pillars stepping from the month pillar in
/// the direction fixed at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeCycle {
    pub direction: CycleDirection,
    pub start_age: u32,
    pub entries: Vec<CycleEntry>,
}

/// Number of decade pillars generated.
const DECADE_COUNT: u32 = 10;

pub fn decade_cycle(birth: &BirthInfo, chart: &Chart) -> SajuResult<DecadeCycle> {
    let (local, _tz) = calendar::birth_instant(birth)?;
    let utc = local.with_timezone(&Utc);

    let direction = decade_direction(birth.gender, chart.year.stem.polarity());

    // distance to the jeolgi boundary in the cycle's direction
    let boundary = match direction {
        CycleDirection::Forward => next_term_after(utc).instant,
        CycleDirection::Backward => prev_term_before(utc).instant,
    };
    let days = (boundary - utc).num_seconds().abs() as f64 / 86_400.0;
    let start_age = (days / DAYS_PER_DECADE_YEAR).round().max(1.0) as u32;

    let step = direction.step();
    let entries = (0..DECADE_COUNT)
        .map(|i| CycleEntry {
            index: i64::from(start_age + 10 * i),
            pillar: chart.month.offset(step * (i64::from(i) + 1)),
        })
        .collect();

    Ok(DecadeCycle {
        direction,
        start_age,
        entries,
    })
}

/// Annual (seun) cycle: one year pillar per calendar year, forward from
/// `start_year`. A zero-length request yields an empty vector.
pub fn annual_cycle(start_year: i32, count: usize) -> Vec<CycleEntry> {
    (0..count)
        .map(|i| {
            let year = start_year + i as i32;
            CycleEntry {
                index: i64::from(year),
                pillar: year_pillar_of(year),
            }
        })
        .collect()
}

/// Monthly (wolun) cycle: the twelve jeolgi months of the sexagenary year
/// `year`, index 1 being the In month opened by Ipchun.
pub fn monthly_cycle(year: i32) -> Vec<CycleEntry> {
    let year_stem = year_pillar_of(year).stem;
    (0..12)
        .map(|i| CycleEntry {
            index: i64::from(i) + 1,
            pillar: month_pillar_of(year_stem, i as usize),
        })
        .collect()
}

/// Daily (ilun) cycle: one day pillar per civil day of the given month.
/// An invalid month yields an empty vector.
pub fn daily_cycle(year: i32, month: u32) -> Vec<CycleEntry> {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return Vec::new(),
    };
    let days = days_in_month(first);
    (1..=days)
        .map(|d| CycleEntry {
            index: i64::from(d),
            pillar: day_pillar_of(
                NaiveDate::from_ymd_opt(year, month, d).unwrap_or(first),
                12,
            ),
        })
        .collect()
}

fn days_in_month(first: NaiveDate) -> u32 {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.map(|n| (n - first).num_days() as u32).unwrap_or(30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn birth(gender: Gender, date: (i32, u32, u32)) -> BirthInfo {
        BirthInfo {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            timezone: "Asia/Seoul".to_string(),
            calendar: CalendarType::Solar,
            gender,
        }
    }

    #[test]
    fn direction_table_covers_all_combinations() {
        assert_eq!(
            decade_direction(Gender::Male, Polarity::Yang),
            CycleDirection::Forward
        );
        assert_eq!(
            decade_direction(Gender::Male, Polarity::Yin),
            CycleDirection::Backward
        );
        assert_eq!(
            decade_direction(Gender::Female, Polarity::Yang),
            CycleDirection::Backward
        );
        assert_eq!(
            decade_direction(Gender::Female, Polarity::Yin),
            CycleDirection::Forward
        );
    }

    #[test]
    fn male_yang_year_runs_forward_male_yin_backward() {
        // 1984 is Gap-Ja (yang stem), 1985 Eul-Chuk (yin stem)
        let b_yang = birth(Gender::Male, (1984, 6, 1));
        let chart_yang = b_yang.chart().unwrap();
        let cycle_yang = decade_cycle(&b_yang, &chart_yang).unwrap();
        assert_eq!(cycle_yang.direction, CycleDirection::Forward);

        let b_yin = birth(Gender::Male, (1985, 6, 1));
        let chart_yin = b_yin.chart().unwrap();
        let cycle_yin = decade_cycle(&b_yin, &chart_yin).unwrap();
        assert_eq!(cycle_yin.direction, CycleDirection::Backward);

        // both cycles step away from the month pillar with opposite signs
        let m_yang = chart_yang.month.sexagenary_index();
        let m_yin = chart_yin.month.sexagenary_index();
        assert_eq!(
            cycle_yang.entries[0].pillar.sexagenary_index(),
            (m_yang + 1) % 60
        );
        assert_eq!(
            cycle_yin.entries[0].pillar.sexagenary_index(),
            (m_yin - 1).rem_euclid(60)
        );
    }

    #[test]
    fn forcing_the_year_stem_polarity_flips_the_direction() {
        let b = birth(Gender::Male, (1984, 6, 1));
        let chart = b.chart().unwrap();
        assert_eq!(chart.year.stem.polarity(), Polarity::Yang);

        // same birth instant, year pillar shifted one step to a yin stem
        let mut forced = chart;
        forced.year = chart.year.offset(1);
        assert_eq!(forced.year.stem.polarity(), Polarity::Yin);

        let fwd = decade_cycle(&b, &chart).unwrap();
        let bwd = decade_cycle(&b, &forced).unwrap();
        assert_eq!(fwd.direction, CycleDirection::Forward);
        assert_eq!(bwd.direction, CycleDirection::Backward);

        // both step from the same month pillar with opposite signs
        let m = chart.month.sexagenary_index();
        for (i, (f, r)) in fwd.entries.iter().zip(bwd.entries.iter()).enumerate() {
            let k = i as i64 + 1;
            assert_eq!(f.pillar.sexagenary_index(), (m + k).rem_euclid(60));
            assert_eq!(r.pillar.sexagenary_index(), (m - k).rem_euclid(60));
        }
    }

    #[test]
    fn decade_entries_step_by_one_and_ages_by_ten() {
        let b = birth(Gender::Female, (1991, 3, 8));
        let chart = b.chart().unwrap();
        let cycle = decade_cycle(&b, &chart).unwrap();
        assert_eq!(cycle.entries.len(), 10);
        assert!(cycle.start_age >= 1 && cycle.start_age <= 11);
        let step = cycle.direction.step();
        for w in cycle.entries.windows(2) {
            assert_eq!(w[1].index - w[0].index, 10);
            assert_eq!(
                w[1].pillar.sexagenary_index(),
                (w[0].pillar.sexagenary_index() + step).rem_euclid(60)
            );
        }
    }

    #[test]
    fn annual_cycle_follows_years() {
        let entries = annual_cycle(1984, 5);
        assert_eq!(entries.len(), 5);
        // 1984 is Gap-Ja
        assert_eq!(entries[0].pillar.sexagenary_index(), 0);
        for w in entries.windows(2) {
            assert_eq!(
                w[1].pillar.sexagenary_index(),
                (w[0].pillar.sexagenary_index() + 1) % 60
            );
        }
    }

    #[test]
    fn annual_cycle_zero_length_is_empty() {
        assert!(annual_cycle(2000, 0).is_empty());
    }

    #[test]
    fn cycle_periodicity_over_sixty_steps() {
        let entries = annual_cycle(1984, 61);
        assert_eq!(entries[0].pillar, entries[60].pillar);
    }

    #[test]
    fn monthly_cycle_has_twelve_consecutive_entries() {
        let entries = monthly_cycle(2000);
        assert_eq!(entries.len(), 12);
        // 2000 is Gyeong-Jin; its In month stem origin is Mu
        assert_eq!(entries[0].pillar.stem, HeavenlyStem::Mu);
        assert_eq!(entries[0].pillar.branch, EarthlyBranch::In);
        for w in entries.windows(2) {
            assert_eq!(
                w[1].pillar.sexagenary_index(),
                (w[0].pillar.sexagenary_index() + 1) % 60
            );
        }
    }

    #[test]
    fn daily_cycle_spans_the_civil_month() {
        let entries = daily_cycle(2000, 2);
        assert_eq!(entries.len(), 29);
        for w in entries.windows(2) {
            assert_eq!(
                w[1].pillar.sexagenary_index(),
                (w[0].pillar.sexagenary_index() + 1) % 60
            );
        }
        assert!(daily_cycle(2000, 13).is_empty());
    }

    #[test]
    fn generated_cycle_pillars_satisfy_parity() {
        for e in annual_cycle(1900, 201)
            .into_iter()
            .chain(monthly_cycle(1999))
            .chain(daily_cycle(2024, 2))
        {
            assert_eq!(e.pillar.stem.index() % 2, e.pillar.branch.index() % 2);
        }
    }
}
