// End-to-end checks through the public API: chart derivation, the full
// report, lunar input, relation analysis over extended slot sets and
// serde round trips.

use chrono::{NaiveDate, NaiveTime};
use saju_core::cycles::CycleDirection;
use saju_core::{
    annual_cycle, generate_saju_report, relations, BirthInfo, CalendarType, EarthlyBranch, Gender,
    HeavenlyStem, RelationKind, SajuError, Sibsin, SlotId,
};

fn birth(
    date: (i32, u32, u32),
    time: (u32, u32),
    calendar: CalendarType,
    gender: Gender,
) -> BirthInfo {
    BirthInfo {
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
        timezone: "Asia/Seoul".to_string(),
        calendar,
        gender,
    }
}

#[test]
fn reference_birth_derives_the_documented_chart() {
    // 1991-06-18 07:10 Seoul: Sin-Mi year, Gap-O month, Gi-Mi day, Mu-Jin hour
    let b = birth((1991, 6, 18), (7, 10), CalendarType::Solar, Gender::Male);
    let report = generate_saju_report(&b).unwrap();

    assert_eq!(report.chart.year.stem, HeavenlyStem::Sin);
    assert_eq!(report.chart.year.branch, EarthlyBranch::Mi);
    assert_eq!(report.chart.month.stem, HeavenlyStem::Gap);
    assert_eq!(report.chart.month.branch, EarthlyBranch::O);
    assert_eq!(report.chart.day.stem, HeavenlyStem::Gi);
    assert_eq!(report.chart.day.branch, EarthlyBranch::Mi);
    assert_eq!(report.chart.hour.stem, HeavenlyStem::Mu);
    assert_eq!(report.chart.hour.branch, EarthlyBranch::Jin);
}

#[test]
fn report_sections_are_complete() {
    let b = birth((1991, 6, 18), (7, 10), CalendarType::Solar, Gender::Male);
    let report = generate_saju_report(&b).unwrap();

    assert_eq!(report.decade_cycle.entries.len(), 10);
    // yin year stem and male: the decade cycle runs backward
    assert_eq!(report.decade_cycle.direction, CycleDirection::Backward);

    assert_eq!(report.life_stages.len(), 4);
    assert_eq!(report.sibsin.len(), 4);
    // the day slot is the day master's own stem
    assert!(report
        .sibsin
        .iter()
        .any(|&(id, s)| id == SlotId::Day && s == Sibsin::Bigyeon));

    // O and Mi sit in this chart, so the six-combination fires
    assert!(report
        .relations
        .iter()
        .any(|h| h.kind == RelationKind::SixCombination));

    // eight visible positions in the tally
    let visible: f64 = report.element_tally.visible.iter().map(|&(_, v)| v).sum();
    assert!((visible - 8.0).abs() < 1e-9);

    // every analysis field computed for a well-formed birth
    assert!(report.analysis.rootedness.is_some());
    assert!(report.analysis.seasonal.is_some());
    assert!(report.analysis.pattern.is_some());
    assert!(report.analysis.favorable.is_some());
    assert!(report.analysis.sibsin_breakdown.is_some());
    let composite = report.analysis.composite.as_ref().unwrap();
    assert!((0.0..=100.0).contains(&composite.score));
}

#[test]
fn shinsal_hits_carry_consistent_luck_flags() {
    let b = birth((1991, 6, 18), (7, 10), CalendarType::Solar, Gender::Male);
    let report = generate_saju_report(&b).unwrap();
    for hit in &report.shinsal {
        assert_eq!(hit.lucky, hit.shinsal.is_lucky());
        assert!(hit.slot.is_natal());
    }
}

#[test]
fn lunar_birth_matches_its_solar_equivalent() {
    // lunar 2000-01-01 was solar 2000-02-05
    let lunar = birth((2000, 1, 1), (10, 0), CalendarType::Lunar, Gender::Female);
    let solar = birth((2000, 2, 5), (10, 0), CalendarType::Solar, Gender::Female);
    assert_eq!(lunar.chart().unwrap(), solar.chart().unwrap());
}

#[test]
fn leap_month_input_requires_an_actual_leap_month() {
    let bad = birth((2000, 1, 1), (10, 0), CalendarType::LunarLeap, Gender::Male);
    assert!(matches!(
        bad.generate_report(),
        Err(SajuError::InvalidInput(_))
    ));
}

#[test]
fn unknown_timezone_is_rejected_up_front() {
    let mut b = birth((1991, 6, 18), (7, 10), CalendarType::Solar, Gender::Male);
    b.timezone = "Not/AZone".to_string();
    assert!(matches!(
        b.generate_report(),
        Err(SajuError::InvalidInput(_))
    ));
}

#[test]
fn cycle_slots_extend_relation_analysis() {
    let b = birth((1991, 6, 18), (7, 10), CalendarType::Solar, Gender::Male);
    let chart = b.chart().unwrap();

    // natal-only analysis never names a cycle slot
    let natal_hits = relations::analyze(&chart.slots());
    assert!(natal_hits
        .iter()
        .all(|h| h.slots.iter().all(|s| s.is_natal())));

    // appending an annual pillar lets it participate; the Ja year clashes
    // with the O month of this chart
    let annual = annual_cycle(2020, 1).remove(0);
    assert_eq!(annual.pillar.branch, EarthlyBranch::Ja);
    let mut slots = chart.slots().to_vec();
    slots.push((SlotId::Annual, annual.pillar));
    let extended = relations::analyze(&slots);
    assert!(extended.iter().any(|h| h.kind == RelationKind::Clash
        && h.slots.contains(&SlotId::Annual)
        && h.slots.contains(&SlotId::Month)));
}

#[test]
fn report_serializes_and_round_trips() {
    let b = birth((1984, 2, 5), (3, 30), CalendarType::Solar, Gender::Female);
    let report = generate_saju_report(&b).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: saju_core::Report = serde_json::from_str(&json).unwrap();
    assert_eq!(report, back);
}
