// src/strength.rs
//
// Day-master strength assessment: element tallies, rootedness through the
// buried stems, seasonal standing from the month branch, pattern
// classification and the favorable-element (yongsin) pick.

use serde::{Deserialize, Serialize};

use super::*;
use crate::relations::sibsin_of;

// ---------------------------
// ## Element Tally
// ---------------------------

/// Element presence across the chart. `visible` counts the four stems and
/// four branch elements at 1.0 each; `weighted` replaces each branch with
/// its buried stems at their tier weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTally {
    pub visible: Vec<(Element, f64)>,
    pub weighted: Vec<(Element, f64)>,
}

impl ElementTally {
    pub fn visible_of(&self, element: Element) -> f64 {
        self.visible
            .iter()
            .find(|&&(e, _)| e == element)
            .map(|&(_, v)| v)
            .unwrap_or(0.0)
    }

    pub fn weighted_of(&self, element: Element) -> f64 {
        self.weighted
            .iter()
            .find(|&&(e, _)| e == element)
            .map(|&(_, v)| v)
            .unwrap_or(0.0)
    }

    pub fn weighted_total(&self) -> f64 {
        self.weighted.iter().map(|&(_, v)| v).sum()
    }

    /// The element with the largest weighted presence.
    pub fn dominant(&self) -> Element {
        self.weighted
            .iter()
            .cloned()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(e, _)| e)
            .unwrap_or(Element::Wood)
    }
}

pub fn element_tally(chart: &Chart) -> ElementTally {
    let mut visible = [0.0_f64; 5];
    let mut weighted = [0.0_f64; 5];

    for (_, pillar) in chart.slots() {
        visible[pillar.stem.element() as usize] += 1.0;
        visible[pillar.branch.element() as usize] += 1.0;
        weighted[pillar.stem.element() as usize] += 1.0;
        for h in pillar.branch.hidden_stems() {
            weighted[h.stem.element() as usize] += h.tier.weight();
        }
    }

    let pack = |arr: [f64; 5]| {
        Element::iter()
            .map(|e| (e, arr[e as usize]))
            .collect::<Vec<_>>()
    };
    ElementTally {
        visible: pack(visible),
        weighted: pack(weighted),
    }
}

// ---------------------------
// ## Rootedness
// ---------------------------

/// Position weight of a natal slot for rootedness: the month branch
/// dominates, the hour outweighs the year.
fn slot_root_weight(slot: SlotId) -> f64 {
    match slot {
        SlotId::Month => 3.0,
        SlotId::Day => 2.5,
        SlotId::Hour => 2.0,
        _ => 1.5,
    }
}

/// Tier weight used for rootedness only; a main root counts far more than
/// a residual one.
fn tier_root_weight(tier: HiddenTier) -> f64 {
    match tier {
        HiddenTier::Main => 1.0,
        HiddenTier::Middle => 0.6,
        HiddenTier::Early => 0.3,
    }
}

/// Sum of natal position weights, the raw score of a chart rooted through
/// a main stem in every branch.
const ROOT_FULL_RAW: f64 = 3.0 + 2.5 + 2.0 + 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootSupport {
    pub slot: SlotId,
    pub stem: HeavenlyStem,
    pub tier: HiddenTier,
    pub weight: f64,
}

/// Rootedness of the day master: which branches bury a stem of its
/// element, weighted by slot position and tier. `score` is normalized to
/// 0..=10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootednessResult {
    pub score: f64,
    pub supports: Vec<RootSupport>,
}

pub fn rootedness(chart: &Chart) -> SajuResult<RootednessResult> {
    let target = chart.day_master().element();
    let mut supports = Vec::new();
    let mut raw = 0.0;

    for (slot, pillar) in chart.slots() {
        for h in pillar.branch.hidden_stems() {
            if h.stem.element() != target {
                continue;
            }
            let weight = slot_root_weight(slot) * tier_root_weight(h.tier);
            raw += weight;
            supports.push(RootSupport {
                slot,
                stem: h.stem,
                tier: h.tier,
                weight,
            });
        }
    }

    Ok(RootednessResult {
        score: (raw / ROOT_FULL_RAW * 10.0).min(10.0),
        supports,
    })
}

// ---------------------------
// ## Seasonal Standing
// ---------------------------

/// Seasonal standing of the day master in its birth month: 1.0 in its own
/// season, 0.6 when the season feeds it, 0.0 otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalResult {
    pub month_element: Element,
    pub support: f64,
}

pub fn seasonal_support(chart: &Chart) -> SajuResult<SeasonalResult> {
    let dm = chart.day_master().element();
    let month_element = chart.month.branch.element();
    let support = if month_element == dm {
        1.0
    } else if month_element.generates() == dm {
        0.6
    } else {
        0.0
    };
    Ok(SeasonalResult {
        month_element,
        support,
    })
}

// ---------------------------
// ## Pattern Classification
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// Month branch carries the day master's own troops.
    Geonnok,
    /// Yang day master with its blade in the month branch.
    Yangin,
    Siksin,
    Sanggwan,
    Pyeonjae,
    Jeongjae,
    Pyeongwan,
    Jeonggwan,
    Pyeonin,
    Jeongin,
}

fn pattern_of_sibsin(s: Sibsin) -> Option<Pattern> {
    match s {
        Sibsin::Siksin => Some(Pattern::Siksin),
        Sibsin::Sanggwan => Some(Pattern::Sanggwan),
        Sibsin::Pyeonjae => Some(Pattern::Pyeonjae),
        Sibsin::Jeongjae => Some(Pattern::Jeongjae),
        Sibsin::Pyeongwan => Some(Pattern::Pyeongwan),
        Sibsin::Jeonggwan => Some(Pattern::Jeonggwan),
        Sibsin::Pyeonin => Some(Pattern::Pyeonin),
        Sibsin::Jeongin => Some(Pattern::Jeongin),
        Sibsin::Bigyeon | Sibsin::Geopjae => None,
    }
}

/// The chart's governing pattern: the ten-relation that dominates the
/// non-day-master stems, with a purity measure, its share of the counted
/// units, 0..=1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern: Pattern,
    pub dominant: Sibsin,
    pub purity: f64,
}

fn parallel_pattern(dominant: Sibsin, dm: HeavenlyStem) -> Pattern {
    if dominant == Sibsin::Geopjae && dm.polarity() == Polarity::Yang {
        Pattern::Yangin
    } else {
        Pattern::Geonnok
    }
}

/// Classifies by the dominant ten-relation over the non-day visible stems
/// and every branch's main hidden stem, ties broken in favor of the month
/// slot's relation. A month branch carrying the day master's own troops
/// short-circuits into the Geonnok/Yangin special cases.
pub fn classify_pattern(chart: &Chart) -> SajuResult<PatternResult> {
    let dm = chart.day_master();
    let month_sibsin = sibsin_of(dm, chart.month.branch.main_hidden_stem());

    let mut counts = [0.0_f64; 10];
    let mut total = 0.0;
    for (slot, pillar) in chart.slots() {
        if slot != SlotId::Day {
            counts[sibsin_of(dm, pillar.stem) as usize] += 1.0;
            total += 1.0;
        }
        counts[sibsin_of(dm, pillar.branch.main_hidden_stem()) as usize] += 1.0;
        total += 1.0;
    }
    if total <= 0.0 {
        return Err(SajuError::SubAnalysis(
            "no stems available for pattern dominance".to_string(),
        ));
    }

    // a parallel month overrides dominance
    if pattern_of_sibsin(month_sibsin).is_none() {
        return Ok(PatternResult {
            pattern: parallel_pattern(month_sibsin, dm),
            dominant: month_sibsin,
            purity: counts[month_sibsin as usize] / total,
        });
    }

    // seed with the month relation so ties resolve toward the month slot
    let mut dominant = month_sibsin;
    for s in Sibsin::iter() {
        if counts[s as usize] > counts[dominant as usize] {
            dominant = s;
        }
    }

    let pattern = match pattern_of_sibsin(dominant) {
        Some(p) => p,
        None => parallel_pattern(dominant, dm),
    };

    Ok(PatternResult {
        pattern,
        dominant,
        purity: counts[dominant as usize] / total,
    })
}

// ---------------------------
// ## Favorable Elements
// ---------------------------

/// Relative weight of rootedness vs seasonal standing when splitting
/// charts into strong and weak.
const STRENGTH_ROOT_SHARE: f64 = 0.6;
const STRENGTH_THRESHOLD: f64 = 0.5;

/// Climate adjustment returned by the johu lookup: a primary element the
/// season demands and an optional secondary that sustains it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JohuAdvice {
    pub primary: Element,
    pub secondary: Option<Element>,
}

/// The favorable (yongsin) and unfavorable (gisin) element picks, the
/// yongsin candidates ordered scarcest-first from the weighted tally with
/// the johu advice, when the season issues one, ahead of everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorableResult {
    pub strong: bool,
    pub yongsin: Vec<Element>,
    pub gisin: Vec<Element>,
    pub johu: Option<JohuAdvice>,
}

/// Johu lookup, keyed by day stem and month branch and defined for every
/// one of the 120 keys. The deep-winter branches call for fire (fuelled by
/// wood), the deep-summer branches for water (fed by metal); a day master
/// already carrying the needed element, or supplying its secondary, gets
/// the advice trimmed accordingly, and temperate months get none.
pub fn johu_of(stem: HeavenlyStem, month: EarthlyBranch) -> Option<JohuAdvice> {
    let (primary, feeder) = match month {
        EarthlyBranch::Hae | EarthlyBranch::Ja | EarthlyBranch::Chuk => {
            (Element::Fire, Element::Wood)
        }
        EarthlyBranch::Sa | EarthlyBranch::O | EarthlyBranch::Mi => {
            (Element::Water, Element::Metal)
        }
        _ => return None,
    };
    let dm = stem.element();
    if dm == primary {
        return None;
    }
    let secondary = if dm == feeder { None } else { Some(feeder) };
    Some(JohuAdvice { primary, secondary })
}

pub fn favorable_elements(chart: &Chart) -> SajuResult<FavorableResult> {
    let root = rootedness(chart)?;
    let seasonal = seasonal_support(chart)?;
    let tally = element_tally(chart);

    let strength = root.score / 10.0 * STRENGTH_ROOT_SHARE
        + seasonal.support * (1.0 - STRENGTH_ROOT_SHARE);
    let strong = strength >= STRENGTH_THRESHOLD;

    let dm = chart.day_master().element();
    let (mut yongsin, gisin) = if strong {
        (
            vec![dm.generates(), dm.controls(), dm.controlled_by()],
            vec![dm.generated_by(), dm],
        )
    } else {
        (
            vec![dm.generated_by(), dm],
            vec![dm.controlled_by(), dm.controls(), dm.generates()],
        )
    };

    // scarcest candidates first; stable sort keeps the cycle order on ties
    yongsin.sort_by(|&a, &b| {
        tally
            .weighted_of(a)
            .partial_cmp(&tally.weighted_of(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let johu = johu_of(chart.day_master(), chart.month.branch);
    if let Some(advice) = johu {
        if let Some(sec) = advice.secondary {
            yongsin.retain(|&x| x != sec);
            yongsin.insert(0, sec);
        }
        yongsin.retain(|&x| x != advice.primary);
        yongsin.insert(0, advice.primary);
    }

    Ok(FavorableResult {
        strong,
        yongsin,
        gisin,
        johu,
    })
}

// ---------------------------
// ## Sibsin Breakdown
// ---------------------------

/// Ten-relation totals over the chart, relative to the day master. Visible
/// stems other than the day master count 1.0; buried stems count their
/// tier weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SibsinBreakdown {
    pub counts: Vec<(Sibsin, f64)>,
}

impl SibsinBreakdown {
    pub fn of(&self, sibsin: Sibsin) -> f64 {
        self.counts
            .iter()
            .find(|&&(s, _)| s == sibsin)
            .map(|&(_, v)| v)
            .unwrap_or(0.0)
    }

    pub fn dominant(&self) -> Sibsin {
        self.counts
            .iter()
            .cloned()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(s, _)| s)
            .unwrap_or(Sibsin::Bigyeon)
    }
}

pub fn sibsin_breakdown(chart: &Chart) -> SajuResult<SibsinBreakdown> {
    let dm = chart.day_master();
    let mut counts = [0.0_f64; 10];

    for (slot, pillar) in chart.slots() {
        if slot != SlotId::Day {
            counts[sibsin_of(dm, pillar.stem) as usize] += 1.0;
        }
        for h in pillar.branch.hidden_stems() {
            counts[sibsin_of(dm, h.stem) as usize] += h.tier.weight();
        }
    }

    Ok(SibsinBreakdown {
        counts: Sibsin::iter().map(|s| (s, counts[s as usize])).collect(),
    })
}

// ---------------------------
// ## Tests
// ---------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pillar(stem: HeavenlyStem, branch: EarthlyBranch) -> Pillar {
        Pillar::new(stem, branch).unwrap()
    }

    /// Gap day master born in an In month: strongly rooted, in season.
    fn rooted_chart() -> Chart {
        Chart {
            year: pillar(HeavenlyStem::Gap, EarthlyBranch::In),
            month: pillar(HeavenlyStem::Byeong, EarthlyBranch::In),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::In),
            hour: pillar(HeavenlyStem::Eul, EarthlyBranch::Hae),
        }
    }

    /// Gap day master in a Yu month with no wood below: rootless and out
    /// of season.
    fn rootless_chart() -> Chart {
        Chart {
            year: pillar(HeavenlyStem::Gyeong, EarthlyBranch::Sin),
            month: pillar(HeavenlyStem::Eul, EarthlyBranch::Yu),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::Sul),
            hour: pillar(HeavenlyStem::Gyeong, EarthlyBranch::O),
        }
    }

    #[test]
    fn tally_counts_eight_visible_positions() {
        let tally = element_tally(&rooted_chart());
        let visible_total: f64 = tally.visible.iter().map(|&(_, v)| v).sum();
        assert_relative_eq!(visible_total, 8.0);
        // three In branches and a Hae, three wood stems
        assert_relative_eq!(tally.visible_of(Element::Wood), 6.0);
        assert!(tally.weighted_of(Element::Wood) > tally.weighted_of(Element::Metal));
        assert_eq!(tally.dominant(), Element::Wood);
    }

    #[test]
    fn rootedness_separates_the_extremes() {
        let rooted = rootedness(&rooted_chart()).unwrap();
        let rootless = rootedness(&rootless_chart()).unwrap();
        assert!(rooted.score > 6.0, "rooted score {}", rooted.score);
        assert_relative_eq!(rootless.score, 0.0);
        assert!(rootless.supports.is_empty());
        // the month root is the heaviest single support
        let max = rooted
            .supports
            .iter()
            .map(|s| s.weight)
            .fold(0.0_f64, f64::max);
        assert!(rooted
            .supports
            .iter()
            .any(|s| s.slot == SlotId::Month && s.weight == max));
    }

    #[test]
    fn rootedness_score_stays_in_range() {
        let rooted = rootedness(&rooted_chart()).unwrap();
        assert!(rooted.score <= 10.0);
    }

    #[test]
    fn seasonal_support_levels() {
        // wood in a wood month
        let s = seasonal_support(&rooted_chart()).unwrap();
        assert_relative_eq!(s.support, 1.0);
        // wood in a metal month
        let s = seasonal_support(&rootless_chart()).unwrap();
        assert_relative_eq!(s.support, 0.0);
        // wood in a water month: fed by the season
        let chart = Chart {
            year: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            month: pillar(HeavenlyStem::Byeong, EarthlyBranch::Ja),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::In),
            hour: pillar(HeavenlyStem::Eul, EarthlyBranch::Hae),
        };
        let s = seasonal_support(&chart).unwrap();
        assert_relative_eq!(s.support, 0.6);
    }

    #[test]
    fn dominant_sibsin_overrides_the_month_anchor() {
        // Gap day master: the month's Ja carries Gye (direct resource),
        // but three Byeong stems make the eating god dominant
        let chart = Chart {
            year: pillar(HeavenlyStem::Byeong, EarthlyBranch::O),
            month: pillar(HeavenlyStem::Byeong, EarthlyBranch::Ja),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::O),
            hour: pillar(HeavenlyStem::Byeong, EarthlyBranch::In),
        };
        let p = classify_pattern(&chart).unwrap();
        assert_eq!(p.dominant, Sibsin::Siksin);
        assert_eq!(p.pattern, Pattern::Siksin);
        assert_relative_eq!(p.purity, 3.0 / 7.0);
    }

    #[test]
    fn tied_dominance_resolves_to_the_month_relation() {
        // Gap day master: seven killings and direct officer both count 2;
        // the month slot carries the officer, so the officer wins
        let chart = Chart {
            year: pillar(HeavenlyStem::Gyeong, EarthlyBranch::Sin),
            month: pillar(HeavenlyStem::Sin, EarthlyBranch::Yu),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            hour: pillar(HeavenlyStem::Byeong, EarthlyBranch::In),
        };
        let p = classify_pattern(&chart).unwrap();
        assert_eq!(p.dominant, Sibsin::Jeonggwan);
        assert_eq!(p.pattern, Pattern::Jeonggwan);
    }

    #[test]
    fn rootless_chart_is_dominated_by_its_officers() {
        // two Gyeong stems and a Sin main outweigh the month's lone officer
        let p = classify_pattern(&rootless_chart()).unwrap();
        assert_eq!(p.dominant, Sibsin::Pyeongwan);
        assert_eq!(p.pattern, Pattern::Pyeongwan);
        assert!(p.purity > 0.0 && p.purity <= 1.0);
    }

    #[test]
    fn parallel_month_forms_geonnok_or_yangin() {
        // Gap in an In month: own troops
        let p = classify_pattern(&rooted_chart()).unwrap();
        assert_eq!(p.pattern, Pattern::Geonnok);

        // Gap in a Myo month: blade of the yang day master
        let chart = Chart {
            year: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            month: pillar(HeavenlyStem::Jeong, EarthlyBranch::Myo),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::In),
            hour: pillar(HeavenlyStem::Eul, EarthlyBranch::Hae),
        };
        let p = classify_pattern(&chart).unwrap();
        assert_eq!(p.pattern, Pattern::Yangin);

        // Eul in a Myo month: yin day master stays Geonnok
        let chart = Chart {
            year: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            month: pillar(HeavenlyStem::Jeong, EarthlyBranch::Myo),
            day: pillar(HeavenlyStem::Eul, EarthlyBranch::Hae),
            hour: pillar(HeavenlyStem::Byeong, EarthlyBranch::Ja),
        };
        let p = classify_pattern(&chart).unwrap();
        assert_eq!(p.pattern, Pattern::Geonnok);
    }

    #[test]
    fn strong_and_weak_charts_pick_opposite_elements() {
        let strong = favorable_elements(&rooted_chart()).unwrap();
        assert!(strong.strong);
        // a strong wood chart wants draining and control, not more wood
        assert!(strong.yongsin.contains(&Element::Fire));
        assert!(strong.gisin.contains(&Element::Wood));

        let weak = favorable_elements(&rootless_chart()).unwrap();
        assert!(!weak.strong);
        assert!(weak.yongsin.contains(&Element::Water));
        assert!(weak.yongsin.contains(&Element::Wood));
        assert!(weak.gisin.contains(&Element::Metal));
    }

    #[test]
    fn winter_chart_gets_fire_first() {
        // Gap born in a Ja month; wood itself is the fuel, so no secondary
        let chart = Chart {
            year: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            month: pillar(HeavenlyStem::Byeong, EarthlyBranch::Ja),
            day: pillar(HeavenlyStem::Gap, EarthlyBranch::In),
            hour: pillar(HeavenlyStem::Eul, EarthlyBranch::Hae),
        };
        let fav = favorable_elements(&chart).unwrap();
        assert_eq!(
            fav.johu,
            Some(JohuAdvice {
                primary: Element::Fire,
                secondary: None,
            })
        );
        assert_eq!(fav.yongsin.first(), Some(&Element::Fire));
    }

    #[test]
    fn winter_earth_day_master_gets_fire_and_its_fuel() {
        let chart = Chart {
            year: pillar(HeavenlyStem::Im, EarthlyBranch::Ja),
            month: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            day: pillar(HeavenlyStem::Mu, EarthlyBranch::Jin),
            hour: pillar(HeavenlyStem::Im, EarthlyBranch::Ja),
        };
        let fav = favorable_elements(&chart).unwrap();
        assert_eq!(
            fav.johu,
            Some(JohuAdvice {
                primary: Element::Fire,
                secondary: Some(Element::Wood),
            })
        );
        assert_eq!(&fav.yongsin[..2], &[Element::Fire, Element::Wood]);
    }

    #[test]
    fn johu_lookup_is_total_over_all_keys() {
        for stem in HeavenlyStem::iter() {
            for month in EarthlyBranch::iter() {
                let advice = johu_of(stem, month);
                match month {
                    EarthlyBranch::Hae | EarthlyBranch::Ja | EarthlyBranch::Chuk => {
                        if stem.element() == Element::Fire {
                            assert_eq!(advice, None);
                        } else {
                            let a = advice.unwrap();
                            assert_eq!(a.primary, Element::Fire);
                            assert_ne!(a.secondary, Some(a.primary));
                            assert_ne!(a.secondary, Some(stem.element()));
                        }
                    }
                    EarthlyBranch::Sa | EarthlyBranch::O | EarthlyBranch::Mi => {
                        if stem.element() == Element::Water {
                            assert_eq!(advice, None);
                        } else {
                            let a = advice.unwrap();
                            assert_eq!(a.primary, Element::Water);
                            assert_ne!(a.secondary, Some(a.primary));
                            assert_ne!(a.secondary, Some(stem.element()));
                        }
                    }
                    _ => assert_eq!(advice, None),
                }
            }
        }
    }

    #[test]
    fn scarce_candidates_lead_the_yongsin_list() {
        // strong wood chart: metal is absent, earth scarce, fire plentiful
        let fav = favorable_elements(&rooted_chart()).unwrap();
        assert!(fav.strong);
        assert_eq!(
            fav.yongsin,
            vec![Element::Metal, Element::Earth, Element::Fire]
        );
    }

    #[test]
    fn fire_day_master_needs_no_winter_adjustment() {
        let chart = Chart {
            year: pillar(HeavenlyStem::Gap, EarthlyBranch::Ja),
            month: pillar(HeavenlyStem::Byeong, EarthlyBranch::Ja),
            day: pillar(HeavenlyStem::Byeong, EarthlyBranch::In),
            hour: pillar(HeavenlyStem::Gap, EarthlyBranch::O),
        };
        let fav = favorable_elements(&chart).unwrap();
        assert_eq!(fav.johu, None);
    }

    #[test]
    fn breakdown_covers_the_ten_relations() {
        let b = sibsin_breakdown(&rooted_chart()).unwrap();
        assert_eq!(b.counts.len(), 10);
        // the day-master stem itself is not counted
        let total: f64 = b.counts.iter().map(|&(_, v)| v).sum();
        let weighted_branches: f64 = rooted_chart()
            .slots()
            .iter()
            .flat_map(|&(_, p)| p.branch.hidden_stems())
            .map(|h| h.tier.weight())
            .sum();
        assert_relative_eq!(total, 3.0 + weighted_branches);
        // a chart drowning in wood is dominated by parallels
        assert_eq!(b.dominant(), Sibsin::Bigyeon);
    }
}
