// src/lib.rs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

pub mod calendar;
pub mod cycles;
pub mod lunar;
pub mod relations;
pub mod score;
pub mod shinsal;
pub mod solar;
pub mod strength;

pub use calendar::{derive_chart, month_term_of, SolarTermInfo};
pub use cycles::{annual_cycle, daily_cycle, decade_cycle, monthly_cycle, CycleEntry, DecadeCycle};
pub use relations::{
    life_stage_of, sibsin_of, LifeStage, RelationHit, RelationKind, Sibsin,
    RELATION_DISPLAY_PRIORITY,
};
pub use score::{CompositeScore, Grade};
pub use shinsal::{detect_shinsal, Shinsal, ShinsalHit, ShinsalOptions, ShinsalRuleSet};
pub use strength::{
    ElementTally, FavorableResult, JohuAdvice, Pattern, PatternResult, RootednessResult,
    SeasonalResult, SibsinBreakdown,
};

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub fn iter() -> impl Iterator<Item = Element> {
        [
            Element::Wood,
            Element::Fire,
            Element::Earth,
            Element::Metal,
            Element::Water,
        ]
        .iter()
        .copied()
    }

    /// The element this element generates (wood feeds fire, fire makes earth, ...).
    pub fn generates(self) -> Element {
        match self {
            Element::Wood => Element::Fire,
            Element::Fire => Element::Earth,
            Element::Earth => Element::Metal,
            Element::Metal => Element::Water,
            Element::Water => Element::Wood,
        }
    }

    /// The element this element controls (wood parts earth, earth dams water, ...).
    pub fn controls(self) -> Element {
        match self {
            Element::Wood => Element::Earth,
            Element::Earth => Element::Water,
            Element::Water => Element::Fire,
            Element::Fire => Element::Metal,
            Element::Metal => Element::Wood,
        }
    }

    pub fn generated_by(self) -> Element {
        match self {
            Element::Fire => Element::Wood,
            Element::Earth => Element::Fire,
            Element::Metal => Element::Earth,
            Element::Water => Element::Metal,
            Element::Wood => Element::Water,
        }
    }

    pub fn controlled_by(self) -> Element {
        match self {
            Element::Earth => Element::Wood,
            Element::Water => Element::Earth,
            Element::Fire => Element::Water,
            Element::Metal => Element::Fire,
            Element::Wood => Element::Metal,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    pub fn opposite(self) -> Polarity {
        match self {
            Polarity::Yang => Polarity::Yin,
            Polarity::Yin => Polarity::Yang,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Polarity::Yang => write!(f, "Yang"),
            Polarity::Yin => write!(f, "Yin"),
        }
    }
}

/// The ten heavenly stems (cheongan), in cyclic order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeavenlyStem {
    Gap,
    Eul,
    Byeong,
    Jeong,
    Mu,
    Gi,
    Gyeong,
    Sin,
    Im,
    Gye,
}

impl HeavenlyStem {
    pub fn from_index(index: usize) -> Option<HeavenlyStem> {
        match index {
            0 => Some(HeavenlyStem::Gap),
            1 => Some(HeavenlyStem::Eul),
            2 => Some(HeavenlyStem::Byeong),
            3 => Some(HeavenlyStem::Jeong),
            4 => Some(HeavenlyStem::Mu),
            5 => Some(HeavenlyStem::Gi),
            6 => Some(HeavenlyStem::Gyeong),
            7 => Some(HeavenlyStem::Sin),
            8 => Some(HeavenlyStem::Im),
            9 => Some(HeavenlyStem::Gye),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn iter() -> impl Iterator<Item = HeavenlyStem> {
        (0..10).map(HeavenlyStem::from_index).flatten()
    }

    /// Step the stem cycle by `offset` (may be negative).
    pub fn offset(self, offset: i64) -> HeavenlyStem {
        let idx = (self.index() as i64 + offset).rem_euclid(10) as usize;
        HeavenlyStem::from_index(idx).unwrap_or(HeavenlyStem::Gap)
    }

    pub fn element(self) -> Element {
        match self {
            HeavenlyStem::Gap | HeavenlyStem::Eul => Element::Wood,
            HeavenlyStem::Byeong | HeavenlyStem::Jeong => Element::Fire,
            HeavenlyStem::Mu | HeavenlyStem::Gi => Element::Earth,
            HeavenlyStem::Gyeong | HeavenlyStem::Sin => Element::Metal,
            HeavenlyStem::Im | HeavenlyStem::Gye => Element::Water,
        }
    }

    pub fn polarity(self) -> Polarity {
        if self.index() % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }

    pub fn hanja(self) -> &'static str {
        match self {
            HeavenlyStem::Gap => "甲",
            HeavenlyStem::Eul => "乙",
            HeavenlyStem::Byeong => "丙",
            HeavenlyStem::Jeong => "丁",
            HeavenlyStem::Mu => "戊",
            HeavenlyStem::Gi => "己",
            HeavenlyStem::Gyeong => "庚",
            HeavenlyStem::Sin => "辛",
            HeavenlyStem::Im => "壬",
            HeavenlyStem::Gye => "癸",
        }
    }

    pub fn korean(self) -> &'static str {
        match self {
            HeavenlyStem::Gap => "갑",
            HeavenlyStem::Eul => "을",
            HeavenlyStem::Byeong => "병",
            HeavenlyStem::Jeong => "정",
            HeavenlyStem::Mu => "무",
            HeavenlyStem::Gi => "기",
            HeavenlyStem::Gyeong => "경",
            HeavenlyStem::Sin => "신",
            HeavenlyStem::Im => "임",
            HeavenlyStem::Gye => "계",
        }
    }
}

impl fmt::Display for HeavenlyStem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            HeavenlyStem::Gap => "Gap",
            HeavenlyStem::Eul => "Eul",
            HeavenlyStem::Byeong => "Byeong",
            HeavenlyStem::Jeong => "Jeong",
            HeavenlyStem::Mu => "Mu",
            HeavenlyStem::Gi => "Gi",
            HeavenlyStem::Gyeong => "Gyeong",
            HeavenlyStem::Sin => "Sin",
            HeavenlyStem::Im => "Im",
            HeavenlyStem::Gye => "Gye",
        };
        write!(f, "{}", name)
    }
}

/// The twelve earthly branches (jiji), in cyclic order starting from Ja (rat).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EarthlyBranch {
    Ja,
    Chuk,
    In,
    Myo,
    Jin,
    Sa,
    O,
    Mi,
    Sin,
    Yu,
    Sul,
    Hae,
}

impl EarthlyBranch {
    pub fn from_index(index: usize) -> Option<EarthlyBranch> {
        match index {
            0 => Some(EarthlyBranch::Ja),
            1 => Some(EarthlyBranch::Chuk),
            2 => Some(EarthlyBranch::In),
            3 => Some(EarthlyBranch::Myo),
            4 => Some(EarthlyBranch::Jin),
            5 => Some(EarthlyBranch::Sa),
            6 => Some(EarthlyBranch::O),
            7 => Some(EarthlyBranch::Mi),
            8 => Some(EarthlyBranch::Sin),
            9 => Some(EarthlyBranch::Yu),
            10 => Some(EarthlyBranch::Sul),
            11 => Some(EarthlyBranch::Hae),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn iter() -> impl Iterator<Item = EarthlyBranch> {
        (0..12).map(EarthlyBranch::from_index).flatten()
    }

    /// Step the branch cycle by `offset` (may be negative).
    pub fn offset(self, offset: i64) -> EarthlyBranch {
        let idx = (self.index() as i64 + offset).rem_euclid(12) as usize;
        EarthlyBranch::from_index(idx).unwrap_or(EarthlyBranch::Ja)
    }

    pub fn element(self) -> Element {
        match self {
            EarthlyBranch::Ja | EarthlyBranch::Hae => Element::Water,
            EarthlyBranch::In | EarthlyBranch::Myo => Element::Wood,
            EarthlyBranch::Sa | EarthlyBranch::O => Element::Fire,
            EarthlyBranch::Sin | EarthlyBranch::Yu => Element::Metal,
            EarthlyBranch::Chuk | EarthlyBranch::Jin | EarthlyBranch::Mi | EarthlyBranch::Sul => {
                Element::Earth
            }
        }
    }

    pub fn polarity(self) -> Polarity {
        if self.index() % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }

    /// The buried-stem (jijanggan) breakdown of this branch, early to main.
    pub fn hidden_stems(self) -> &'static [HiddenStem] {
        HIDDEN_STEM_TABLE[self.index()]
    }

    /// The main (jeonggi) hidden stem, carrying the branch's core quality.
    pub fn main_hidden_stem(self) -> HeavenlyStem {
        self.hidden_stems()
            .iter()
            .find(|h| h.tier == HiddenTier::Main)
            .map(|h| h.stem)
            // every row of the table ends with a Main entry
            .unwrap_or(HeavenlyStem::Gap)
    }

    pub fn hanja(self) -> &'static str {
        match self {
            EarthlyBranch::Ja => "子",
            EarthlyBranch::Chuk => "丑",
            EarthlyBranch::In => "寅",
            EarthlyBranch::Myo => "卯",
            EarthlyBranch::Jin => "辰",
            EarthlyBranch::Sa => "巳",
            EarthlyBranch::O => "午",
            EarthlyBranch::Mi => "未",
            EarthlyBranch::Sin => "申",
            EarthlyBranch::Yu => "酉",
            EarthlyBranch::Sul => "戌",
            EarthlyBranch::Hae => "亥",
        }
    }

    pub fn korean(self) -> &'static str {
        match self {
            EarthlyBranch::Ja => "자",
            EarthlyBranch::Chuk => "축",
            EarthlyBranch::In => "인",
            EarthlyBranch::Myo => "묘",
            EarthlyBranch::Jin => "진",
            EarthlyBranch::Sa => "사",
            EarthlyBranch::O => "오",
            EarthlyBranch::Mi => "미",
            EarthlyBranch::Sin => "신",
            EarthlyBranch::Yu => "유",
            EarthlyBranch::Sul => "술",
            EarthlyBranch::Hae => "해",
        }
    }
}

impl fmt::Display for EarthlyBranch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EarthlyBranch::Ja => "Ja",
            EarthlyBranch::Chuk => "Chuk",
            EarthlyBranch::In => "In",
            EarthlyBranch::Myo => "Myo",
            EarthlyBranch::Jin => "Jin",
            EarthlyBranch::Sa => "Sa",
            EarthlyBranch::O => "O",
            EarthlyBranch::Mi => "Mi",
            EarthlyBranch::Sin => "Sin",
            EarthlyBranch::Yu => "Yu",
            EarthlyBranch::Sul => "Sul",
            EarthlyBranch::Hae => "Hae",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HiddenTier {
    Early,
    Middle,
    Main,
}

impl HiddenTier {
    /// Relative weight of this tier in weighted element tallies.
    pub fn weight(self) -> f64 {
        match self {
            HiddenTier::Early => 0.3,
            HiddenTier::Middle => 0.5,
            HiddenTier::Main => 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HiddenStem {
    pub stem: HeavenlyStem,
    pub tier: HiddenTier,
}

const fn hs(stem: HeavenlyStem, tier: HiddenTier) -> HiddenStem {
    HiddenStem { stem, tier }
}

/// Buried-stem table, indexed by branch (Ja..Hae), each row early → main.
static HIDDEN_STEM_TABLE: [&[HiddenStem]; 12] = [
    // Ja
    &[
        hs(HeavenlyStem::Im, HiddenTier::Early),
        hs(HeavenlyStem::Gye, HiddenTier::Main),
    ],
    // Chuk
    &[
        hs(HeavenlyStem::Gye, HiddenTier::Early),
        hs(HeavenlyStem::Sin, HiddenTier::Middle),
        hs(HeavenlyStem::Gi, HiddenTier::Main),
    ],
    // In
    &[
        hs(HeavenlyStem::Mu, HiddenTier::Early),
        hs(HeavenlyStem::Byeong, HiddenTier::Middle),
        hs(HeavenlyStem::Gap, HiddenTier::Main),
    ],
    // Myo
    &[
        hs(HeavenlyStem::Gap, HiddenTier::Early),
        hs(HeavenlyStem::Eul, HiddenTier::Main),
    ],
    // Jin
    &[
        hs(HeavenlyStem::Eul, HiddenTier::Early),
        hs(HeavenlyStem::Gye, HiddenTier::Middle),
        hs(HeavenlyStem::Mu, HiddenTier::Main),
    ],
    // Sa
    &[
        hs(HeavenlyStem::Mu, HiddenTier::Early),
        hs(HeavenlyStem::Gyeong, HiddenTier::Middle),
        hs(HeavenlyStem::Byeong, HiddenTier::Main),
    ],
    // O
    &[
        hs(HeavenlyStem::Byeong, HiddenTier::Early),
        hs(HeavenlyStem::Gi, HiddenTier::Middle),
        hs(HeavenlyStem::Jeong, HiddenTier::Main),
    ],
    // Mi
    &[
        hs(HeavenlyStem::Jeong, HiddenTier::Early),
        hs(HeavenlyStem::Eul, HiddenTier::Middle),
        hs(HeavenlyStem::Gi, HiddenTier::Main),
    ],
    // Sin
    &[
        hs(HeavenlyStem::Mu, HiddenTier::Early),
        hs(HeavenlyStem::Im, HiddenTier::Middle),
        hs(HeavenlyStem::Gyeong, HiddenTier::Main),
    ],
    // Yu
    &[
        hs(HeavenlyStem::Gyeong, HiddenTier::Early),
        hs(HeavenlyStem::Sin, HiddenTier::Main),
    ],
    // Sul
    &[
        hs(HeavenlyStem::Sin, HiddenTier::Early),
        hs(HeavenlyStem::Jeong, HiddenTier::Middle),
        hs(HeavenlyStem::Mu, HiddenTier::Main),
    ],
    // Hae
    &[
        hs(HeavenlyStem::Mu, HiddenTier::Early),
        hs(HeavenlyStem::Gap, HiddenTier::Middle),
        hs(HeavenlyStem::Im, HiddenTier::Main),
    ],
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalendarType {
    Solar,
    Lunar,
    /// Lunar date falling inside the year's leap month.
    LunarLeap,
}

/// Named chart and cycle slots a pillar can occupy in relation analysis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotId {
    Year,
    Month,
    Day,
    Hour,
    Decade,
    Annual,
    Monthly,
    Daily,
}

impl SlotId {
    pub fn is_natal(self) -> bool {
        matches!(
            self,
            SlotId::Year | SlotId::Month | SlotId::Day | SlotId::Hour
        )
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SlotId::Year => "year",
            SlotId::Month => "month",
            SlotId::Day => "day",
            SlotId::Hour => "hour",
            SlotId::Decade => "decade",
            SlotId::Annual => "annual",
            SlotId::Monthly => "monthly",
            SlotId::Daily => "daily",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------
// ## Structures
// ---------------------------

/// One sexagenary stem–branch pair. Only the 60 parity-matched pairs exist.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pillar {
    pub stem: HeavenlyStem,
    pub branch: EarthlyBranch,
}

/// Napeum element per sexagenary couple (index = sexagenary index / 2).
static NAPEUM_TABLE: [Element; 30] = [
    Element::Metal,
    Element::Fire,
    Element::Wood,
    Element::Earth,
    Element::Metal,
    Element::Fire,
    Element::Water,
    Element::Earth,
    Element::Metal,
    Element::Wood,
    Element::Water,
    Element::Earth,
    Element::Fire,
    Element::Wood,
    Element::Water,
    Element::Metal,
    Element::Fire,
    Element::Wood,
    Element::Earth,
    Element::Metal,
    Element::Fire,
    Element::Water,
    Element::Earth,
    Element::Metal,
    Element::Wood,
    Element::Water,
    Element::Earth,
    Element::Fire,
    Element::Wood,
    Element::Water,
];

impl Pillar {
    /// Builds a pillar, rejecting stem/branch pairs outside the sexagenary cycle.
    pub fn new(stem: HeavenlyStem, branch: EarthlyBranch) -> SajuResult<Pillar> {
        if stem.index() % 2 != branch.index() % 2 {
            return Err(SajuError::InvalidInput(format!(
                "{}-{} is not a sexagenary pair",
                stem, branch
            )));
        }
        Ok(Pillar { stem, branch })
    }

    /// The pillar at position `index` (mod 60) of the sexagenary cycle,
    /// index 0 being Gap-Ja.
    pub fn from_sexagenary_index(index: i64) -> Pillar {
        let idx = index.rem_euclid(60);
        let stem = HeavenlyStem::from_index((idx % 10) as usize).unwrap_or(HeavenlyStem::Gap);
        let branch = EarthlyBranch::from_index((idx % 12) as usize).unwrap_or(EarthlyBranch::Ja);
        Pillar { stem, branch }
    }

    /// Position of this pillar in the sexagenary cycle (0..60).
    pub fn sexagenary_index(self) -> i64 {
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        // solve x ≡ s (mod 10), x ≡ b (mod 12); parity match guarantees a solution
        let d = (b - s).rem_euclid(12);
        let k = (6 - d / 2).rem_euclid(6);
        s + 10 * k
    }

    /// Step this pillar along the 60-cycle.
    pub fn offset(self, offset: i64) -> Pillar {
        Pillar::from_sexagenary_index(self.sexagenary_index() + offset)
    }

    /// The napeum (buried-sound) element of this pillar's sexagenary couple.
    pub fn napeum(self) -> Element {
        NAPEUM_TABLE[(self.sexagenary_index() / 2) as usize]
    }

    pub fn hanja(self) -> String {
        format!("{}{}", self.stem.hanja(), self.branch.hanja())
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.stem, self.branch)
    }
}

/// The four-pillar natal chart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
}

impl Chart {
    /// The day stem, reference point for all relative computations.
    pub fn day_master(&self) -> HeavenlyStem {
        self.day.stem
    }

    pub fn slot(&self, id: SlotId) -> Option<Pillar> {
        match id {
            SlotId::Year => Some(self.year),
            SlotId::Month => Some(self.month),
            SlotId::Day => Some(self.day),
            SlotId::Hour => Some(self.hour),
            _ => None,
        }
    }

    /// The four natal slots in year → hour order.
    pub fn slots(&self) -> [(SlotId, Pillar); 4] {
        [
            (SlotId::Year, self.year),
            (SlotId::Month, self.month),
            (SlotId::Day, self.day),
            (SlotId::Hour, self.hour),
        ]
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthInfo {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// IANA timezone identifier, e.g. "Asia/Seoul".
    pub timezone: String,
    pub calendar: CalendarType,
    pub gender: Gender,
}

impl BirthInfo {
    pub fn chart(&self) -> SajuResult<Chart> {
        calendar::derive_chart(self)
    }

    pub fn generate_report(&self) -> SajuResult<Report> {
        Report::calculate(self)
    }
}

// ---------------------------
// ## Error Handling
// ---------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SajuError {
    /// Malformed or out-of-domain birth data; fatal for chart derivation.
    InvalidInput(String),
    /// A derived key missing from a rule table that should be total.
    LookupMiss(String),
    /// An isolated sub-analysis step failed.
    SubAnalysis(String),
}

impl fmt::Display for SajuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SajuError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            SajuError::LookupMiss(msg) => write!(f, "Lookup Miss: {}", msg),
            SajuError::SubAnalysis(msg) => write!(f, "Sub-Analysis Failure: {}", msg),
        }
    }
}

impl Error for SajuError {}

pub type SajuResult<T> = Result<T, SajuError>;

// ---------------------------
// ## Analysis Bundle
// ---------------------------

/// Per-chart analysis bundle. Every field is computed behind its own
/// failure boundary; an absent field means "not computed", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub pattern: Option<PatternResult>,
    pub favorable: Option<FavorableResult>,
    pub rootedness: Option<RootednessResult>,
    pub seasonal: Option<SeasonalResult>,
    pub sibsin_breakdown: Option<SibsinBreakdown>,
    pub composite: Option<CompositeScore>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AnalysisStep {
    Pattern,
    Favorable,
    Rootedness,
    Seasonal,
    SibsinBreakdown,
}

impl AnalysisBundle {
    pub fn calculate(chart: &Chart) -> AnalysisBundle {
        Self::calculate_impl(chart, None)
    }

    pub(crate) fn calculate_impl(chart: &Chart, forced: Option<AnalysisStep>) -> AnalysisBundle {
        fn guard<T>(
            step: AnalysisStep,
            forced: Option<AnalysisStep>,
            result: SajuResult<T>,
        ) -> Option<T> {
            if forced == Some(step) {
                return None;
            }
            result.ok()
        }

        let rootedness = guard(AnalysisStep::Rootedness, forced, strength::rootedness(chart));
        let seasonal = guard(
            AnalysisStep::Seasonal,
            forced,
            strength::seasonal_support(chart),
        );
        let pattern = guard(
            AnalysisStep::Pattern,
            forced,
            strength::classify_pattern(chart),
        );
        let favorable = guard(
            AnalysisStep::Favorable,
            forced,
            strength::favorable_elements(chart),
        );
        let sibsin_breakdown = guard(
            AnalysisStep::SibsinBreakdown,
            forced,
            strength::sibsin_breakdown(chart),
        );

        let composite = score::composite_score(
            chart,
            rootedness.as_ref(),
            seasonal.as_ref(),
            pattern.as_ref(),
            favorable.as_ref(),
        );

        AnalysisBundle {
            pattern,
            favorable,
            rootedness,
            seasonal,
            sibsin_breakdown,
            composite,
        }
    }
}

// ---------------------------
// ## Report
// ---------------------------

/// Full per-birth report: chart, decade cycle anchored to it, relation hits
/// over the natal slots, shinsal markers, per-slot labels and the analysis
/// bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub birth_info: BirthInfo,
    pub chart: Chart,
    pub decade_cycle: DecadeCycle,
    pub relations: Vec<RelationHit>,
    pub shinsal: Vec<ShinsalHit>,
    pub life_stages: Vec<(SlotId, LifeStage)>,
    pub sibsin: Vec<(SlotId, Sibsin)>,
    pub element_tally: ElementTally,
    pub analysis: AnalysisBundle,
}

impl Report {
    pub fn calculate(birth_info: &BirthInfo) -> SajuResult<Report> {
        let chart = calendar::derive_chart(birth_info)?;
        let decade_cycle = cycles::decade_cycle(birth_info, &chart)?;

        let slots = chart.slots();
        let relations = relations::analyze(&slots);
        let shinsal = shinsal::detect_shinsal(&chart, &slots, &ShinsalOptions::default());

        let day_master = chart.day_master();
        let life_stages = slots
            .iter()
            .map(|&(id, p)| (id, relations::life_stage_of(day_master, p.branch)))
            .collect();
        let sibsin = slots
            .iter()
            .map(|&(id, p)| (id, relations::sibsin_of(day_master, p.stem)))
            .collect();

        let element_tally = strength::element_tally(&chart);
        let analysis = AnalysisBundle::calculate(&chart);

        Ok(Report {
            birth_info: birth_info.clone(),
            chart,
            decade_cycle,
            relations,
            shinsal,
            life_stages,
            sibsin,
            element_tally,
            analysis,
        })
    }
}

/// Convenience wrapper producing the full report for a birth.
pub fn generate_saju_report(birth_info: &BirthInfo) -> SajuResult<Report> {
    Report::calculate(birth_info)
}

// ---------------------------
// ## Tests
// ---------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_birth() -> BirthInfo {
        BirthInfo {
            date: NaiveDate::from_ymd_opt(1991, 6, 18).unwrap(),
            time: NaiveTime::from_hms_opt(7, 10, 0).unwrap(),
            timezone: "Asia/Seoul".to_string(),
            calendar: CalendarType::Solar,
            gender: Gender::Male,
        }
    }

    #[test]
    fn sexagenary_index_round_trips() {
        for i in 0..60 {
            let p = Pillar::from_sexagenary_index(i);
            assert_eq!(p.sexagenary_index(), i);
            assert_eq!(p.stem.index() % 2, p.branch.index() % 2);
        }
    }

    #[test]
    fn pillar_rejects_parity_mismatch() {
        let bad = Pillar::new(HeavenlyStem::Gap, EarthlyBranch::Chuk);
        assert!(matches!(bad, Err(SajuError::InvalidInput(_))));
        let good = Pillar::new(HeavenlyStem::Gap, EarthlyBranch::Ja);
        assert!(good.is_ok());
    }

    #[test]
    fn gap_ja_is_index_zero() {
        let p = Pillar {
            stem: HeavenlyStem::Gap,
            branch: EarthlyBranch::Ja,
        };
        assert_eq!(p.sexagenary_index(), 0);
        // Gye-Hae closes the cycle
        let last = Pillar {
            stem: HeavenlyStem::Gye,
            branch: EarthlyBranch::Hae,
        };
        assert_eq!(last.sexagenary_index(), 59);
    }

    #[test]
    fn hidden_stem_table_rows_end_in_main() {
        for branch in EarthlyBranch::iter() {
            let row = branch.hidden_stems();
            assert!(!row.is_empty());
            assert_eq!(row.last().unwrap().tier, HiddenTier::Main);
            // the main hidden stem shares the branch element
            assert_eq!(branch.main_hidden_stem().element(), branch.element());
        }
    }

    #[test]
    fn napeum_pairs_share_an_element() {
        for i in 0..60 {
            let p = Pillar::from_sexagenary_index(i);
            let sibling = Pillar::from_sexagenary_index(i ^ 1);
            assert_eq!(p.napeum(), sibling.napeum());
        }
    }

    #[test]
    fn report_is_idempotent() {
        let birth = sample_birth();
        let a = Report::calculate(&birth).unwrap();
        let b = Report::calculate(&birth).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fault_isolation_nulls_only_the_failed_step() {
        let chart = sample_birth().chart().unwrap();
        let bundle = AnalysisBundle::calculate_impl(&chart, Some(AnalysisStep::Pattern));
        assert!(bundle.pattern.is_none());
        assert!(bundle.rootedness.is_some());
        assert!(bundle.seasonal.is_some());
        assert!(bundle.favorable.is_some());
        assert!(bundle.sibsin_breakdown.is_some());
        // composite requires the pattern sub-score, so it is absent too
        assert!(bundle.composite.is_none());

        let full = AnalysisBundle::calculate(&chart);
        assert!(full.pattern.is_some());
        assert!(full.composite.is_some());
    }
}
