// src/relations.rs
//
// Pairwise and triple relation rules over named pillar slots, plus the two
// reference-stem mappings: ten relations (sibsin) and twelve life stages
// (unseong). All rule tables are fixed data; detection is a scan of the
// slot set against them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::*;

// ---------------------------
// ## Relation Kinds & Hits
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Yukhap, the six two-branch combinations.
    SixCombination,
    /// Samhap with all three branches present.
    ThreeHarmony,
    /// Samhap with only two of the three branches present.
    PartialThreeHarmony,
    /// Chung, the six opposition clashes.
    Clash,
    /// Hyeong between two distinct branches.
    Punishment,
    /// Hyeong of a branch against its own duplicate.
    SelfPunishment,
    /// Hae.
    Harm,
    /// Pa.
    Destruction,
    /// The five heavenly-stem combinations.
    StemCombination,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RelationKind::SixCombination => "six-combination",
            RelationKind::ThreeHarmony => "three-harmony",
            RelationKind::PartialThreeHarmony => "partial three-harmony",
            RelationKind::Clash => "clash",
            RelationKind::Punishment => "punishment",
            RelationKind::SelfPunishment => "self-punishment",
            RelationKind::Harm => "harm",
            RelationKind::Destruction => "destruction",
            RelationKind::StemCombination => "stem-combination",
        };
        write!(f, "{}", name)
    }
}

/// Canonical display order for relation hits. The hit vector itself is
/// unordered; consumers wanting a stable presentation sort by this list.
pub static RELATION_DISPLAY_PRIORITY: [RelationKind; 9] = [
    RelationKind::ThreeHarmony,
    RelationKind::SixCombination,
    RelationKind::StemCombination,
    RelationKind::Clash,
    RelationKind::Punishment,
    RelationKind::SelfPunishment,
    RelationKind::Harm,
    RelationKind::Destruction,
    RelationKind::PartialThreeHarmony,
];

/// One detected relation among the analyzed slots. `target` carries the
/// transformed element where the rule defines one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationHit {
    pub kind: RelationKind,
    pub slots: Vec<SlotId>,
    pub target: Option<Element>,
    pub detail: Option<String>,
}

// ---------------------------
// ## Fixed Relation Tables
// ---------------------------

static YUKHAP: [(EarthlyBranch, EarthlyBranch, Element); 6] = [
    (EarthlyBranch::Ja, EarthlyBranch::Chuk, Element::Earth),
    (EarthlyBranch::In, EarthlyBranch::Hae, Element::Wood),
    (EarthlyBranch::Myo, EarthlyBranch::Sul, Element::Fire),
    (EarthlyBranch::Jin, EarthlyBranch::Yu, Element::Metal),
    (EarthlyBranch::Sa, EarthlyBranch::Sin, Element::Water),
    (EarthlyBranch::O, EarthlyBranch::Mi, Element::Fire),
];

static CHUNG: [(EarthlyBranch, EarthlyBranch); 6] = [
    (EarthlyBranch::Ja, EarthlyBranch::O),
    (EarthlyBranch::Chuk, EarthlyBranch::Mi),
    (EarthlyBranch::In, EarthlyBranch::Sin),
    (EarthlyBranch::Myo, EarthlyBranch::Yu),
    (EarthlyBranch::Jin, EarthlyBranch::Sul),
    (EarthlyBranch::Sa, EarthlyBranch::Hae),
];

/// Two-branch punishments with their traditional group label.
static HYEONG: [(EarthlyBranch, EarthlyBranch, &str); 7] = [
    (EarthlyBranch::In, EarthlyBranch::Sa, "ungrateful"),
    (EarthlyBranch::Sa, EarthlyBranch::Sin, "ungrateful"),
    (EarthlyBranch::In, EarthlyBranch::Sin, "ungrateful"),
    (EarthlyBranch::Chuk, EarthlyBranch::Sul, "bullying"),
    (EarthlyBranch::Sul, EarthlyBranch::Mi, "bullying"),
    (EarthlyBranch::Chuk, EarthlyBranch::Mi, "bullying"),
    (EarthlyBranch::Ja, EarthlyBranch::Myo, "rude"),
];

/// Branches that punish their own duplicate.
static SELF_PUNISHING: [EarthlyBranch; 4] = [
    EarthlyBranch::Jin,
    EarthlyBranch::O,
    EarthlyBranch::Yu,
    EarthlyBranch::Hae,
];

static HAE: [(EarthlyBranch, EarthlyBranch); 6] = [
    (EarthlyBranch::Ja, EarthlyBranch::Mi),
    (EarthlyBranch::Chuk, EarthlyBranch::O),
    (EarthlyBranch::In, EarthlyBranch::Sa),
    (EarthlyBranch::Myo, EarthlyBranch::Jin),
    (EarthlyBranch::Sin, EarthlyBranch::Hae),
    (EarthlyBranch::Yu, EarthlyBranch::Sul),
];

static PA: [(EarthlyBranch, EarthlyBranch); 6] = [
    (EarthlyBranch::Ja, EarthlyBranch::Yu),
    (EarthlyBranch::Chuk, EarthlyBranch::Jin),
    (EarthlyBranch::In, EarthlyBranch::Hae),
    (EarthlyBranch::Myo, EarthlyBranch::O),
    (EarthlyBranch::Sa, EarthlyBranch::Sin),
    (EarthlyBranch::Sul, EarthlyBranch::Mi),
];

/// The four three-harmony trines with their transformed element. The trine
/// order is growth → peak → storage.
pub(crate) static SAMHAP: [([EarthlyBranch; 3], Element); 4] = [
    (
        [EarthlyBranch::In, EarthlyBranch::O, EarthlyBranch::Sul],
        Element::Fire,
    ),
    (
        [EarthlyBranch::Sa, EarthlyBranch::Yu, EarthlyBranch::Chuk],
        Element::Metal,
    ),
    (
        [EarthlyBranch::Sin, EarthlyBranch::Ja, EarthlyBranch::Jin],
        Element::Water,
    ),
    (
        [EarthlyBranch::Hae, EarthlyBranch::Myo, EarthlyBranch::Mi],
        Element::Wood,
    ),
];

static STEM_HAP: [(HeavenlyStem, HeavenlyStem, Element); 5] = [
    (HeavenlyStem::Gap, HeavenlyStem::Gi, Element::Earth),
    (HeavenlyStem::Eul, HeavenlyStem::Gyeong, Element::Metal),
    (HeavenlyStem::Byeong, HeavenlyStem::Sin, Element::Water),
    (HeavenlyStem::Jeong, HeavenlyStem::Im, Element::Wood),
    (HeavenlyStem::Mu, HeavenlyStem::Gye, Element::Fire),
];

fn pair_matches<T: PartialEq + Copy>(table_a: T, table_b: T, a: T, b: T) -> bool {
    (table_a == a && table_b == b) || (table_a == b && table_b == a)
}

// ---------------------------
// ## Relation Detection
// ---------------------------

/// Scans every unordered slot pair (and the samhap triples) against the
/// relation tables. The slot list is whatever the caller passes: the four
/// natal slots, optionally extended with active cycle slots.
pub fn analyze(slots: &[(SlotId, Pillar)]) -> Vec<RelationHit> {
    let mut hits = Vec::new();

    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            let (id_a, pa) = slots[i];
            let (id_b, pb) = slots[j];
            let (ba, bb) = (pa.branch, pb.branch);

            // same-branch duplicates go to the dedicated sub-table, never
            // silently skipped
            if ba == bb {
                if SELF_PUNISHING.contains(&ba) {
                    hits.push(RelationHit {
                        kind: RelationKind::SelfPunishment,
                        slots: vec![id_a, id_b],
                        target: None,
                        detail: Some(format!("{} repeated", ba)),
                    });
                }
                // fall through: a duplicated branch can still clash etc.
            }

            if let Some(&(_, _, element)) = YUKHAP
                .iter()
                .find(|&&(x, y, _)| pair_matches(x, y, ba, bb))
            {
                hits.push(RelationHit {
                    kind: RelationKind::SixCombination,
                    slots: vec![id_a, id_b],
                    target: Some(element),
                    detail: None,
                });
            }

            if CHUNG.iter().any(|&(x, y)| pair_matches(x, y, ba, bb)) {
                hits.push(RelationHit {
                    kind: RelationKind::Clash,
                    slots: vec![id_a, id_b],
                    target: None,
                    detail: None,
                });
            }

            if let Some(&(_, _, label)) = HYEONG
                .iter()
                .find(|&&(x, y, _)| pair_matches(x, y, ba, bb))
            {
                hits.push(RelationHit {
                    kind: RelationKind::Punishment,
                    slots: vec![id_a, id_b],
                    target: None,
                    detail: Some(label.to_string()),
                });
            }

            if HAE.iter().any(|&(x, y)| pair_matches(x, y, ba, bb)) {
                hits.push(RelationHit {
                    kind: RelationKind::Harm,
                    slots: vec![id_a, id_b],
                    target: None,
                    detail: None,
                });
            }

            if PA.iter().any(|&(x, y)| pair_matches(x, y, ba, bb)) {
                hits.push(RelationHit {
                    kind: RelationKind::Destruction,
                    slots: vec![id_a, id_b],
                    target: None,
                    detail: None,
                });
            }

            let (sa, sb) = (pa.stem, pb.stem);
            if let Some(&(_, _, element)) = STEM_HAP
                .iter()
                .find(|&&(x, y, _)| pair_matches(x, y, sa, sb))
            {
                hits.push(RelationHit {
                    kind: RelationKind::StemCombination,
                    slots: vec![id_a, id_b],
                    target: Some(element),
                    detail: None,
                });
            }
        }
    }

    // samhap triples; two of three present is recorded as a lower-
    // confidence partial hit by policy
    for &(trine, element) in SAMHAP.iter() {
        let mut present: Vec<SlotId> = Vec::new();
        let mut distinct: Vec<EarthlyBranch> = Vec::new();
        for &(id, p) in slots {
            if trine.contains(&p.branch) {
                present.push(id);
                if !distinct.contains(&p.branch) {
                    distinct.push(p.branch);
                }
            }
        }
        match distinct.len() {
            3 => hits.push(RelationHit {
                kind: RelationKind::ThreeHarmony,
                slots: present,
                target: Some(element),
                detail: None,
            }),
            2 => hits.push(RelationHit {
                kind: RelationKind::PartialThreeHarmony,
                slots: present,
                target: Some(element),
                detail: Some(format!(
                    "missing {}",
                    trine
                        .iter()
                        .find(|b| !distinct.contains(b))
                        .copied()
                        .unwrap_or(trine[0])
                )),
            }),
            _ => {}
        }
    }

    hits
}

// ---------------------------
// ## Ten Relations (Sibsin)
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sibsin {
    Bigyeon,
    Geopjae,
    Siksin,
    Sanggwan,
    Pyeonjae,
    Jeongjae,
    Pyeongwan,
    Jeonggwan,
    Pyeonin,
    Jeongin,
}

impl Sibsin {
    pub fn iter() -> impl Iterator<Item = Sibsin> {
        [
            Sibsin::Bigyeon,
            Sibsin::Geopjae,
            Sibsin::Siksin,
            Sibsin::Sanggwan,
            Sibsin::Pyeonjae,
            Sibsin::Jeongjae,
            Sibsin::Pyeongwan,
            Sibsin::Jeonggwan,
            Sibsin::Pyeonin,
            Sibsin::Jeongin,
        ]
        .iter()
        .copied()
    }

    pub fn english(self) -> &'static str {
        match self {
            Sibsin::Bigyeon => "Friend",
            Sibsin::Geopjae => "Rob Wealth",
            Sibsin::Siksin => "Eating God",
            Sibsin::Sanggwan => "Hurting Officer",
            Sibsin::Pyeonjae => "Indirect Wealth",
            Sibsin::Jeongjae => "Direct Wealth",
            Sibsin::Pyeongwan => "Seven Killings",
            Sibsin::Jeonggwan => "Direct Officer",
            Sibsin::Pyeonin => "Indirect Resource",
            Sibsin::Jeongin => "Direct Resource",
        }
    }
}

impl fmt::Display for Sibsin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Sibsin::Bigyeon => "Bigyeon",
            Sibsin::Geopjae => "Geopjae",
            Sibsin::Siksin => "Siksin",
            Sibsin::Sanggwan => "Sanggwan",
            Sibsin::Pyeonjae => "Pyeonjae",
            Sibsin::Jeongjae => "Jeongjae",
            Sibsin::Pyeongwan => "Pyeongwan",
            Sibsin::Jeonggwan => "Jeonggwan",
            Sibsin::Pyeonin => "Pyeonin",
            Sibsin::Jeongin => "Jeongin",
        };
        write!(f, "{}", name)
    }
}

/// The ten-relation label of `other` relative to `reference` (normally the
/// day master): the five-element relation picks the pair, the polarity
/// match picks between its two labels. Total over all 10×10 stem pairs.
pub fn sibsin_of(reference: HeavenlyStem, other: HeavenlyStem) -> Sibsin {
    let same_polarity = reference.polarity() == other.polarity();
    let re = reference.element();
    let oe = other.element();

    if oe == re {
        if same_polarity {
            Sibsin::Bigyeon
        } else {
            Sibsin::Geopjae
        }
    } else if re.generates() == oe {
        if same_polarity {
            Sibsin::Siksin
        } else {
            Sibsin::Sanggwan
        }
    } else if re.controls() == oe {
        if same_polarity {
            Sibsin::Pyeonjae
        } else {
            Sibsin::Jeongjae
        }
    } else if oe.controls() == re {
        if same_polarity {
            Sibsin::Pyeongwan
        } else {
            Sibsin::Jeonggwan
        }
    } else {
        // the only remaining relation: other generates reference
        if same_polarity {
            Sibsin::Pyeonin
        } else {
            Sibsin::Jeongin
        }
    }
}

// ---------------------------
// ## Twelve Life Stages
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    Jangsaeng,
    Mogyok,
    Gwandae,
    Geonnok,
    Jewang,
    Soe,
    Byeong,
    Sa,
    Myo,
    Jeol,
    Tae,
    Yang,
}

impl LifeStage {
    pub fn from_index(index: usize) -> Option<LifeStage> {
        match index {
            0 => Some(LifeStage::Jangsaeng),
            1 => Some(LifeStage::Mogyok),
            2 => Some(LifeStage::Gwandae),
            3 => Some(LifeStage::Geonnok),
            4 => Some(LifeStage::Jewang),
            5 => Some(LifeStage::Soe),
            6 => Some(LifeStage::Byeong),
            7 => Some(LifeStage::Sa),
            8 => Some(LifeStage::Myo),
            9 => Some(LifeStage::Jeol),
            10 => Some(LifeStage::Tae),
            11 => Some(LifeStage::Yang),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LifeStage::Jangsaeng => "Jangsaeng",
            LifeStage::Mogyok => "Mogyok",
            LifeStage::Gwandae => "Gwandae",
            LifeStage::Geonnok => "Geonnok",
            LifeStage::Jewang => "Jewang",
            LifeStage::Soe => "Soe",
            LifeStage::Byeong => "Byeong",
            LifeStage::Sa => "Sa",
            LifeStage::Myo => "Myo",
            LifeStage::Jeol => "Jeol",
            LifeStage::Tae => "Tae",
            LifeStage::Yang => "Yang",
        };
        write!(f, "{}", name)
    }
}

/// The branch at which each stem enters Jangsaeng.
static JANGSAENG_BRANCH: [(HeavenlyStem, EarthlyBranch); 10] = [
    (HeavenlyStem::Gap, EarthlyBranch::Hae),
    (HeavenlyStem::Eul, EarthlyBranch::O),
    (HeavenlyStem::Byeong, EarthlyBranch::In),
    (HeavenlyStem::Jeong, EarthlyBranch::Yu),
    (HeavenlyStem::Mu, EarthlyBranch::In),
    (HeavenlyStem::Gi, EarthlyBranch::Yu),
    (HeavenlyStem::Gyeong, EarthlyBranch::Sa),
    (HeavenlyStem::Sin, EarthlyBranch::Ja),
    (HeavenlyStem::Im, EarthlyBranch::Sin),
    (HeavenlyStem::Gye, EarthlyBranch::Myo),
];

/// The twelve-life-stage label of `branch` for the reference stem: yang
/// stems walk the branch cycle forward from their Jangsaeng branch, yin
/// stems walk it backward.
pub fn life_stage_of(stem: HeavenlyStem, branch: EarthlyBranch) -> LifeStage {
    let start = JANGSAENG_BRANCH
        .iter()
        .find(|&&(s, _)| s == stem)
        .map(|&(_, b)| b)
        // the table is total over the ten stems
        .unwrap_or(EarthlyBranch::Hae);

    let b = branch.index() as i64;
    let s = start.index() as i64;
    let idx = match stem.polarity() {
        Polarity::Yang => (b - s).rem_euclid(12),
        Polarity::Yin => (s - b).rem_euclid(12),
    };
    LifeStage::from_index(idx as usize).unwrap_or(LifeStage::Jangsaeng)
}

// ---------------------------
// ## Tests
// ---------------------------
