// src/shinsal.rs
//
// Shinsal markers: the twelve-star cycle anchored at a basis branch's
// three-harmony storage, plus the standalone stem- and pillar-keyed
// markers. Detection is table-driven; options pick the basis convention
// and the marker families to include.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::*;
use crate::relations::SAMHAP;

// ---------------------------
// ## Marker Catalogue
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shinsal {
    // the twelve-star cycle, in order from the branch after the storage
    Geopsal,
    Jaesal,
    Cheonsal,
    Jisal,
    /// Also known as Dohwa, the peach-blossom star.
    Nyeonsal,
    Wolsal,
    Mangsinsal,
    Jangseongsal,
    Banansal,
    Yeokmasal,
    Yukhaesal,
    Hwagaesal,
    // stem-keyed markers
    CheoneulGwiin,
    Munchang,
    Yangin,
    // day-pillar and pillar-set markers
    Goegang,
    Baekho,
}

impl Shinsal {
    /// Whether tradition reads this marker as auspicious.
    pub fn is_lucky(self) -> bool {
        matches!(
            self,
            Shinsal::CheoneulGwiin
                | Shinsal::Munchang
                | Shinsal::Jangseongsal
                | Shinsal::Hwagaesal
        )
    }
}

impl fmt::Display for Shinsal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Shinsal::Geopsal => "Geopsal",
            Shinsal::Jaesal => "Jaesal",
            Shinsal::Cheonsal => "Cheonsal",
            Shinsal::Jisal => "Jisal",
            Shinsal::Nyeonsal => "Nyeonsal",
            Shinsal::Wolsal => "Wolsal",
            Shinsal::Mangsinsal => "Mangsinsal",
            Shinsal::Jangseongsal => "Jangseongsal",
            Shinsal::Banansal => "Banansal",
            Shinsal::Yeokmasal => "Yeokmasal",
            Shinsal::Yukhaesal => "Yukhaesal",
            Shinsal::Hwagaesal => "Hwagaesal",
            Shinsal::CheoneulGwiin => "Cheoneul-gwiin",
            Shinsal::Munchang => "Munchang",
            Shinsal::Yangin => "Yangin",
            Shinsal::Goegang => "Goegang",
            Shinsal::Baekho => "Baekho",
        };
        write!(f, "{}", name)
    }
}

static TWELVE_STARS: [Shinsal; 12] = [
    Shinsal::Geopsal,
    Shinsal::Jaesal,
    Shinsal::Cheonsal,
    Shinsal::Jisal,
    Shinsal::Nyeonsal,
    Shinsal::Wolsal,
    Shinsal::Mangsinsal,
    Shinsal::Jangseongsal,
    Shinsal::Banansal,
    Shinsal::Yeokmasal,
    Shinsal::Yukhaesal,
    Shinsal::Hwagaesal,
];

/// Noble-person branches per day stem.
static CHEONEUL_GWIIN: [(HeavenlyStem, [EarthlyBranch; 2]); 10] = [
    (HeavenlyStem::Gap, [EarthlyBranch::Chuk, EarthlyBranch::Mi]),
    (HeavenlyStem::Eul, [EarthlyBranch::Ja, EarthlyBranch::Sin]),
    (HeavenlyStem::Byeong, [EarthlyBranch::Hae, EarthlyBranch::Yu]),
    (HeavenlyStem::Jeong, [EarthlyBranch::Hae, EarthlyBranch::Yu]),
    (HeavenlyStem::Mu, [EarthlyBranch::Chuk, EarthlyBranch::Mi]),
    (HeavenlyStem::Gi, [EarthlyBranch::Ja, EarthlyBranch::Sin]),
    (HeavenlyStem::Gyeong, [EarthlyBranch::Chuk, EarthlyBranch::Mi]),
    (HeavenlyStem::Sin, [EarthlyBranch::In, EarthlyBranch::O]),
    (HeavenlyStem::Im, [EarthlyBranch::Myo, EarthlyBranch::Sa]),
    (HeavenlyStem::Gye, [EarthlyBranch::Myo, EarthlyBranch::Sa]),
];

/// Literary-star branch per day stem.
static MUNCHANG: [(HeavenlyStem, EarthlyBranch); 10] = [
    (HeavenlyStem::Gap, EarthlyBranch::Sa),
    (HeavenlyStem::Eul, EarthlyBranch::O),
    (HeavenlyStem::Byeong, EarthlyBranch::Sin),
    (HeavenlyStem::Jeong, EarthlyBranch::Yu),
    (HeavenlyStem::Mu, EarthlyBranch::Sin),
    (HeavenlyStem::Gi, EarthlyBranch::Yu),
    (HeavenlyStem::Gyeong, EarthlyBranch::Hae),
    (HeavenlyStem::Sin, EarthlyBranch::Ja),
    (HeavenlyStem::Im, EarthlyBranch::In),
    (HeavenlyStem::Gye, EarthlyBranch::Myo),
];

/// Blade-star branch, defined for yang day stems only.
static YANGIN: [(HeavenlyStem, EarthlyBranch); 5] = [
    (HeavenlyStem::Gap, EarthlyBranch::Myo),
    (HeavenlyStem::Byeong, EarthlyBranch::O),
    (HeavenlyStem::Mu, EarthlyBranch::O),
    (HeavenlyStem::Gyeong, EarthlyBranch::Yu),
    (HeavenlyStem::Im, EarthlyBranch::Ja),
];

/// Day pillars counted as Goegang.
static GOEGANG_DAYS: [(HeavenlyStem, EarthlyBranch); 4] = [
    (HeavenlyStem::Gyeong, EarthlyBranch::Jin),
    (HeavenlyStem::Gyeong, EarthlyBranch::Sul),
    (HeavenlyStem::Im, EarthlyBranch::Jin),
    (HeavenlyStem::Mu, EarthlyBranch::Sul),
];

/// Pillars counted as Baekho wherever they appear.
static BAEKHO_PILLARS: [(HeavenlyStem, EarthlyBranch); 7] = [
    (HeavenlyStem::Gap, EarthlyBranch::Jin),
    (HeavenlyStem::Eul, EarthlyBranch::Mi),
    (HeavenlyStem::Byeong, EarthlyBranch::Sul),
    (HeavenlyStem::Jeong, EarthlyBranch::Chuk),
    (HeavenlyStem::Mu, EarthlyBranch::Jin),
    (HeavenlyStem::Im, EarthlyBranch::Sul),
    (HeavenlyStem::Gye, EarthlyBranch::Chuk),
];

// ---------------------------
// ## Options & Hits
// ---------------------------

/// Which branch anchors the twelve-star cycle. Both conventions are in
/// live use; `Both` runs them and deduplicates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShinsalRuleSet {
    YearBranch,
    DayBranch,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShinsalOptions {
    pub rule_set: ShinsalRuleSet,
    pub twelve_stars: bool,
    pub general_markers: bool,
}

impl Default for ShinsalOptions {
    fn default() -> ShinsalOptions {
        ShinsalOptions {
            rule_set: ShinsalRuleSet::Both,
            twelve_stars: true,
            general_markers: true,
        }
    }
}

/// One detected marker on one slot. `basis` names the anchoring slot for
/// twelve-star hits and is absent for the standalone markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShinsalHit {
    pub shinsal: Shinsal,
    pub slot: SlotId,
    pub basis: Option<SlotId>,
    pub lucky: bool,
}

// ---------------------------
// ## Detection
// ---------------------------

/// The storage branch of the three-harmony trine containing `branch`.
fn trine_storage(branch: EarthlyBranch) -> EarthlyBranch {
    SAMHAP
        .iter()
        .find(|(trine, _)| trine.contains(&branch))
        .map(|(trine, _)| trine[2])
        // every branch belongs to exactly one trine
        .unwrap_or(EarthlyBranch::Jin)
}

/// The twelve-star marker of `target` as seen from `basis`. The cycle
/// starts at the branch after the basis trine's storage (Geopsal) and ends
/// on the storage itself (Hwagaesal).
pub fn twelve_star_of(basis: EarthlyBranch, target: EarthlyBranch) -> Shinsal {
    let storage = trine_storage(basis);
    let first = storage.offset(1);
    let idx = (target.index() as i64 - first.index() as i64).rem_euclid(12) as usize;
    TWELVE_STARS[idx]
}

fn push_hit(hits: &mut Vec<ShinsalHit>, shinsal: Shinsal, slot: SlotId, basis: Option<SlotId>) {
    let hit = ShinsalHit {
        shinsal,
        slot,
        basis,
        lucky: shinsal.is_lucky(),
    };
    if !hits.contains(&hit) {
        hits.push(hit);
    }
}

/// Scans the slots for markers. The slot list is the caller's choice, as
/// with relation analysis; the day master and day branch come from the
/// chart regardless of which slots are passed.
pub fn detect_shinsal(
    chart: &Chart,
    slots: &[(SlotId, Pillar)],
    options: &ShinsalOptions,
) -> Vec<ShinsalHit> {
    let mut hits = Vec::new();

    if options.twelve_stars {
        let bases: Vec<(SlotId, EarthlyBranch)> = match options.rule_set {
            ShinsalRuleSet::YearBranch => vec![(SlotId::Year, chart.year.branch)],
            ShinsalRuleSet::DayBranch => vec![(SlotId::Day, chart.day.branch)],
            ShinsalRuleSet::Both => vec![
                (SlotId::Year, chart.year.branch),
                (SlotId::Day, chart.day.branch),
            ],
        };
        for (basis_slot, basis_branch) in bases {
            for &(slot, pillar) in slots {
                if slot == basis_slot {
                    continue;
                }
                let star = twelve_star_of(basis_branch, pillar.branch);
                push_hit(&mut hits, star, slot, Some(basis_slot));
            }
        }
    }

    if options.general_markers {
        let day_master = chart.day_master();

        if let Some(&(_, branches)) = CHEONEUL_GWIIN.iter().find(|&&(s, _)| s == day_master) {
            for &(slot, pillar) in slots {
                if branches.contains(&pillar.branch) {
                    push_hit(&mut hits, Shinsal::CheoneulGwiin, slot, None);
                }
            }
        }

        if let Some(&(_, branch)) = MUNCHANG.iter().find(|&&(s, _)| s == day_master) {
            for &(slot, pillar) in slots {
                if pillar.branch == branch {
                    push_hit(&mut hits, Shinsal::Munchang, slot, None);
                }
            }
        }

        if let Some(&(_, branch)) = YANGIN.iter().find(|&&(s, _)| s == day_master) {
            for &(slot, pillar) in slots {
                if pillar.branch == branch {
                    push_hit(&mut hits, Shinsal::Yangin, slot, None);
                }
            }
        }

        if GOEGANG_DAYS
            .iter()
            .any(|&(s, b)| s == chart.day.stem && b == chart.day.branch)
        {
            push_hit(&mut hits, Shinsal::Goegang, SlotId::Day, None);
        }

        for &(slot, pillar) in slots {
            if BAEKHO_PILLARS
                .iter()
                .any(|&(s, b)| s == pillar.stem && b == pillar.branch)
            {
                push_hit(&mut hits, Shinsal::Baekho, slot, None);
            }
        }
    }

    hits
}

// ---------------------------
// ## Tests
// ---------------------------
