// src/score.rs
//
// Composite chart score: a 0..=100 blend of rootedness, seasonal
// standing, pattern purity and how well the chart already supplies its
// own favorable elements. Absent inputs make the composite absent; a
// failed sub-analysis is never scored as zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::*;
use crate::strength::{
    element_tally, FavorableResult, PatternResult, RootednessResult, SeasonalResult,
};

/// Component weights; they sum to 100.
const WEIGHT_ROOTEDNESS: f64 = 30.0;
const WEIGHT_SEASONAL: f64 = 20.0;
const WEIGHT_PURITY: f64 = 25.0;
const WEIGHT_YONGSIN_FIT: f64 = 25.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Exceptional,
    Strong,
    Balanced,
    Developing,
    Challenging,
}

impl Grade {
    pub fn from_score(score: f64) -> Grade {
        if score >= 90.0 {
            Grade::Exceptional
        } else if score >= 75.0 {
            Grade::Strong
        } else if score >= 55.0 {
            Grade::Balanced
        } else if score >= 35.0 {
            Grade::Developing
        } else {
            Grade::Challenging
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Grade::Exceptional => "Exceptional",
            Grade::Strong => "Strong",
            Grade::Balanced => "Balanced",
            Grade::Developing => "Developing",
            Grade::Challenging => "Challenging",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: f64,
    pub grade: Grade,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Weighted share of the favorable elements already present in the chart,
/// 0..=1.
fn yongsin_fit(chart: &Chart, favorable: &FavorableResult) -> f64 {
    let tally = element_tally(chart);
    let total = tally.weighted_total();
    if total <= 0.0 {
        return 0.0;
    }
    let present: f64 = favorable
        .yongsin
        .iter()
        .map(|&e| tally.weighted_of(e))
        .sum();
    (present / total).min(1.0)
}

pub fn composite_score(
    chart: &Chart,
    rootedness: Option<&RootednessResult>,
    seasonal: Option<&SeasonalResult>,
    pattern: Option<&PatternResult>,
    favorable: Option<&FavorableResult>,
) -> Option<CompositeScore> {
    let root = rootedness?;
    let seasonal = seasonal?;
    let pattern = pattern?;
    let favorable = favorable?;

    let fit = yongsin_fit(chart, favorable);
    let score = WEIGHT_ROOTEDNESS * (root.score / 10.0)
        + WEIGHT_SEASONAL * seasonal.support
        + WEIGHT_PURITY * pattern.purity
        + WEIGHT_YONGSIN_FIT * fit;
    let score = score.clamp(0.0, 100.0);

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    if root.score >= 6.0 {
        strengths.push(format!(
            "day master firmly rooted (score {:.1})",
            root.score
        ));
    } else if root.score < 3.0 {
        weaknesses.push("day master has little or no root in the branches".to_string());
    }

    if seasonal.support >= 1.0 {
        strengths.push("born in the day master's own season".to_string());
    } else if seasonal.support <= 0.0 {
        weaknesses.push(format!(
            "the {} month gives the day master no seasonal support",
            seasonal.month_element
        ));
    }

    if pattern.purity >= 0.35 {
        strengths.push(format!(
            "clear {:?} pattern ({} dominant)",
            pattern.pattern, pattern.dominant
        ));
    }

    if fit < 0.25 {
        weaknesses.push("favorable elements are scarce in the natal chart".to_string());
    }
    if let Some(first) = favorable.yongsin.first() {
        recommendations.push(format!("strengthen {} influences", first));
    }
    if let Some(j) = favorable.johu {
        recommendations.push(format!(
            "the birth season calls for {} above all",
            j.primary
        ));
    }

    Some(CompositeScore {
        grade: Grade::from_score(score),
        score,
        strengths,
        weaknesses,
        recommendations,
    })
}
