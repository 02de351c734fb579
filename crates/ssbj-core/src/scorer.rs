//! # Maturity Scorer
//!
//! Pure functions mapping per-criterion maturity scores (0-5) to percentage
//! maturity per pillar, per category and overall.
//!
//! A mean maturity `m` is scaled as `m / 5 * 100`. All arithmetic is integer;
//! results are `Percentage` values rounded half-up to one decimal.

use crate::catalog::{CRITERIA, CriterionDefinition};
use crate::primitives::{CRITERION_COUNT, GAP_THRESHOLD, MAX_MATURITY, READY_THRESHOLD};
use crate::types::{MaturityScore, Percentage, Pillar, SsbjError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running total for one bucket (pillar, category, or everything).
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: u64,
    count: u64,
}

impl Tally {
    fn add(&mut self, score: MaturityScore) {
        self.total += u64::from(score.value());
        self.count += 1;
    }

    fn percentage(self) -> Option<Percentage> {
        Percentage::from_ratio(self.total, self.count * u64::from(MAX_MATURITY))
    }
}

/// Per-pillar maturity percentage.
///
/// Every input value is validated first. Fails with `IncompleteData` naming
/// the first pillar (in catalog order) that has no scored criteria.
pub fn compute_pillar_scores(
    scores: &[(Pillar, i64)],
) -> Result<BTreeMap<Pillar, Percentage>, SsbjError> {
    let mut tallies: BTreeMap<Pillar, Tally> = BTreeMap::new();
    for &(pillar, raw) in scores {
        let score = MaturityScore::new(raw)?;
        tallies.entry(pillar).or_default().add(score);
    }

    let mut result = BTreeMap::new();
    for pillar in Pillar::ALL {
        let percentage = tallies
            .get(&pillar)
            .and_then(|t| t.percentage())
            .ok_or(SsbjError::IncompleteData(pillar.name()))?;
        result.insert(pillar, percentage);
    }
    Ok(result)
}

/// Overall maturity percentage across every raw value.
pub fn compute_overall_score(scores: &[(Pillar, i64)]) -> Result<Percentage, SsbjError> {
    let mut tally = Tally::default();
    for &(_, raw) in scores {
        tally.add(MaturityScore::new(raw)?);
    }
    tally
        .percentage()
        .ok_or(SsbjError::IncompleteData("overall score"))
}

/// Maturity percentage per category label, for categories with at least one
/// scored criterion.
pub fn compute_category_scores(
    scores: &[(&'static str, i64)],
) -> Result<BTreeMap<&'static str, Percentage>, SsbjError> {
    let mut tallies: BTreeMap<&'static str, Tally> = BTreeMap::new();
    for &(category, raw) in scores {
        tallies
            .entry(category)
            .or_default()
            .add(MaturityScore::new(raw)?);
    }
    Ok(tallies
        .into_iter()
        .filter_map(|(category, tally)| tally.percentage().map(|p| (category, p)))
        .collect())
}

/// A scored criterion below the "Defined" maturity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub criterion: &'static CriterionDefinition,
    pub score: MaturityScore,
}

/// Scored criteria below the gap threshold, in catalog order.
#[must_use]
pub fn identify_gaps(scores: &BTreeMap<&'static str, MaturityScore>) -> Vec<Gap> {
    CRITERIA
        .iter()
        .filter_map(|criterion| {
            scores
                .get(criterion.code)
                .filter(|s| s.is_gap())
                .map(|&score| Gap { criterion, score })
        })
        .collect()
}

/// Limited-assurance readiness of one criterion, read off its maturity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// "Managed" or better.
    Ready,
    /// Exactly "Defined": the minimum a reviewer will accept.
    Borderline,
    /// "Developing".
    AtRisk,
    /// "Initial" or "Not Started".
    NotReady,
    NotAssessed,
}

impl Readiness {
    pub const ALL: [Readiness; 5] = [
        Readiness::Ready,
        Readiness::Borderline,
        Readiness::AtRisk,
        Readiness::NotReady,
        Readiness::NotAssessed,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Readiness::Ready => "ready",
            Readiness::Borderline => "borderline",
            Readiness::AtRisk => "at_risk",
            Readiness::NotReady => "not_ready",
            Readiness::NotAssessed => "not_assessed",
        }
    }
}

/// Readiness for a criterion score, or `NotAssessed` when unscored.
#[must_use]
pub fn classify_readiness(score: Option<MaturityScore>) -> Readiness {
    match score.map(MaturityScore::value) {
        None => Readiness::NotAssessed,
        Some(v) if v >= READY_THRESHOLD => Readiness::Ready,
        Some(v) if v == GAP_THRESHOLD => Readiness::Borderline,
        Some(v) if v + 1 == GAP_THRESHOLD => Readiness::AtRisk,
        Some(_) => Readiness::NotReady,
    }
}

/// Share of the catalog that has been scored, in whole percent.
#[must_use]
pub fn completion_percent(scored: usize) -> u8 {
    Percentage::from_ratio(scored.min(CRITERION_COUNT) as u64, CRITERION_COUNT as u64)
        .map(|p| p.rounded() as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(value: i64) -> Vec<(Pillar, i64)> {
        CRITERIA.iter().map(|c| (c.pillar, value)).collect()
    }

    #[test]
    fn uniform_three_is_sixty_percent() {
        let scores = uniform(3);
        let overall = compute_overall_score(&scores).expect("overall");
        assert_eq!(overall.to_string(), "60.0");

        let pillars = compute_pillar_scores(&scores).expect("pillars");
        assert_eq!(pillars.len(), 4);
        assert!(pillars.values().all(|p| *p == Percentage::from_tenths(600)));
    }

    #[test]
    fn all_zero_is_zero() {
        let overall = compute_overall_score(&uniform(0)).expect("overall");
        assert_eq!(overall, Percentage::ZERO);
    }

    #[test]
    fn out_of_range_rejected() {
        let mut scores = uniform(2);
        scores[4].1 = 6;
        assert!(matches!(
            compute_overall_score(&scores),
            Err(SsbjError::InvalidScore(6))
        ));
        scores[4].1 = -1;
        assert!(matches!(
            compute_pillar_scores(&scores),
            Err(SsbjError::InvalidScore(-1))
        ));
    }

    #[test]
    fn empty_pillar_is_incomplete_data() {
        let scores: Vec<_> = uniform(4)
            .into_iter()
            .filter(|(p, _)| *p != Pillar::Strategy)
            .collect();
        assert!(matches!(
            compute_pillar_scores(&scores),
            Err(SsbjError::IncompleteData("Strategy"))
        ));
        assert!(matches!(
            compute_overall_score(&[]),
            Err(SsbjError::IncompleteData(_))
        ));
    }

    #[test]
    fn pillar_means_are_independent() {
        let scores: Vec<_> = CRITERIA
            .iter()
            .map(|c| {
                let v = if c.pillar == Pillar::Governance { 5 } else { 1 };
                (c.pillar, v)
            })
            .collect();
        let pillars = compute_pillar_scores(&scores).expect("pillars");
        assert_eq!(pillars[&Pillar::Governance], Percentage::FULL);
        assert_eq!(pillars[&Pillar::Strategy], Percentage::from_tenths(200));

        // (5*5 + 17*1) / 22 / 5 = 38.18..%
        let overall = compute_overall_score(&scores).expect("overall");
        assert_eq!(overall, Percentage::from_tenths(382));
    }

    #[test]
    fn category_scores_group_by_label() {
        let scores = [("Board Oversight", 2), ("Board Oversight", 4), ("Transition Plan", 5)];
        let categories = compute_category_scores(&scores).expect("categories");
        assert_eq!(categories["Board Oversight"], Percentage::from_tenths(600));
        assert_eq!(categories["Transition Plan"], Percentage::FULL);
    }

    #[test]
    fn gaps_follow_catalog_order() {
        let mut scores = BTreeMap::new();
        for (code, value) in [("MET-01", 1), ("GOV-02", 0), ("STR-01", 3)] {
            scores.insert(code, MaturityScore::new(value).expect("score"));
        }
        let codes: Vec<_> = identify_gaps(&scores)
            .iter()
            .map(|g| g.criterion.code)
            .collect();
        assert_eq!(codes, vec!["GOV-02", "MET-01"]);
    }

    #[test]
    fn readiness_bands() {
        let band = |v: i64| classify_readiness(Some(MaturityScore::new(v).expect("score")));
        assert_eq!(band(5), Readiness::Ready);
        assert_eq!(band(4), Readiness::Ready);
        assert_eq!(band(3), Readiness::Borderline);
        assert_eq!(band(2), Readiness::AtRisk);
        assert_eq!(band(1), Readiness::NotReady);
        assert_eq!(band(0), Readiness::NotReady);
        assert_eq!(classify_readiness(None), Readiness::NotAssessed);
    }

    #[test]
    fn completion_is_whole_percent() {
        assert_eq!(completion_percent(0), 0);
        assert_eq!(completion_percent(11), 50);
        assert_eq!(completion_percent(22), 100);
        assert_eq!(completion_percent(40), 100);
    }
}
