//! # Aggregation and Reporting
//!
//! Read-side views over assessments and reviews:
//! - `DashboardStats`: lifecycle counts, mean maturity, opinion counts
//! - `AssessmentReport`: one assessment's scores, gaps, coverage and
//!   per-criterion assurance readiness
//! - `ReviewReport`: one review's checklist with summary counts
//!
//! Everything here is recomputed from the records on each call. Maps are
//! `BTreeMap`s with every key pre-seeded, so two computations over the same
//! records are identical, field for field.

use crate::catalog::{ASSURANCE_ITEMS, AssuranceItemDefinition, CRITERIA, criteria_in};
use crate::primitives::ASSURANCE_ITEM_COUNT;
use crate::scorer::{self, Gap, Readiness};
use crate::types::{
    AssessmentId, AssuranceRating, Opinion, Percentage, Pillar, ReviewId, UserId,
};
use crate::users::User;
use crate::workflow::{
    Assessment, AssuranceItemResult, LifecycleStatus, Review, ReviewState,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_assessments: usize,
    pub by_status: BTreeMap<LifecycleStatus, usize>,
    /// Mean overall maturity across complete assessments (including those
    /// under review or reviewed). `None` when there are none.
    pub average_overall: Option<Percentage>,
    /// Mean pillar maturity across the same set.
    pub average_pillars: BTreeMap<Pillar, Percentage>,
    pub total_reviews: usize,
    pub reviews_by_state: BTreeMap<ReviewState, usize>,
    /// Submitted reviews only.
    pub opinions: BTreeMap<Opinion, usize>,
}

impl DashboardStats {
    /// Aggregate over the given records. Reviews whose assessment is not in
    /// `assessments` still count toward the review totals.
    #[must_use]
    pub fn compute(assessments: &[Assessment], reviews: &[Review]) -> Self {
        let review_states: BTreeMap<AssessmentId, ReviewState> = reviews
            .iter()
            .map(|r| (r.assessment_id, r.state()))
            .collect();

        let mut by_status: BTreeMap<LifecycleStatus, usize> =
            LifecycleStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut overall = Vec::new();
        let mut pillars: BTreeMap<Pillar, Vec<Percentage>> = BTreeMap::new();

        for assessment in assessments {
            let status = LifecycleStatus::derive(
                assessment.state(),
                review_states.get(&assessment.id).copied(),
            );
            *by_status.entry(status).or_insert(0) += 1;

            if !assessment.is_complete() {
                continue;
            }
            if let Ok(score) = assessment.overall_score() {
                overall.push(score);
            }
            if let Ok(scores) = assessment.pillar_scores() {
                for (pillar, score) in scores {
                    pillars.entry(pillar).or_default().push(score);
                }
            }
        }

        let average_pillars = pillars
            .iter()
            .filter_map(|(pillar, values)| Percentage::mean(values).map(|m| (*pillar, m)))
            .collect();

        let mut reviews_by_state: BTreeMap<ReviewState, usize> =
            [(ReviewState::InProgress, 0), (ReviewState::Submitted, 0)]
                .into_iter()
                .collect();
        let mut opinions: BTreeMap<Opinion, usize> =
            Opinion::ALL.iter().map(|o| (*o, 0)).collect();
        for review in reviews {
            *reviews_by_state.entry(review.state()).or_insert(0) += 1;
            if let (true, Some(opinion)) = (review.is_submitted(), review.opinion()) {
                *opinions.entry(opinion).or_insert(0) += 1;
            }
        }

        Self {
            total_assessments: assessments.len(),
            by_status,
            average_overall: Percentage::mean(&overall),
            average_pillars,
            total_reviews: reviews.len(),
            reviews_by_state,
            opinions,
        }
    }
}

// =============================================================================
// ASSESSMENT REPORT
// =============================================================================

/// Coverage and maturity for one pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PillarSummary {
    pub pillar: Pillar,
    pub scored: usize,
    pub total: usize,
    /// Mean of the scored criteria; `None` until one is scored.
    pub percentage: Option<Percentage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentReport {
    pub assessment_id: AssessmentId,
    pub title: String,
    pub entity_name: String,
    pub fiscal_year: String,
    pub created_by: UserId,
    pub status: LifecycleStatus,
    pub scored: usize,
    pub completion_percent: u8,
    pub overall: Option<Percentage>,
    pub pillars: Vec<PillarSummary>,
    pub categories: BTreeMap<&'static str, Percentage>,
    pub gaps: Vec<Gap>,
    pub missing: Vec<&'static str>,
    /// Every criterion in catalog order.
    pub readiness: Vec<CriterionReadiness>,
    pub readiness_counts: BTreeMap<Readiness, usize>,
}

/// Assurance readiness of one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionReadiness {
    pub code: &'static str,
    pub readiness: Readiness,
}

impl AssessmentReport {
    /// Build the report. `review` is the review of this assessment, if any.
    ///
    /// Works on drafts too: partial pillars report what has been scored so far.
    #[must_use]
    pub fn build(assessment: &Assessment, review: Option<&Review>) -> Self {
        let scored = assessment.scored_map();
        let pillars = Pillar::ALL
            .iter()
            .map(|&pillar| {
                let inputs: Vec<(Pillar, i64)> = criteria_in(pillar)
                    .filter_map(|c| scored.get(c.code).map(|s| (pillar, i64::from(s.value()))))
                    .collect();
                PillarSummary {
                    pillar,
                    scored: inputs.len(),
                    total: criteria_in(pillar).count(),
                    percentage: scorer::compute_overall_score(&inputs).ok(),
                }
            })
            .collect();

        let readiness: Vec<CriterionReadiness> = CRITERIA
            .iter()
            .map(|c| CriterionReadiness {
                code: c.code,
                readiness: scorer::classify_readiness(scored.get(c.code).copied()),
            })
            .collect();
        let mut readiness_counts: BTreeMap<Readiness, usize> =
            Readiness::ALL.iter().map(|r| (*r, 0)).collect();
        for line in &readiness {
            *readiness_counts.entry(line.readiness).or_insert(0) += 1;
        }

        Self {
            assessment_id: assessment.id,
            title: assessment.title.clone(),
            entity_name: assessment.entity_name.clone(),
            fiscal_year: assessment.fiscal_year.clone(),
            created_by: assessment.created_by,
            status: LifecycleStatus::derive(assessment.state(), review.map(Review::state)),
            scored: scored.len(),
            completion_percent: assessment.completion_percent(),
            overall: assessment.overall_score().ok(),
            pillars,
            categories: assessment.category_scores().unwrap_or_default(),
            gaps: assessment.gaps(),
            missing: assessment.missing_criteria(),
            readiness,
            readiness_counts,
        }
    }
}

// =============================================================================
// REVIEW REPORT
// =============================================================================

/// Counts over one review's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub total_items: usize,
    pub rated: usize,
    pub by_rating: BTreeMap<AssuranceRating, usize>,
    pub evidence_adequate: usize,
}

impl ReviewSummary {
    #[must_use]
    pub fn compute(review: &Review) -> Self {
        let mut by_rating: BTreeMap<AssuranceRating, usize> = [
            AssuranceRating::Satisfactory,
            AssuranceRating::NeedsImprovement,
            AssuranceRating::Unsatisfactory,
        ]
        .into_iter()
        .map(|r| (r, 0))
        .collect();
        for item in review.items() {
            *by_rating.entry(item.rating).or_insert(0) += 1;
        }
        Self {
            total_items: ASSURANCE_ITEM_COUNT,
            rated: review.items().len(),
            by_rating,
            evidence_adequate: review.items().iter().filter(|i| i.evidence_adequate).count(),
        }
    }
}

/// One checklist row: the definition and the reviewer's result, if rated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistLine {
    pub item: &'static AssuranceItemDefinition,
    pub result: Option<AssuranceItemResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewReport {
    pub review_id: ReviewId,
    pub assessment_id: AssessmentId,
    pub entity_name: String,
    pub fiscal_year: String,
    pub reviewer: UserId,
    /// Full name of the reviewer; `None` if the user record is gone.
    pub reviewer_name: Option<String>,
    pub state: ReviewState,
    pub opinion: Option<Opinion>,
    pub findings: String,
    pub recommendations: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub summary: ReviewSummary,
    pub checklist: Vec<ChecklistLine>,
    pub missing: Vec<&'static str>,
}

impl ReviewReport {
    /// `reviewer` is the registry record of `review.reviewer`, if found.
    #[must_use]
    pub fn build(review: &Review, assessment: &Assessment, reviewer: Option<&User>) -> Self {
        let checklist = ASSURANCE_ITEMS
            .iter()
            .map(|item| ChecklistLine {
                item,
                result: review.item(item.code).cloned(),
            })
            .collect();
        Self {
            review_id: review.id,
            assessment_id: assessment.id,
            entity_name: assessment.entity_name.clone(),
            fiscal_year: assessment.fiscal_year.clone(),
            reviewer: review.reviewer,
            reviewer_name: reviewer.map(|u| u.full_name.clone()),
            state: review.state(),
            opinion: review.opinion(),
            findings: review.findings.clone(),
            recommendations: review.recommendations.clone(),
            submitted_at: review.submitted_at,
            summary: ReviewSummary::compute(review),
            checklist,
            missing: review.missing_items(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Actor, Role};
    use crate::workflow::{AssessmentDraft, ReviewConclusion};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    const ASSESSOR: Actor = Actor::new(UserId(2), Role::Assessor);
    const REVIEWER: Actor = Actor::new(UserId(3), Role::Reviewer);

    fn assessment(id: u64, value: i64, complete: bool) -> Assessment {
        let fields = AssessmentDraft {
            title: format!("Assessment {}", id),
            entity_name: "Example Trading".into(),
            fiscal_year: "FY2026".into(),
        };
        let mut a =
            Assessment::create(AssessmentId(id), &ASSESSOR, &fields, now()).expect("create");
        for c in CRITERIA.iter().take(if complete { CRITERIA.len() } else { 3 }) {
            a.record_score(&ASSESSOR, c.code, value, "", "", now())
                .expect("score");
        }
        if complete {
            a.complete(&ASSESSOR, now()).expect("complete");
        }
        a
    }

    fn submitted_review(id: u64, target: &Assessment, opinion: Opinion) -> Review {
        let mut r = Review::start(ReviewId(id), target, None, &REVIEWER, now()).expect("start");
        for (i, item) in ASSURANCE_ITEMS.iter().enumerate() {
            let rating = if i % 2 == 0 {
                AssuranceRating::Satisfactory
            } else {
                AssuranceRating::NeedsImprovement
            };
            r.rate_item(&REVIEWER, item.code, rating, "", "", i < 7, now())
                .expect("rate");
        }
        let conclusion = ReviewConclusion {
            opinion: Some(opinion),
            ..ReviewConclusion::default()
        };
        r.submit(&REVIEWER, &conclusion, now()).expect("submit");
        r
    }

    #[test]
    fn dashboard_counts_and_means() {
        let draft = assessment(1, 1, false);
        let complete = assessment(2, 3, true);
        let reviewed = assessment(3, 4, true);
        let review = submitted_review(1, &reviewed, Opinion::Qualified);

        let stats = DashboardStats::compute(&[draft, complete, reviewed], &[review]);
        assert_eq!(stats.total_assessments, 3);
        assert_eq!(stats.by_status[&LifecycleStatus::Draft], 1);
        assert_eq!(stats.by_status[&LifecycleStatus::Complete], 1);
        assert_eq!(stats.by_status[&LifecycleStatus::UnderReview], 0);
        assert_eq!(stats.by_status[&LifecycleStatus::Reviewed], 1);
        // (60.0 + 80.0) / 2
        assert_eq!(stats.average_overall, Some(Percentage::from_tenths(700)));
        assert_eq!(
            stats.average_pillars.get(&Pillar::Strategy),
            Some(&Percentage::from_tenths(700))
        );
        assert_eq!(stats.opinions[&Opinion::Qualified], 1);
        assert_eq!(stats.opinions[&Opinion::Adverse], 0);
        assert_eq!(stats.reviews_by_state[&ReviewState::Submitted], 1);
    }

    #[test]
    fn dashboard_empty() {
        let stats = DashboardStats::compute(&[], &[]);
        assert_eq!(stats.total_assessments, 0);
        assert_eq!(stats.average_overall, None);
        assert!(stats.average_pillars.is_empty());
        assert_eq!(stats.by_status.len(), 4);
    }

    #[test]
    fn dashboard_is_repeatable() {
        let records = [assessment(1, 2, true), assessment(2, 5, true)];
        let review = submitted_review(1, &records[0], Opinion::Adverse);
        let first = DashboardStats::compute(&records, std::slice::from_ref(&review));
        let second = DashboardStats::compute(&records, std::slice::from_ref(&review));
        assert_eq!(first, second);
    }

    #[test]
    fn draft_report_shows_partial_pillars() {
        let report = AssessmentReport::build(&assessment(5, 2, false), None);
        assert_eq!(report.status, LifecycleStatus::Draft);
        assert_eq!(report.scored, 3);
        assert_eq!(report.missing.len(), 19);
        assert_eq!(report.gaps.len(), 3);
        let governance = &report.pillars[0];
        assert_eq!(governance.scored, 3);
        assert_eq!(governance.total, 5);
        assert_eq!(governance.percentage, Some(Percentage::from_tenths(400)));
        assert_eq!(report.pillars[1].percentage, None);
    }

    #[test]
    fn readiness_covers_whole_catalog() {
        let report = AssessmentReport::build(&assessment(6, 2, false), None);
        assert_eq!(report.readiness.len(), CRITERIA.len());
        assert_eq!(report.readiness[0].code, "GOV-01");
        assert_eq!(report.readiness[0].readiness, Readiness::AtRisk);
        assert_eq!(report.readiness_counts[&Readiness::AtRisk], 3);
        assert_eq!(report.readiness_counts[&Readiness::NotAssessed], 19);
        assert_eq!(report.readiness_counts[&Readiness::Ready], 0);
        assert_eq!(report.readiness_counts.len(), Readiness::ALL.len());

        let report = AssessmentReport::build(&assessment(7, 4, true), None);
        assert_eq!(report.readiness_counts[&Readiness::Ready], CRITERIA.len());
        assert_eq!(report.readiness_counts[&Readiness::NotAssessed], 0);
    }

    #[test]
    fn review_summary_counts() {
        let target = assessment(1, 3, true);
        let review = submitted_review(1, &target, Opinion::Unqualified);
        let report = ReviewReport::build(&review, &target, None);
        assert_eq!(report.reviewer_name, None);
        assert_eq!(report.summary.rated, 10);
        assert_eq!(report.summary.by_rating[&AssuranceRating::Satisfactory], 5);
        assert_eq!(report.summary.by_rating[&AssuranceRating::NeedsImprovement], 5);
        assert_eq!(report.summary.by_rating[&AssuranceRating::Unsatisfactory], 0);
        assert_eq!(report.summary.evidence_adequate, 7);
        assert!(report.missing.is_empty());
        assert_eq!(report.checklist.len(), 10);
    }
}
