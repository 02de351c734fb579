//! # Workspace
//!
//! The single entry point for user-facing operations. A `Workspace` owns a
//! storage backend and routes every call through the same steps:
//! load a copy, run the workflow method (role, ownership, state, input
//! checks), then save. A rejected call never writes.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (volatile)
//! - `Persistent`: `RedbStore` (disk-backed, ACID)

use crate::access::{Operation, authorize};
use crate::primitives::DEFAULT_ADMIN_USERNAME;
use crate::report::{AssessmentReport, DashboardStats, ReviewReport};
use crate::storage::{MemoryStore, RecordKind, RecordStore, RedbStore};
use crate::types::{
    Actor, AssessmentId, AssuranceRating, ReviewId, Role, SsbjError, UserId,
};
use crate::users::{NewUser, User};
use crate::workflow::{
    Assessment, AssessmentDraft, AssuranceItemResult, CriterionScore, Review, ReviewConclusion,
};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Storage backend for a Workspace.
#[derive(Debug)]
pub enum StorageBackend {
    InMemory(MemoryStore),
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Reviewer-supplied result for one checklist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRating {
    pub rating: AssuranceRating,
    pub notes: String,
    pub recommendation: String,
    pub evidence_adequate: bool,
}

#[derive(Debug)]
pub struct Workspace {
    backend: StorageBackend,
}

impl Workspace {
    /// An in-memory workspace with the default admin user seeded.
    pub fn in_memory(now: DateTime<Utc>) -> Result<Self, SsbjError> {
        Self::with_backend(StorageBackend::default(), now)
    }

    /// Open or create a redb-backed workspace at `path`.
    ///
    /// The default admin user is created the first time a database is opened.
    pub fn open(path: impl AsRef<Path>, now: DateTime<Utc>) -> Result<Self, SsbjError> {
        let store = RedbStore::open(path)?;
        Self::with_backend(StorageBackend::Persistent(store), now)
    }

    pub fn with_backend(backend: StorageBackend, now: DateTime<Utc>) -> Result<Self, SsbjError> {
        let mut workspace = Self { backend };
        workspace.ensure_admin(now)?;
        Ok(workspace)
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    fn store(&self) -> &dyn RecordStore {
        match &self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    fn store_mut(&mut self) -> &mut dyn RecordStore {
        match &mut self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    fn ensure_admin(&mut self, now: DateTime<Utc>) -> Result<(), SsbjError> {
        if self.store().user_by_name(DEFAULT_ADMIN_USERNAME)?.is_some() {
            return Ok(());
        }
        let fields = NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            full_name: "Administrator".to_string(),
            email: String::new(),
            department: String::new(),
            role: Role::Admin,
        };
        let id = self.store_mut().allocate_id(RecordKind::User)?;
        let admin = User::register(UserId(id), &fields, now)?;
        self.store_mut().save_user(&admin)
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// Resolve a username into the actor used for workflow calls.
    pub fn actor_for(&self, username: &str) -> Result<Actor, SsbjError> {
        self.user(username).map(|u| u.actor())
    }

    pub fn user(&self, username: &str) -> Result<User, SsbjError> {
        self.store()
            .user_by_name(username.trim())?
            .ok_or_else(|| SsbjError::UserNotFound(username.trim().to_string()))
    }

    pub fn create_user(
        &mut self,
        actor: &Actor,
        fields: &NewUser,
        now: DateTime<Utc>,
    ) -> Result<User, SsbjError> {
        authorize(actor, Operation::ManageUsers)?;
        if self.store().user_by_name(fields.username.trim())?.is_some() {
            return Err(SsbjError::DuplicateUser(fields.username.trim().to_string()));
        }
        // Validate before consuming an id.
        let candidate = User::register(UserId(0), fields, now)?;
        let id = self.store_mut().allocate_id(RecordKind::User)?;
        let user = User {
            id: UserId(id),
            ..candidate
        };
        self.store_mut().save_user(&user)?;
        Ok(user)
    }

    pub fn users(&self, actor: &Actor) -> Result<Vec<User>, SsbjError> {
        authorize(actor, Operation::ManageUsers)?;
        self.store().users()
    }

    // =========================================================================
    // ASSESSMENTS
    // =========================================================================

    fn load_assessment(&self, id: AssessmentId) -> Result<Assessment, SsbjError> {
        self.store()
            .load_assessment(id)?
            .ok_or(SsbjError::NotFound {
                record: "Assessment",
                id: id.0,
            })
    }

    pub fn create_assessment(
        &mut self,
        actor: &Actor,
        fields: &AssessmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Assessment, SsbjError> {
        // Validate before consuming an id.
        Assessment::create(AssessmentId(0), actor, fields, now)?;
        let id = AssessmentId(self.store_mut().allocate_id(RecordKind::Assessment)?);
        let assessment = Assessment::create(id, actor, fields, now)?;
        self.store_mut().save_assessment(&assessment)?;
        Ok(assessment)
    }

    pub fn record_score(
        &mut self,
        actor: &Actor,
        id: AssessmentId,
        code: &str,
        value: i64,
        evidence: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<CriterionScore, SsbjError> {
        let mut assessment = self.load_assessment(id)?;
        let score = assessment
            .record_score(actor, code, value, evidence, notes, now)?
            .clone();
        self.store_mut().save_assessment(&assessment)?;
        Ok(score)
    }

    pub fn complete_assessment(
        &mut self,
        actor: &Actor,
        id: AssessmentId,
        now: DateTime<Utc>,
    ) -> Result<Assessment, SsbjError> {
        let mut assessment = self.load_assessment(id)?;
        assessment.complete(actor, now)?;
        self.store_mut().save_assessment(&assessment)?;
        Ok(assessment)
    }

    pub fn assessment(&self, actor: &Actor, id: AssessmentId) -> Result<Assessment, SsbjError> {
        let assessment = self.load_assessment(id)?;
        assessment.ensure_visible_to(actor)?;
        Ok(assessment)
    }

    /// Assessments `actor` may read, ordered by id.
    pub fn assessments(&self, actor: &Actor) -> Result<Vec<Assessment>, SsbjError> {
        authorize(actor, Operation::ViewAssessment)?;
        Ok(self
            .store()
            .assessments()?
            .into_iter()
            .filter(|a| a.ensure_visible_to(actor).is_ok())
            .collect())
    }

    pub fn assessment_report(
        &self,
        actor: &Actor,
        id: AssessmentId,
    ) -> Result<AssessmentReport, SsbjError> {
        let assessment = self.assessment(actor, id)?;
        let review = self.store().review_for(id)?;
        Ok(AssessmentReport::build(&assessment, review.as_ref()))
    }

    // =========================================================================
    // REVIEWS
    // =========================================================================

    fn load_review(&self, id: ReviewId) -> Result<Review, SsbjError> {
        self.store().load_review(id)?.ok_or(SsbjError::NotFound {
            record: "Review",
            id: id.0,
        })
    }

    pub fn start_review(
        &mut self,
        actor: &Actor,
        assessment_id: AssessmentId,
        now: DateTime<Utc>,
    ) -> Result<Review, SsbjError> {
        authorize(actor, Operation::StartReview)?;
        let assessment = self.load_assessment(assessment_id)?;
        let existing = self.store().review_for(assessment_id)?;
        // Validate before consuming an id.
        Review::start(ReviewId(0), &assessment, existing.as_ref(), actor, now)?;
        let id = ReviewId(self.store_mut().allocate_id(RecordKind::Review)?);
        let review = Review::start(id, &assessment, existing.as_ref(), actor, now)?;
        self.store_mut().save_review(&review)?;
        Ok(review)
    }

    pub fn rate_item(
        &mut self,
        actor: &Actor,
        id: ReviewId,
        code: &str,
        input: &ItemRating,
        now: DateTime<Utc>,
    ) -> Result<AssuranceItemResult, SsbjError> {
        let mut review = self.load_review(id)?;
        let result = review
            .rate_item(
                actor,
                code,
                input.rating,
                &input.notes,
                &input.recommendation,
                input.evidence_adequate,
                now,
            )?
            .clone();
        self.store_mut().save_review(&review)?;
        Ok(result)
    }

    /// Submit a review with its opinion and narrative.
    pub fn submit_review(
        &mut self,
        actor: &Actor,
        id: ReviewId,
        conclusion: &ReviewConclusion,
        now: DateTime<Utc>,
    ) -> Result<Review, SsbjError> {
        let mut review = self.load_review(id)?;
        review.submit(actor, conclusion, now)?;
        self.store_mut().save_review(&review)?;
        Ok(review)
    }

    pub fn review(&self, actor: &Actor, id: ReviewId) -> Result<Review, SsbjError> {
        let review = self.load_review(id)?;
        let assessment = self.load_assessment(review.assessment_id)?;
        review.ensure_visible_to(actor, assessment.created_by)?;
        Ok(review)
    }

    /// The review of an assessment, if one has been started.
    pub fn review_for_assessment(
        &self,
        actor: &Actor,
        assessment_id: AssessmentId,
    ) -> Result<Option<Review>, SsbjError> {
        let assessment = self.assessment(actor, assessment_id)?;
        match self.store().review_for(assessment_id)? {
            Some(review) => {
                review.ensure_visible_to(actor, assessment.created_by)?;
                Ok(Some(review))
            }
            None => Ok(None),
        }
    }

    pub fn review_report(&self, actor: &Actor, id: ReviewId) -> Result<ReviewReport, SsbjError> {
        let review = self.load_review(id)?;
        let assessment = self.load_assessment(review.assessment_id)?;
        review.ensure_visible_to(actor, assessment.created_by)?;
        let reviewer = self.store().load_user(review.reviewer)?;
        Ok(ReviewReport::build(&review, &assessment, reviewer.as_ref()))
    }

    // =========================================================================
    // MAINTENANCE
    // =========================================================================

    /// Compact the database file. In-memory workspaces have nothing to
    /// reclaim and return `false`.
    pub fn compact(&mut self, actor: &Actor) -> Result<bool, SsbjError> {
        authorize(actor, Operation::MaintainStorage)?;
        match &mut self.backend {
            StorageBackend::InMemory(_) => Ok(false),
            StorageBackend::Persistent(store) => store.compact(),
        }
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    /// Dashboard statistics over the records `actor` is responsible for.
    ///
    /// Admins see everything, assessors their own assessments and the reviews
    /// of them, reviewers their own reviews and the assessments under them.
    pub fn dashboard(&self, actor: &Actor) -> Result<DashboardStats, SsbjError> {
        authorize(actor, Operation::ViewDashboard)?;
        let assessments = self.store().assessments()?;
        let reviews = self.store().reviews()?;

        let (assessments, reviews): (Vec<Assessment>, Vec<Review>) = match actor.role {
            Role::Admin => (assessments, reviews),
            Role::Assessor => {
                let own: Vec<Assessment> = assessments
                    .into_iter()
                    .filter(|a| a.created_by == actor.id)
                    .collect();
                let reviews = reviews
                    .into_iter()
                    .filter(|r| own.iter().any(|a| a.id == r.assessment_id))
                    .collect();
                (own, reviews)
            }
            Role::Reviewer => {
                let own: Vec<Review> = reviews
                    .into_iter()
                    .filter(|r| r.reviewer == actor.id)
                    .collect();
                let assessments = assessments
                    .into_iter()
                    .filter(|a| own.iter().any(|r| r.assessment_id == a.id))
                    .collect();
                (assessments, own)
            }
        };
        Ok(DashboardStats::compute(&assessments, &reviews))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ASSURANCE_ITEMS, CRITERIA};
    use crate::types::Opinion;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 3, 9, 15, 0)
            .single()
            .expect("valid timestamp")
    }

    fn add_user(ws: &mut Workspace, username: &str, role: Role) -> Actor {
        let admin = ws.actor_for("admin").expect("admin");
        let fields = NewUser {
            username: username.to_string(),
            full_name: String::new(),
            email: String::new(),
            department: String::new(),
            role,
        };
        ws.create_user(&admin, &fields, now()).expect("create user").actor()
    }

    fn draft() -> AssessmentDraft {
        AssessmentDraft {
            title: "Initial readiness".into(),
            entity_name: "Example Manufacturing".into(),
            fiscal_year: "FY2026".into(),
        }
    }

    #[test]
    fn admin_is_seeded_once() {
        let ws = Workspace::in_memory(now()).expect("workspace");
        assert!(!ws.is_persistent());
        let admin = ws.actor_for("admin").expect("admin");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(ws.users(&admin).expect("users").len(), 1);
        assert!(matches!(
            ws.actor_for("nobody"),
            Err(SsbjError::UserNotFound(_))
        ));
    }

    #[test]
    fn duplicate_username_rejected() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        add_user(&mut ws, "ito", Role::Assessor);
        let admin = ws.actor_for("admin").expect("admin");
        let fields = NewUser {
            username: "ito".into(),
            full_name: String::new(),
            email: String::new(),
            department: String::new(),
            role: Role::Reviewer,
        };
        assert!(matches!(
            ws.create_user(&admin, &fields, now()),
            Err(SsbjError::DuplicateUser(_))
        ));
    }

    #[test]
    fn assessor_cannot_manage_users() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        let assessor = add_user(&mut ws, "ito", Role::Assessor);
        assert!(matches!(
            ws.users(&assessor),
            Err(SsbjError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn full_lifecycle_updates_dashboard() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        let assessor = add_user(&mut ws, "ito", Role::Assessor);
        let reviewer = add_user(&mut ws, "kato", Role::Reviewer);
        let admin = ws.actor_for("admin").expect("admin");

        let a = ws.create_assessment(&assessor, &draft(), now()).expect("create");
        for c in &CRITERIA {
            ws.record_score(&assessor, a.id, c.code, 3, "", "", now())
                .expect("score");
        }
        ws.complete_assessment(&assessor, a.id, now()).expect("complete");

        let review = ws.start_review(&reviewer, a.id, now()).expect("start");
        let rating = ItemRating {
            rating: AssuranceRating::Satisfactory,
            notes: String::new(),
            recommendation: String::new(),
            evidence_adequate: true,
        };
        for item in &ASSURANCE_ITEMS {
            ws.rate_item(&reviewer, review.id, item.code, &rating, now())
                .expect("rate");
        }
        let conclusion = ReviewConclusion {
            opinion: Some(Opinion::Unqualified),
            ..ReviewConclusion::default()
        };
        ws.submit_review(&reviewer, review.id, &conclusion, now())
            .expect("submit");

        let stats = ws.dashboard(&admin).expect("dashboard");
        assert_eq!(stats.total_assessments, 1);
        assert_eq!(stats.opinions[&Opinion::Unqualified], 1);

        // The assessor sees the review of their assessment.
        let seen = ws
            .review_for_assessment(&assessor, a.id)
            .expect("lookup")
            .map(|r| r.id);
        assert_eq!(seen, Some(review.id));

        let report = ws.review_report(&assessor, review.id).expect("report");
        assert_eq!(report.reviewer_name.as_deref(), Some("kato"));
    }

    #[test]
    fn dashboard_scoped_by_actor() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        let first = add_user(&mut ws, "ito", Role::Assessor);
        let second = add_user(&mut ws, "mori", Role::Assessor);
        ws.create_assessment(&first, &draft(), now()).expect("create");
        ws.create_assessment(&second, &draft(), now()).expect("create");
        ws.create_assessment(&second, &draft(), now()).expect("create");

        assert_eq!(ws.dashboard(&first).expect("stats").total_assessments, 1);
        assert_eq!(ws.dashboard(&second).expect("stats").total_assessments, 2);
        assert_eq!(ws.assessments(&first).expect("list").len(), 1);
    }

    #[test]
    fn missing_records_are_not_found() {
        let ws = Workspace::in_memory(now()).expect("workspace");
        let admin = ws.actor_for("admin").expect("admin");
        assert!(matches!(
            ws.assessment(&admin, AssessmentId(99)),
            Err(SsbjError::NotFound {
                record: "Assessment",
                id: 99
            })
        ));
        assert!(matches!(
            ws.review(&admin, ReviewId(5)),
            Err(SsbjError::NotFound { .. })
        ));
    }

    #[test]
    fn compaction_is_admin_only() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        let assessor = add_user(&mut ws, "ito", Role::Assessor);
        let admin = ws.actor_for("admin").expect("admin");
        assert!(matches!(
            ws.compact(&assessor),
            Err(SsbjError::PermissionDenied { .. })
        ));
        assert!(!ws.compact(&admin).expect("compact"));
    }

    #[test]
    fn rejected_creation_consumes_no_id() {
        let mut ws = Workspace::in_memory(now()).expect("workspace");
        let reviewer = add_user(&mut ws, "kato", Role::Reviewer);
        let assessor = add_user(&mut ws, "ito", Role::Assessor);
        assert!(ws.create_assessment(&reviewer, &draft(), now()).is_err());
        let a = ws.create_assessment(&assessor, &draft(), now()).expect("create");
        assert_eq!(a.id, AssessmentId(1));
    }
}
