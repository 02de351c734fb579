//! In-memory record store.

use super::{RecordKind, RecordStore};
use crate::types::{AssessmentId, ReviewId, SsbjError, UserId};
use crate::users::User;
use crate::workflow::{Assessment, Review};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    assessments: BTreeMap<AssessmentId, Assessment>,
    reviews: BTreeMap<ReviewId, Review>,
    review_index: BTreeMap<AssessmentId, ReviewId>,
    users: BTreeMap<UserId, User>,
    sequences: BTreeMap<RecordKind, u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn allocate_id(&mut self, kind: RecordKind) -> Result<u64, SsbjError> {
        let next = self.sequences.entry(kind).or_insert(1);
        let id = *next;
        *next = next.saturating_add(1);
        Ok(id)
    }

    fn load_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, SsbjError> {
        Ok(self.assessments.get(&id).cloned())
    }

    fn save_assessment(&mut self, assessment: &Assessment) -> Result<(), SsbjError> {
        self.assessments.insert(assessment.id, assessment.clone());
        Ok(())
    }

    fn assessments(&self) -> Result<Vec<Assessment>, SsbjError> {
        Ok(self.assessments.values().cloned().collect())
    }

    fn load_review(&self, id: ReviewId) -> Result<Option<Review>, SsbjError> {
        Ok(self.reviews.get(&id).cloned())
    }

    fn review_for(&self, assessment: AssessmentId) -> Result<Option<Review>, SsbjError> {
        Ok(self
            .review_index
            .get(&assessment)
            .and_then(|id| self.reviews.get(id))
            .cloned())
    }

    fn save_review(&mut self, review: &Review) -> Result<(), SsbjError> {
        match self.review_index.get(&review.assessment_id) {
            Some(&existing) if existing != review.id => {
                return Err(SsbjError::DuplicateReview {
                    assessment: review.assessment_id,
                    existing,
                });
            }
            _ => {}
        }
        self.review_index.insert(review.assessment_id, review.id);
        self.reviews.insert(review.id, review.clone());
        Ok(())
    }

    fn reviews(&self) -> Result<Vec<Review>, SsbjError> {
        Ok(self.reviews.values().cloned().collect())
    }

    fn load_user(&self, id: UserId) -> Result<Option<User>, SsbjError> {
        Ok(self.users.get(&id).cloned())
    }

    fn user_by_name(&self, username: &str) -> Result<Option<User>, SsbjError> {
        Ok(self
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn save_user(&mut self, user: &User) -> Result<(), SsbjError> {
        if self
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(SsbjError::DuplicateUser(user.username.clone()));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn users(&self) -> Result<Vec<User>, SsbjError> {
        Ok(self.users.values().cloned().collect())
    }
}
