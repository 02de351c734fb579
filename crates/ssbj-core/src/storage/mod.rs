//! # Record Storage
//!
//! The `RecordStore` trait and its two backends:
//! - `MemoryStore`: BTreeMaps, volatile
//! - `RedbStore`: redb tables with postcard-encoded records (ACID, persistent)
//!
//! Every `save_*` call is one atomic write. Callers mutate a copy of the
//! record and only save once every check has passed, so a rejected operation
//! never reaches the store.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::types::{AssessmentId, ReviewId, SsbjError, UserId};
use crate::users::User;
use crate::workflow::{Assessment, Review};

/// Which id sequence to draw from. Sequences start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Assessment,
    Review,
    User,
}

impl RecordKind {
    /// Metadata key holding the next id of this kind.
    #[must_use]
    pub fn sequence_key(&self) -> &'static str {
        match self {
            RecordKind::Assessment => "next_assessment_id",
            RecordKind::Review => "next_review_id",
            RecordKind::User => "next_user_id",
        }
    }
}

/// Persistence for assessments, reviews and users.
pub trait RecordStore {
    /// Reserve the next id of `kind`.
    fn allocate_id(&mut self, kind: RecordKind) -> Result<u64, SsbjError>;

    fn load_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, SsbjError>;

    fn save_assessment(&mut self, assessment: &Assessment) -> Result<(), SsbjError>;

    /// Every assessment, ordered by id.
    fn assessments(&self) -> Result<Vec<Assessment>, SsbjError>;

    fn load_review(&self, id: ReviewId) -> Result<Option<Review>, SsbjError>;

    /// The review recorded for `assessment`, if any.
    fn review_for(&self, assessment: AssessmentId) -> Result<Option<Review>, SsbjError>;

    /// Insert or replace a review.
    ///
    /// Fails with `DuplicateReview` when a different review is already
    /// indexed for the same assessment.
    fn save_review(&mut self, review: &Review) -> Result<(), SsbjError>;

    /// Every review, ordered by id.
    fn reviews(&self) -> Result<Vec<Review>, SsbjError>;

    fn load_user(&self, id: UserId) -> Result<Option<User>, SsbjError>;

    fn user_by_name(&self, username: &str) -> Result<Option<User>, SsbjError>;

    /// Insert or replace a user.
    ///
    /// Fails with `DuplicateUser` when another user holds the username.
    fn save_user(&mut self, user: &User) -> Result<(), SsbjError>;

    /// Every user, ordered by id.
    fn users(&self) -> Result<Vec<User>, SsbjError>;
}
