//! # redb-backed Record Storage
//!
//! Records are postcard-encoded into redb tables keyed by id. Each save
//! runs in one write transaction, so a record and its index entry land
//! together or not at all (copy-on-write B-trees, crash safe).

use super::{RecordKind, RecordStore};
use crate::types::{AssessmentId, ReviewId, SsbjError, UserId};
use crate::users::User;
use crate::workflow::{Assessment, Review};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// AssessmentId(u64) -> serialized Assessment
const ASSESSMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("assessments");

/// ReviewId(u64) -> serialized Review
const REVIEWS: TableDefinition<u64, &[u8]> = TableDefinition::new("reviews");

/// AssessmentId(u64) -> ReviewId(u64). At most one review per assessment.
const REVIEW_INDEX: TableDefinition<u64, u64> = TableDefinition::new("review_index");

/// UserId(u64) -> serialized User
const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// username -> UserId(u64)
const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Sequence name -> next id
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

fn store_err(e: impl std::fmt::Display) -> SsbjError {
    SsbjError::StorageError(e.to_string())
}

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, SsbjError> {
    postcard::to_allocvec(record).map_err(|e| SsbjError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SsbjError> {
    postcard::from_bytes(bytes).map_err(|e| SsbjError::SerializationError(e.to_string()))
}

/// A disk-backed record store.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SsbjError> {
        let db = Database::create(path.as_ref()).map_err(store_err)?;

        // Create every table up front so read transactions never miss one.
        let write_txn = db.begin_write().map_err(store_err)?;
        {
            let _ = write_txn.open_table(ASSESSMENTS).map_err(store_err)?;
            let _ = write_txn.open_table(REVIEWS).map_err(store_err)?;
            let _ = write_txn.open_table(REVIEW_INDEX).map_err(store_err)?;
            let _ = write_txn.open_table(USERS).map_err(store_err)?;
            let _ = write_txn.open_table(USERNAMES).map_err(store_err)?;
            let _ = write_txn.open_table(METADATA).map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;

        Ok(Self { db })
    }

    /// Compact the database file. Returns whether any space was reclaimed.
    pub fn compact(&mut self) -> Result<bool, SsbjError> {
        self.db.compact().map_err(store_err)
    }

    fn load<T: DeserializeOwned>(
        &self,
        table: TableDefinition<'static, u64, &'static [u8]>,
        id: u64,
    ) -> Result<Option<T>, SsbjError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(table).map_err(store_err)?;
        let found = table.get(id).map_err(store_err)?;
        found.map(|data| decode(data.value())).transpose()
    }

    fn load_all<T: DeserializeOwned>(
        &self,
        table: TableDefinition<'static, u64, &'static [u8]>,
    ) -> Result<Vec<T>, SsbjError> {
        let read_txn = self.db.begin_read().map_err(store_err)?;
        let table = read_txn.open_table(table).map_err(store_err)?;
        let mut records = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (_, data) = entry.map_err(store_err)?;
            records.push(decode(data.value())?);
        }
        Ok(records)
    }
}

// =============================================================================
// RECORDSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl RecordStore for RedbStore {
    fn allocate_id(&mut self, kind: RecordKind) -> Result<u64, SsbjError> {
        let write_txn = self.db.begin_write().map_err(store_err)?;
        let id = {
            let mut meta = write_txn.open_table(METADATA).map_err(store_err)?;
            let id = meta
                .get(kind.sequence_key())
                .map_err(store_err)?
                .map(|v| v.value())
                .unwrap_or(1);
            meta.insert(kind.sequence_key(), id.saturating_add(1))
                .map_err(store_err)?;
            id
        };
        write_txn.commit().map_err(store_err)?;
        Ok(id)
    }

    fn load_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, SsbjError> {
        self.load(ASSESSMENTS, id.0)
    }

    fn save_assessment(&mut self, assessment: &Assessment) -> Result<(), SsbjError> {
        let bytes = encode(assessment)?;
        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = write_txn.open_table(ASSESSMENTS).map_err(store_err)?;
            table
                .insert(assessment.id.0, bytes.as_slice())
                .map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;
        Ok(())
    }

    fn assessments(&self) -> Result<Vec<Assessment>, SsbjError> {
        self.load_all(ASSESSMENTS)
    }

    fn load_review(&self, id: ReviewId) -> Result<Option<Review>, SsbjError> {
        self.load(REVIEWS, id.0)
    }

    fn review_for(&self, assessment: AssessmentId) -> Result<Option<Review>, SsbjError> {
        let review_id = {
            let read_txn = self.db.begin_read().map_err(store_err)?;
            let index = read_txn.open_table(REVIEW_INDEX).map_err(store_err)?;
            index
                .get(assessment.0)
                .map_err(store_err)?
                .map(|v| v.value())
        };
        match review_id {
            Some(id) => self.load(REVIEWS, id),
            None => Ok(None),
        }
    }

    fn save_review(&mut self, review: &Review) -> Result<(), SsbjError> {
        let bytes = encode(review)?;
        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut index = write_txn.open_table(REVIEW_INDEX).map_err(store_err)?;
            let existing = index
                .get(review.assessment_id.0)
                .map_err(store_err)?
                .map(|v| v.value());
            match existing {
                Some(existing) if existing != review.id.0 => {
                    return Err(SsbjError::DuplicateReview {
                        assessment: review.assessment_id,
                        existing: ReviewId(existing),
                    });
                }
                Some(_) => {}
                None => {
                    index
                        .insert(review.assessment_id.0, review.id.0)
                        .map_err(store_err)?;
                }
            }

            let mut reviews = write_txn.open_table(REVIEWS).map_err(store_err)?;
            reviews
                .insert(review.id.0, bytes.as_slice())
                .map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;
        Ok(())
    }

    fn reviews(&self) -> Result<Vec<Review>, SsbjError> {
        self.load_all(REVIEWS)
    }

    fn load_user(&self, id: UserId) -> Result<Option<User>, SsbjError> {
        self.load(USERS, id.0)
    }

    fn user_by_name(&self, username: &str) -> Result<Option<User>, SsbjError> {
        let user_id = {
            let read_txn = self.db.begin_read().map_err(store_err)?;
            let names = read_txn.open_table(USERNAMES).map_err(store_err)?;
            names.get(username).map_err(store_err)?.map(|v| v.value())
        };
        match user_id {
            Some(id) => self.load(USERS, id),
            None => Ok(None),
        }
    }

    fn save_user(&mut self, user: &User) -> Result<(), SsbjError> {
        let bytes = encode(user)?;
        let write_txn = self.db.begin_write().map_err(store_err)?;
        {
            let mut names = write_txn.open_table(USERNAMES).map_err(store_err)?;
            let holder = names
                .get(user.username.as_str())
                .map_err(store_err)?
                .map(|v| v.value());
            if holder.is_some_and(|id| id != user.id.0) {
                return Err(SsbjError::DuplicateUser(user.username.clone()));
            }
            names
                .insert(user.username.as_str(), user.id.0)
                .map_err(store_err)?;

            let mut users = write_txn.open_table(USERS).map_err(store_err)?;
            users
                .insert(user.id.0, bytes.as_slice())
                .map_err(store_err)?;
        }
        write_txn.commit().map_err(store_err)?;
        Ok(())
    }

    fn users(&self) -> Result<Vec<User>, SsbjError> {
        self.load_all(USERS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::catalog::CRITERIA;
    use crate::types::{Actor, Role};
    use crate::workflow::AssessmentDraft;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn complete_assessment(id: u64, owner: &Actor) -> Assessment {
        let fields = AssessmentDraft {
            title: "FY2026 readiness".into(),
            entity_name: "Example Holdings".into(),
            fiscal_year: "FY2026".into(),
        };
        let mut a = Assessment::create(AssessmentId(id), owner, &fields, now()).expect("create");
        for c in &CRITERIA {
            a.record_score(owner, c.code, 3, "policy doc", "", now())
                .expect("score");
        }
        a.complete(owner, now()).expect("complete");
        a
    }

    #[test]
    fn assessment_roundtrip() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("ssbj.db")).expect("open db");
        let owner = Actor::new(UserId(2), Role::Assessor);
        let assessment = complete_assessment(1, &owner);

        store.save_assessment(&assessment).expect("save");
        let loaded = store
            .load_assessment(AssessmentId(1))
            .expect("load")
            .expect("present");
        assert_eq!(loaded, assessment);
        assert!(store.load_assessment(AssessmentId(9)).expect("load").is_none());
    }

    #[test]
    fn persistence_across_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("ssbj.db");
        let owner = Actor::new(UserId(2), Role::Assessor);
        let reviewer = Actor::new(UserId(3), Role::Reviewer);

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            assert_eq!(store.allocate_id(RecordKind::Assessment).unwrap(), 1);
            let assessment = complete_assessment(1, &owner);
            store.save_assessment(&assessment).expect("save");
            let review =
                Review::start(ReviewId(1), &assessment, None, &reviewer, now()).expect("start");
            store.save_review(&review).expect("save review");
        }

        let mut store = RedbStore::open(&db_path).expect("reopen db");
        assert_eq!(store.allocate_id(RecordKind::Assessment).unwrap(), 2);
        assert_eq!(store.assessments().unwrap().len(), 1);
        let review = store.review_for(AssessmentId(1)).unwrap().unwrap();
        assert_eq!(review.id, ReviewId(1));
        assert_eq!(review.reviewer, UserId(3));
    }

    #[test]
    fn compact_then_reopen_keeps_records() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("ssbj.db");
        let owner = Actor::new(UserId(2), Role::Assessor);

        {
            let mut store = RedbStore::open(&db_path).expect("open db");
            store
                .save_assessment(&complete_assessment(1, &owner))
                .expect("save");
            store.compact().expect("compact");
        }

        let store = RedbStore::open(&db_path).expect("reopen db");
        let loaded = store.load_assessment(AssessmentId(1)).unwrap().unwrap();
        assert!(loaded.is_complete());
        assert_eq!(loaded.scores().len(), CRITERIA.len());
    }

    #[test]
    fn review_index_rejects_second_review() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("ssbj.db")).expect("open db");
        let owner = Actor::new(UserId(2), Role::Assessor);
        let reviewer = Actor::new(UserId(3), Role::Reviewer);
        let assessment = complete_assessment(4, &owner);

        let first = Review::start(ReviewId(1), &assessment, None, &reviewer, now()).unwrap();
        let second = Review::start(ReviewId(2), &assessment, None, &reviewer, now()).unwrap();
        store.save_review(&first).unwrap();
        store.save_review(&first).unwrap();

        match store.save_review(&second) {
            Err(SsbjError::DuplicateReview { existing, .. }) => assert_eq!(existing, ReviewId(1)),
            other => panic!("expected DuplicateReview, got {:?}", other),
        }
        // The rejected write left nothing behind.
        assert!(store.load_review(ReviewId(2)).unwrap().is_none());
        assert_eq!(store.reviews().unwrap().len(), 1);
    }

    #[test]
    fn usernames_are_indexed() {
        let temp = tempdir().expect("temp dir");
        let mut store = RedbStore::open(temp.path().join("ssbj.db")).expect("open db");
        let fields = crate::users::NewUser {
            username: "suzuki".into(),
            full_name: "Suzuki Aiko".into(),
            email: String::new(),
            department: "Finance".into(),
            role: Role::Assessor,
        };
        let user = User::register(UserId(7), &fields, now()).unwrap();
        store.save_user(&user).unwrap();
        assert_eq!(store.user_by_name("suzuki").unwrap(), Some(user.clone()));

        let clash = User::register(UserId(8), &fields, now()).unwrap();
        assert!(matches!(
            store.save_user(&clash),
            Err(SsbjError::DuplicateUser(_))
        ));
        assert_eq!(store.users().unwrap(), vec![user]);
    }
}
