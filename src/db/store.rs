//! Analysis store adapter — persistence plus the live feed.
//!
//! This is the document-store boundary of the pipeline: put, get, list,
//! rename (the single mutable field), delete and subscribe. Derivation of
//! the display view happens on read, never at write time, so a failed save
//! does not invalidate an analysis the clinician is already looking at.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::feed::{AnalysisEvent, AnalysisFeed};
use super::repository;
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::AnalysisRecord;

pub struct AnalysisStore {
    conn: Mutex<Connection>,
    feed: AnalysisFeed,
}

impl AnalysisStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_database(path)?),
            feed: AnalysisFeed::new(),
        })
    }

    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_memory_database()?),
            feed: AnalysisFeed::new(),
        })
    }

    /// Persist a freshly created record and notify the owner's feed.
    pub fn put(&self, record: &AnalysisRecord) -> Result<(), DatabaseError> {
        repository::insert_analysis(&self.lock_conn(), record)?;
        self.feed
            .publish(&record.owner_id, AnalysisEvent::Created(record.clone()));
        tracing::info!(id = %record.id, category = %record.image_category, "analysis saved");
        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<AnalysisRecord>, DatabaseError> {
        repository::get_analysis(&self.lock_conn(), id)
    }

    pub fn list_for_owner(&self, owner_id: &Uuid) -> Result<Vec<AnalysisRecord>, DatabaseError> {
        repository::list_analyses_for_owner(&self.lock_conn(), owner_id)
    }

    /// Rename an owned record. The only permitted partial update.
    pub fn rename(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        custom_label: Option<&str>,
    ) -> Result<(), DatabaseError> {
        repository::rename_analysis(&self.lock_conn(), id, owner_id, custom_label)?;
        self.feed.publish(
            owner_id,
            AnalysisEvent::Renamed {
                id: *id,
                custom_label: custom_label.map(str::to_string),
            },
        );
        Ok(())
    }

    /// Delete an owned record.
    pub fn delete(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), DatabaseError> {
        repository::delete_analysis(&self.lock_conn(), id, owner_id)?;
        self.feed
            .publish(owner_id, AnalysisEvent::Deleted { id: *id });
        Ok(())
    }

    /// Live stream of one owner's history changes.
    pub fn subscribe(&self, owner_id: &Uuid) -> broadcast::Receiver<AnalysisEvent> {
        self.feed.subscribe(owner_id)
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageCategory;
    use chrono::NaiveDate;

    fn sample(owner: Uuid) -> AnalysisRecord {
        AnalysisRecord::new(
            owner,
            "images/scan.png",
            ImageCategory::Mammogram,
            "Final Result: likely normal.",
            NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = AnalysisStore::in_memory().unwrap();
        let owner = Uuid::new_v4();
        let record = sample(owner);

        store.put(&record).unwrap();
        assert_eq!(store.get(&record.id).unwrap().unwrap(), record);
    }

    #[test]
    fn mutations_reach_a_subscriber() {
        let store = AnalysisStore::in_memory().unwrap();
        let owner = Uuid::new_v4();
        let mut rx = store.subscribe(&owner);

        let record = sample(owner);
        store.put(&record).unwrap();
        store.rename(&record.id, &owner, Some("Case 12")).unwrap();
        store.delete(&record.id, &owner).unwrap();

        assert!(matches!(rx.try_recv().unwrap(), AnalysisEvent::Created(_)));
        assert!(matches!(
            rx.try_recv().unwrap(),
            AnalysisEvent::Renamed { .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            AnalysisEvent::Deleted { .. }
        ));
    }

    #[test]
    fn failed_rename_publishes_nothing() {
        let store = AnalysisStore::in_memory().unwrap();
        let owner = Uuid::new_v4();
        let mut rx = store.subscribe(&owner);

        let missing = Uuid::new_v4();
        assert!(store.rename(&missing, &owner, Some("x")).is_err());
        assert!(rx.try_recv().is_err());
    }
}
