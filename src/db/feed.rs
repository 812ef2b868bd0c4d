//! Per-owner live feed of analysis history changes.
//!
//! The dashboard keeps a clinician's history list open while new analyses
//! run, so store mutations fan out to per-owner subscribers. Lagging
//! subscribers lose old events instead of blocking writers.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::AnalysisRecord;

/// Channel capacity per owner. Events beyond this while a subscriber lags
/// are dropped for that subscriber.
const FEED_CAPACITY: usize = 64;

/// One change to an owner's analysis history.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    Created(AnalysisRecord),
    Renamed {
        id: Uuid,
        custom_label: Option<String>,
    },
    Deleted {
        id: Uuid,
    },
}

/// Fan-out hub keyed by owner.
pub struct AnalysisFeed {
    senders: Mutex<HashMap<Uuid, broadcast::Sender<AnalysisEvent>>>,
}

impl AnalysisFeed {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to one owner's history changes.
    pub fn subscribe(&self, owner_id: &Uuid) -> broadcast::Receiver<AnalysisEvent> {
        let mut senders = match self.senders.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        senders
            .entry(*owner_id)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }

    /// Publish a change to an owner's subscribers. A send with no live
    /// subscribers is a no-op.
    pub fn publish(&self, owner_id: &Uuid, event: AnalysisEvent) {
        let senders = match self.senders.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(sender) = senders.get(owner_id) {
            let _ = sender.send(event);
        }
    }
}

impl Default for AnalysisFeed {
    fn default() -> Self {
        Self::new()
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
            "raw",
            NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn subscriber_receives_published_event() {
        let feed = AnalysisFeed::new();
        let owner = Uuid::new_v4();
        let mut rx = feed.subscribe(&owner);

        let record = sample(owner);
        feed.publish(&owner, AnalysisEvent::Created(record.clone()));

        match rx.try_recv().unwrap() {
            AnalysisEvent::Created(received) => assert_eq!(received.id, record.id),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn events_are_scoped_to_their_owner() {
        let feed = AnalysisFeed::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut rx = feed.subscribe(&owner);

        feed.publish(&other, AnalysisEvent::Deleted { id: Uuid::new_v4() });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let feed = AnalysisFeed::new();
        feed.publish(&Uuid::new_v4(), AnalysisEvent::Deleted { id: Uuid::new_v4() });
    }
}
