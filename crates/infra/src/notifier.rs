//! Bus consumer that turns requisition status changes into stored
//! notifications for the original requester.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use uuid::Uuid;

use sparekeep_events::EventEnvelope;
use sparekeep_requisitions::{Notification, RequisitionEvent, processed_notice};

use crate::dispatcher::REQUISITION_AGGREGATE;
use crate::store::{PartStore, StoreError};

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("event requisition_id does not match envelope aggregate_id")]
    AggregateMismatch,

    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Idempotent per requisition stream: envelopes at or below the last seen
/// sequence number are skipped.
///
/// Cursors live in memory only. A stream is forgotten once it reaches a
/// terminal status, since a closed requisition emits nothing further. The
/// cursor moves only after the notice is stored, so a failed envelope can be
/// applied again.
pub struct RequisitionNotifier {
    store: Arc<dyn PartStore>,
    cursors: RwLock<HashMap<Uuid, u64>>,
}

impl RequisitionNotifier {
    pub fn new(store: Arc<dyn PartStore>) -> Self {
        Self {
            store,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    fn cursor(&self, aggregate_id: Uuid) -> u64 {
        match self.cursors.read() {
            Ok(cursors) => cursors.get(&aggregate_id).copied().unwrap_or(0),
            Err(_) => 0,
        }
    }

    fn update_cursor(&self, aggregate_id: Uuid, seq: u64) {
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.insert(aggregate_id, seq);
        }
    }

    fn forget(&self, aggregate_id: Uuid) {
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.remove(&aggregate_id);
        }
    }

    /// Number of requisition streams with a live cursor.
    pub fn tracked_streams(&self) -> usize {
        self.cursors.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Handle one envelope; returns the notification stored for it, if any.
    pub async fn apply_envelope(
        &self,
        envelope: &EventEnvelope<RequisitionEvent>,
    ) -> Result<Option<Notification>, NotifierError> {
        if envelope.aggregate_type() != REQUISITION_AGGREGATE {
            return Ok(None);
        }

        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();
        let last = self.cursor(aggregate_id);

        if seq == 0 {
            return Err(NotifierError::NonMonotonicSequence { last, found: seq });
        }
        if seq <= last {
            tracing::debug!(%aggregate_id, seq, "skipping replayed envelope");
            return Ok(None);
        }
        if seq != last + 1 && last != 0 {
            return Err(NotifierError::NonMonotonicSequence { last, found: seq });
        }

        let event = envelope.payload();
        if *event.requisition_id().as_uuid() != aggregate_id {
            return Err(NotifierError::AggregateMismatch);
        }

        // Submission notices are raised once per submitted batch by the caller.
        match event {
            RequisitionEvent::Submitted(_) => {
                self.update_cursor(aggregate_id, seq);
                Ok(None)
            }
            RequisitionEvent::Processed(e) => {
                let n = processed_notice(e);
                self.store.insert_notification(n.clone()).await?;
                if e.to.is_terminal() {
                    self.forget(aggregate_id);
                } else {
                    self.update_cursor(aggregate_id, seq);
                }
                Ok(Some(n))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sparekeep_core::{RequisitionId, UserId};
    use sparekeep_requisitions::{
        RequisitionCategory, RequisitionProcessed, RequisitionStatus,
    };

    use crate::store::InMemoryStore;

    fn processed(id: RequisitionId, requested_by: UserId) -> RequisitionEvent {
        processed_to(id, requested_by, RequisitionStatus::Approved)
    }

    fn processed_to(id: RequisitionId, requested_by: UserId, to: RequisitionStatus) -> RequisitionEvent {
        RequisitionEvent::Processed(RequisitionProcessed {
            requisition_id: id,
            category: RequisitionCategory::Service,
            from: RequisitionStatus::Pending,
            to,
            erp_request_number: None,
            processed_by: UserId::new(),
            requested_by,
            occurred_at: Utc::now(),
        })
    }

    fn envelope(id: RequisitionId, seq: u64, event: RequisitionEvent) -> EventEnvelope<RequisitionEvent> {
        EventEnvelope::new(*id.as_uuid(), REQUISITION_AGGREGATE, seq, UserId::new(), event)
    }

    #[tokio::test]
    async fn processed_event_notifies_requester_once() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = RequisitionNotifier::new(store.clone());
        let requester = UserId::new();
        let id = RequisitionId::new();
        let env = envelope(id, 2, processed(id, requester));

        let n = notifier.apply_envelope(&env).await.unwrap().unwrap();
        assert_eq!(n.user_id, requester);
        assert_eq!(n.title, "Status update: Approved");

        // Replay is ignored.
        assert!(notifier.apply_envelope(&env).await.unwrap().is_none());
        assert_eq!(store.list_notifications(requester).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sequence_gaps_are_rejected() {
        let notifier = RequisitionNotifier::new(Arc::new(InMemoryStore::new()));
        let id = RequisitionId::new();
        let requester = UserId::new();

        notifier.apply_envelope(&envelope(id, 1, processed(id, requester))).await.unwrap();
        let err = notifier
            .apply_envelope(&envelope(id, 3, processed(id, requester)))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifierError::NonMonotonicSequence { last: 1, found: 3 }));
    }

    #[tokio::test]
    async fn mismatched_aggregate_is_rejected() {
        let notifier = RequisitionNotifier::new(Arc::new(InMemoryStore::new()));
        let env = envelope(RequisitionId::new(), 1, processed(RequisitionId::new(), UserId::new()));
        assert!(matches!(
            notifier.apply_envelope(&env).await,
            Err(NotifierError::AggregateMismatch)
        ));
    }

    #[tokio::test]
    async fn terminal_status_releases_the_stream() {
        let notifier = RequisitionNotifier::new(Arc::new(InMemoryStore::new()));
        let requester = UserId::new();
        let open = RequisitionId::new();
        let closed = RequisitionId::new();

        notifier.apply_envelope(&envelope(open, 2, processed(open, requester))).await.unwrap();
        notifier
            .apply_envelope(&envelope(closed, 2, processed(closed, requester)))
            .await
            .unwrap();
        assert_eq!(notifier.tracked_streams(), 2);

        let rejected = processed_to(closed, requester, RequisitionStatus::Rejected);
        let n = notifier.apply_envelope(&envelope(closed, 3, rejected)).await.unwrap().unwrap();
        assert_eq!(n.title, "Status update: Rejected");
        assert_eq!(notifier.tracked_streams(), 1);
    }

    #[tokio::test]
    async fn envelope_is_retried_after_store_failure() {
        let store = Arc::new(InMemoryStore::new());
        let notifier = RequisitionNotifier::new(store.clone());
        let requester = UserId::new();
        let id = RequisitionId::new();
        let env = envelope(id, 2, processed(id, requester));

        store.set_available(false);
        assert!(matches!(
            notifier.apply_envelope(&env).await,
            Err(NotifierError::Store(StoreError::Unavailable(_)))
        ));
        assert_eq!(notifier.tracked_streams(), 0);

        store.set_available(true);
        assert!(notifier.apply_envelope(&env).await.unwrap().is_some());
        assert_eq!(store.list_notifications(requester).await.unwrap().len(), 1);
    }
}
