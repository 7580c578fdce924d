//! Requisition command dispatch: load, decide, save, publish.

use std::sync::Arc;

use thiserror::Error;

use sparekeep_core::{Aggregate, DomainError, ExpectedVersion, RequisitionId, UserId};
use sparekeep_events::{EventBus, EventEnvelope};
use sparekeep_requisitions::{Requisition, RequisitionCommand, RequisitionEvent, RequisitionSnapshot};

use crate::store::{PartStore, StoreError};

pub const REQUISITION_AGGREGATE: &str = "requisitions.requisition";

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requisition refused the command.
    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Saved, but the bus could not take the events.
    #[error("event publication failed: {0}")]
    Publish(String),
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub snapshot: RequisitionSnapshot,
    pub events: Vec<RequisitionEvent>,
}

pub struct RequisitionDispatcher<B> {
    store: Arc<dyn PartStore>,
    bus: B,
}

impl<B> RequisitionDispatcher<B>
where
    B: EventBus<EventEnvelope<RequisitionEvent>>,
{
    pub fn new(store: Arc<dyn PartStore>, bus: B) -> Self {
        Self { store, bus }
    }

    /// Run one command against the stored requisition.
    ///
    /// The save expects the version that was loaded, so a concurrent update
    /// surfaces as `StoreError::Conflict`. Events are published only after
    /// the save succeeded.
    #[tracing::instrument(skip(self, command), fields(requisition_id = %id, actor = %actor), err)]
    pub async fn dispatch(
        &self,
        id: RequisitionId,
        command: RequisitionCommand,
        actor: UserId,
    ) -> Result<Dispatched, DispatchError> {
        let mut requisition = match self.store.load_requisition(id).await? {
            Some(snapshot) => Requisition::restore(snapshot),
            None => Requisition::empty(id),
        };
        let loaded = requisition.version();

        let events = requisition.execute(&command)?;
        let snapshot = requisition
            .snapshot()
            .cloned()
            .ok_or(DomainError::NotFound("requisition"))?;
        self.store
            .save_requisition(snapshot.clone(), ExpectedVersion(loaded))
            .await?;

        for (seq, event) in (loaded + 1..).zip(&events) {
            let envelope = EventEnvelope::new(*id.as_uuid(), REQUISITION_AGGREGATE, seq, actor, event.clone());
            let delivered = self
                .bus
                .publish(envelope)
                .map_err(|e| DispatchError::Publish(e.to_string()))?;
            tracing::debug!(sequence = seq, delivered, "requisition event published");
        }

        tracing::info!(status = %snapshot.status, version = snapshot.version, "requisition updated");
        Ok(Dispatched { snapshot, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sparekeep_events::InMemoryEventBus;
    use sparekeep_requisitions::{Priority, ProcessRequisition, RequisitionStatus, SubmitRequisition};

    use crate::store::InMemoryStore;
    use crate::store::demo::demo_parts;

    fn test_dispatcher() -> (
        Arc<InMemoryStore>,
        Arc<InMemoryEventBus<EventEnvelope<RequisitionEvent>>>,
        RequisitionDispatcher<Arc<InMemoryEventBus<EventEnvelope<RequisitionEvent>>>>,
    ) {
        let store = Arc::new(InMemoryStore::seeded());
        let bus = Arc::new(InMemoryEventBus::new());
        let dispatcher = RequisitionDispatcher::new(store.clone(), bus.clone());
        (store, bus, dispatcher)
    }

    fn submit_cmd(requested_by: UserId) -> SubmitRequisition {
        SubmitRequisition::material(&demo_parts()[2], 3, Priority::Urgent, "line stopped", requested_by, Utc::now())
    }

    #[tokio::test]
    async fn submit_then_process_persists_and_publishes() {
        let (store, bus, dispatcher) = test_dispatcher();
        let sub = bus.subscribe();
        let requester = UserId::new();

        let cmd = submit_cmd(requester);
        let id = cmd.requisition_id;
        dispatcher
            .dispatch(id, RequisitionCommand::Submit(cmd), requester)
            .await
            .unwrap();

        let processed = dispatcher
            .dispatch(
                id,
                RequisitionCommand::Process(ProcessRequisition {
                    requisition_id: id,
                    status: RequisitionStatus::AwaitingApproval,
                    erp_request_number: Some("RC-77".to_string()),
                    processed_by: UserId::new(),
                    occurred_at: Utc::now(),
                }),
                UserId::new(),
            )
            .await
            .unwrap();
        assert_eq!(processed.snapshot.version, 2);

        let stored = store.load_requisition(id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequisitionStatus::AwaitingApproval);
        assert_eq!(stored.erp_request_number.as_deref(), Some("RC-77"));

        let first = sub.try_recv().unwrap();
        let second = sub.try_recv().unwrap();
        assert_eq!(first.sequence_number(), 1);
        assert_eq!(second.sequence_number(), 2);
        assert_eq!(second.event_type(), "requisitions.processed");
        assert_eq!(first.actor(), requester);
    }

    #[tokio::test]
    async fn domain_errors_do_not_publish() {
        let (_store, bus, dispatcher) = test_dispatcher();
        let sub = bus.subscribe();
        let id = RequisitionId::new();

        let err = dispatcher
            .dispatch(
                id,
                RequisitionCommand::Process(ProcessRequisition {
                    requisition_id: id,
                    status: RequisitionStatus::Approved,
                    erp_request_number: None,
                    processed_by: UserId::new(),
                    occurred_at: Utc::now(),
                }),
                UserId::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Rejected(DomainError::NotFound("requisition"))));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn store_outage_is_reported() {
        let (store, _bus, dispatcher) = test_dispatcher();
        store.set_available(false);
        let requester = UserId::new();
        let cmd = submit_cmd(requester);

        let err = dispatcher
            .dispatch(cmd.requisition_id, RequisitionCommand::Submit(cmd), requester)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Store(StoreError::Unavailable(_))));
    }
}
