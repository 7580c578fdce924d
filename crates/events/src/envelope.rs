use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sparekeep_core::UserId;

use crate::event::Event;

/// Envelope for an event published on the bus.
///
/// `sequence_number` is the aggregate version after the event was applied,
/// so consumers can drop replays per aggregate stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    event_type: String,
    occurred_at: DateTime<Utc>,

    aggregate_id: Uuid,
    aggregate_type: String,
    sequence_number: u64,

    /// User whose action produced the event.
    actor: UserId,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        actor: UserId,
        event: E,
    ) -> Self
    where
        E: Event,
    {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.event_type().to_string(),
            occurred_at: event.occurred_at(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            actor,
            payload: event,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn aggregate_id(&self) -> Uuid {
        self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
