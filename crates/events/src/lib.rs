//! Domain events and their in-process distribution.
//!
//! Requisition decisions produce events; the infra layer wraps them in an
//! [`EventEnvelope`] and publishes them on an [`EventBus`] so notification
//! and realtime consumers can react without the aggregate knowing about them.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{BusError, InMemoryEventBus};
