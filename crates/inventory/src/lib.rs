//! Inventory domain module.
//!
//! Stock classification, replenishment alerts and catalog queries, implemented
//! as deterministic functions over a snapshot of parts fetched from the hosted
//! store (no IO, no HTTP, no storage).

pub mod alerts;
pub mod catalog;
pub mod movement;
pub mod part;
pub mod selection;
pub mod stock;
pub mod summary;

pub use alerts::{AlertBoard, AlertEntry, aggregate_alerts};
pub use catalog::CatalogFilter;
pub use movement::{Movement, MovementKind, history_for};
pub use part::{Category, Part, PartRecord};
pub use selection::{AlertSelection, RequisitionHandoff, SelectionState};
pub use stock::{StockBadge, StockStatus, classify};
pub use summary::InventorySummary;
