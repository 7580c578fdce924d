//! `sparekeep-core`: domain foundation building blocks.
//!
//! Pure domain primitives shared by the inventory, requisition and auth
//! crates. Nothing in here performs IO.

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{MovementId, NotificationId, PartId, RequisitionId, ServiceScopeId, UserId};
