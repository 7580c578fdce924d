//! Requisitions domain module (purchase and service requests).
//!
//! Business rules for composing, submitting and processing requisitions,
//! implemented as deterministic domain logic (no IO, no HTTP, no storage).

pub mod batch;
pub mod draft;
pub mod notification;
pub mod requisition;
pub mod scope;

pub use batch::{DEFAULT_SERVICE_CODE, ServiceBatch, ServiceItem};
pub use draft::{MaterialDraft, MaterialDraftLine};
pub use notification::{Notification, NotificationKind, processed_notice, submission_notice};
pub use requisition::{
    Priority, ProcessRequisition, Requisition, RequisitionCategory, RequisitionCommand,
    RequisitionEvent, RequisitionProcessed, RequisitionSnapshot, RequisitionStatus,
    RequisitionSubject, RequisitionSubmitted, SubmitRequisition, WorkOrder, WorkOrderKind,
};
pub use scope::{ScopeStatus, ScopeStep, ServiceScope, ServiceScopeDraft, ServiceType};
