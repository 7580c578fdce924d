//! Infrastructure layer: store adapters, command dispatch, event consumers.

pub mod dispatcher;
pub mod fetch;
pub mod notifier;
pub mod store;

pub use dispatcher::{DispatchError, Dispatched, REQUISITION_AGGREGATE, RequisitionDispatcher};
pub use fetch::FetchState;
pub use notifier::{NotifierError, RequisitionNotifier};
pub use store::{InMemoryStore, PartStore, StoreError, StoreResult};

#[cfg(feature = "postgres")]
pub use store::PostgresStore;
