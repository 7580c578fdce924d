//! Outcome of an asynchronous catalog fetch.

use serde::Serialize;

use sparekeep_inventory::{AlertBoard, Part};

/// State of a pending or finished fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    /// Generic failure; the detail is for logs, not for users.
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn from_result<E: core::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => FetchState::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed");
                FetchState::Failed(e.to_string())
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl FetchState<Vec<Part>> {
    /// Alert board for the snapshot; loading and failed fetches yield an
    /// empty board.
    pub fn alert_board(&self) -> AlertBoard {
        match self {
            FetchState::Ready(parts) => AlertBoard::from_parts(parts.iter().cloned()),
            FetchState::Loading | FetchState::Failed(_) => AlertBoard::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::demo::demo_parts;
    use crate::store::StoreError;

    #[test]
    fn failed_fetch_yields_empty_board() {
        let state: FetchState<Vec<Part>> =
            FetchState::from_result(Err(StoreError::Unavailable("timeout".to_string())));

        assert!(matches!(state, FetchState::Failed(_)));
        let board = state.alert_board();
        assert!(board.is_empty());
        assert_eq!(board.critical_count(), 0);
        assert_eq!(board.low_stock_count(), 0);
    }

    #[test]
    fn loading_yields_empty_board() {
        let state = FetchState::<Vec<Part>>::Loading;
        assert!(state.is_loading());
        assert!(state.alert_board().is_empty());
    }

    #[test]
    fn ready_snapshot_is_aggregated() {
        let state = FetchState::from_result(Ok::<_, StoreError>(demo_parts()));
        assert_eq!(state.ready().map(Vec::len), Some(5));
        assert_eq!(state.alert_board().len(), 3);
    }
}
