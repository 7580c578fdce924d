//! Bulk selection of alert rows into a single requisition hand-off.

use serde::{Deserialize, Serialize};

use sparekeep_core::{DomainError, PartId};

/// Lifecycle of an [`AlertSelection`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Empty,
    HasSelection,
    /// Terminal: the ids were handed to the requisition composer.
    Committed,
}

/// Selection set over part ids, kept in the order the user picked them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSelection {
    ids: Vec<PartId>,
    committed: bool,
}

impl AlertSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        if self.committed {
            SelectionState::Committed
        } else if self.ids.is_empty() {
            SelectionState::Empty
        } else {
            SelectionState::HasSelection
        }
    }

    pub fn ids(&self) -> &[PartId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove `id` if selected, add it otherwise. Returns whether `id` is
    /// selected afterwards. Ignored once committed.
    pub fn toggle(&mut self, id: PartId) -> bool {
        if self.committed {
            tracing::debug!(part_id = %id, "toggle ignored on committed selection");
            return false;
        }

        match self.ids.iter().position(|x| *x == id) {
            Some(idx) => {
                self.ids.remove(idx);
                false
            }
            None => {
                self.ids.push(id);
                true
            }
        }
    }

    /// Drop every selected id. Ignored once committed.
    pub fn clear(&mut self) {
        if !self.committed {
            self.ids.clear();
        }
    }

    /// Hand the selection off to the requisition composer.
    ///
    /// Returns `None` (and changes nothing) when the selection is empty or was
    /// already committed.
    pub fn commit(&mut self) -> Option<RequisitionHandoff> {
        if self.state() != SelectionState::HasSelection {
            return None;
        }

        self.committed = true;
        Some(RequisitionHandoff {
            part_ids: self.ids.clone(),
        })
    }
}

/// Part ids routed to the requisition-creation surface.
///
/// The wire form is the comma-joined id list (`id1,id2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionHandoff {
    pub part_ids: Vec<PartId>,
}

impl RequisitionHandoff {
    pub fn joined(&self) -> String {
        self.to_string()
    }
}

impl core::fmt::Display for RequisitionHandoff {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, id) in self.part_ids.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            core::fmt::Display::fmt(id, f)?;
        }
        Ok(())
    }
}

impl core::str::FromStr for RequisitionHandoff {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let part_ids = s
            .split(',')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::parse::<PartId>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { part_ids })
    }
}
