//! Replenishment alert aggregation.

use serde::Serialize;

use crate::part::Part;
use crate::stock::{StockBadge, StockStatus};

/// Filter a parts snapshot down to those at or below threshold, stockouts first.
///
/// The sort is two-key and stable: zero-quantity parts precede every non-zero
/// part, then quantity ascending. Parts equal on both keys keep their input
/// order. Distance below threshold is deliberately not a key.
pub fn aggregate_alerts<I>(parts: I) -> Vec<Part>
where
    I: IntoIterator<Item = Part>,
{
    let mut alerts: Vec<Part> = parts
        .into_iter()
        .filter(|p| p.quantity <= p.min_quantity)
        .collect();

    alerts.sort_by_key(|p| (p.quantity != 0, p.quantity));
    alerts
}

/// One row of the alert board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEntry {
    pub part: Part,
    pub badge: StockBadge,
}

/// Ordered alert board plus its derived counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertBoard {
    entries: Vec<AlertEntry>,
}

impl AlertBoard {
    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Part>,
    {
        let entries = aggregate_alerts(parts)
            .into_iter()
            .map(|part| {
                let badge = part.status().badge();
                AlertEntry { part, badge }
            })
            .collect();

        Self { entries }
    }

    /// Board for a snapshot that could not be fetched: no alerts.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AlertEntry] {
        &self.entries
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.entries.iter().map(|e| &e.part)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &sparekeep_core::PartId) -> bool {
        self.entries.iter().any(|e| &e.part.id == id)
    }

    /// Parts on the board with nothing on hand.
    pub fn critical_count(&self) -> usize {
        self.parts().filter(|p| p.quantity == 0).count()
    }

    /// Parts on the board with some stock left.
    pub fn low_stock_count(&self) -> usize {
        self.parts().filter(|p| p.quantity > 0).count()
    }

    pub fn count_of(&self, status: StockStatus) -> usize {
        self.entries.iter().filter(|e| e.badge.status == status).count()
    }
}
