//! Stock status classification.

use serde::{Deserialize, Serialize};

/// Derived stock status of a part. Never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Nothing on hand.
    Critical,
    /// Some stock, at or below the replenishment threshold.
    LowStock,
    /// Above the replenishment threshold.
    InStock,
}

impl StockStatus {
    /// Display rank: lower sorts first.
    pub fn sort_weight(&self) -> u8 {
        match self {
            StockStatus::Critical => 0,
            StockStatus::LowStock => 1,
            StockStatus::InStock => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }

    /// Whether the status belongs on the replenishment alert board.
    pub fn is_alert(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }

    pub fn badge(self) -> StockBadge {
        StockBadge {
            status: self,
            label: self.label(),
            sort_weight: self.sort_weight(),
        }
    }
}

impl core::str::FromStr for StockStatus {
    type Err = sparekeep_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(StockStatus::Critical),
            "low_stock" | "low" => Ok(StockStatus::LowStock),
            "in_stock" => Ok(StockStatus::InStock),
            other => Err(sparekeep_core::DomainError::unknown_label("stock status", other)),
        }
    }
}

/// Rendering shape for a status: `{status, label, sort_weight}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct StockBadge {
    pub status: StockStatus,
    pub label: &'static str,
    pub sort_weight: u8,
}

/// Classify a part's stock. First match wins:
///
/// 1. `quantity == 0` → [`StockStatus::Critical`]
/// 2. `quantity <= min_quantity` → [`StockStatus::LowStock`]
/// 3. otherwise → [`StockStatus::InStock`]
pub fn classify(quantity: u32, min_quantity: u32) -> StockStatus {
    if quantity == 0 {
        StockStatus::Critical
    } else if quantity <= min_quantity {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}
