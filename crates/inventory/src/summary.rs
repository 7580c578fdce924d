//! Dashboard figures over a catalog snapshot.

use serde::Serialize;

use crate::alerts::{AlertBoard, AlertEntry};
use crate::part::Part;
use crate::stock::StockStatus;

/// Alert rows shown on the dashboard.
pub const TOP_ALERTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_parts: usize,
    pub critical: usize,
    pub low_stock: usize,
    /// Σ unit cost × quantity, saturating.
    pub total_value_cents: i64,
    pub top_alerts: Vec<AlertEntry>,
}

impl InventorySummary {
    pub fn from_parts(parts: &[Part]) -> Self {
        let mut critical = 0;
        let mut low_stock = 0;
        let mut total_value_cents: i64 = 0;

        for part in parts {
            match part.status() {
                StockStatus::Critical => critical += 1,
                StockStatus::LowStock => low_stock += 1,
                StockStatus::InStock => {}
            }
            total_value_cents = total_value_cents.saturating_add(part.stock_value_cents());
        }

        let board = AlertBoard::from_parts(parts.iter().cloned());
        let top_alerts = board.entries().iter().take(TOP_ALERTS).cloned().collect();

        Self {
            total_parts: parts.len(),
            critical,
            low_stock,
            total_value_cents,
            top_alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Category;
    use sparekeep_core::PartId;

    #[test]
    fn counts_value_and_caps_alert_list() {
        let mut parts: Vec<Part> = (0..7)
            .map(|i| {
                Part::new(PartId::new(), format!("SKU-{i}"), format!("Part {i}"), Category::Supplies)
                    .with_stock(i, 10)
                    .with_unit_cost(100)
            })
            .collect();
        parts.push(
            Part::new(PartId::new(), "MTR-552-X", "WEG motor 5HP", Category::Mechanical)
                .with_stock(4, 2)
                .with_unit_cost(125_000),
        );

        let summary = InventorySummary::from_parts(&parts);

        assert_eq!(summary.total_parts, 8);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.low_stock, 6);
        assert_eq!(summary.total_value_cents, 21 * 100 + 500_000);
        assert_eq!(summary.top_alerts.len(), TOP_ALERTS);
        assert_eq!(summary.top_alerts[0].part.quantity, 0);
    }

    #[test]
    fn empty_catalog_is_all_zero() {
        assert_eq!(InventorySummary::from_parts(&[]), InventorySummary::default());
    }
}
