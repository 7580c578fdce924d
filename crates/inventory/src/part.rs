use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sparekeep_core::{DomainError, PartId};

use crate::stock::{StockStatus, classify};

/// Catalog category of a part.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Mechanical,
    Electrical,
    Hydraulic,
    Transmission,
    Lubricants,
    Supplies,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Mechanical,
        Category::Electrical,
        Category::Hydraulic,
        Category::Transmission,
        Category::Lubricants,
        Category::Supplies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mechanical => "mechanical",
            Category::Electrical => "electrical",
            Category::Hydraulic => "hydraulic",
            Category::Transmission => "transmission",
            Category::Lubricants => "lubricants",
            Category::Supplies => "supplies",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::unknown_label("category", s))
    }
}

/// Read-only projection of a catalog part.
///
/// Parts are owned by the hosted store. Stock status is never stored on the
/// part; call [`Part::status`] to derive it from the current quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    pub min_quantity: u32,
    pub location: String,
    pub unit: String,
    /// Unit cost in minor currency units.
    pub unit_cost_cents: i64,
    pub supplier: String,
    pub lead_time_days: u32,
    pub manufacturer: String,
    pub model: String,
    pub specs: BTreeMap<String, String>,
    pub image_url: Option<String>,
}

impl Part {
    /// Minimal part with empty descriptive metadata ("UN" unit).
    pub fn new(id: PartId, sku: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            sku: sku.into(),
            name: name.into(),
            category,
            quantity: 0,
            min_quantity: 0,
            location: String::new(),
            unit: "UN".to_string(),
            unit_cost_cents: 0,
            supplier: String::new(),
            lead_time_days: 0,
            manufacturer: String::new(),
            model: String::new(),
            specs: BTreeMap::new(),
            image_url: None,
        }
    }

    pub fn with_stock(mut self, quantity: u32, min_quantity: u32) -> Self {
        self.quantity = quantity;
        self.min_quantity = min_quantity;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost_cents: i64) -> Self {
        self.unit_cost_cents = unit_cost_cents;
        self
    }

    pub fn status(&self) -> StockStatus {
        classify(self.quantity, self.min_quantity)
    }

    /// Whether at least one unit is on hand.
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }

    /// Value of the stock on hand, saturating on overflow.
    pub fn stock_value_cents(&self) -> i64 {
        self.unit_cost_cents.saturating_mul(i64::from(self.quantity))
    }

    /// Units needed to bring the part back above its threshold (at least one).
    pub fn replenishment_quantity(&self) -> u32 {
        self.min_quantity.saturating_sub(self.quantity).max(1)
    }
}

/// A part row as delivered by the hosted store, before coalescing.
///
/// The store does not enforce non-negative quantities and allows a null
/// threshold; [`PartRecord::into_part`] normalizes both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    pub id: PartId,
    pub sku: String,
    pub name: String,
    pub category: Category,
    pub quantity: i64,
    pub min_quantity: Option<i64>,
    pub location: String,
    pub unit: String,
    pub unit_cost_cents: i64,
    pub supplier: String,
    pub lead_time_days: i64,
    pub manufacturer: String,
    pub model: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    pub image_url: Option<String>,
}

impl PartRecord {
    /// Coalesce a raw row into a [`Part`].
    ///
    /// - null `min_quantity` becomes 0 (the part then alerts only when empty)
    /// - negative counts are clamped to 0
    pub fn into_part(self) -> Part {
        let quantity = clamp_count(self.id, "quantity", self.quantity);
        let min_quantity = clamp_count(self.id, "min_quantity", self.min_quantity.unwrap_or(0));
        let lead_time_days = clamp_count(self.id, "lead_time", self.lead_time_days);

        Part {
            id: self.id,
            sku: self.sku,
            name: self.name,
            category: self.category,
            quantity,
            min_quantity,
            location: self.location,
            unit: self.unit,
            unit_cost_cents: self.unit_cost_cents,
            supplier: self.supplier,
            lead_time_days,
            manufacturer: self.manufacturer,
            model: self.model,
            specs: self.specs,
            image_url: self.image_url,
        }
    }
}

fn clamp_count(id: PartId, field: &'static str, raw: i64) -> u32 {
    match u32::try_from(raw) {
        Ok(v) => v,
        Err(_) if raw < 0 => {
            tracing::warn!(part_id = %id, field, raw, "negative count in part row; clamping to 0");
            0
        }
        Err(_) => u32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: i64, min_quantity: Option<i64>) -> PartRecord {
        PartRecord {
            id: PartId::new(),
            sku: "EL-882-10".to_string(),
            name: "Inductive sensor M12".to_string(),
            category: Category::Electrical,
            quantity,
            min_quantity,
            location: "Central store".to_string(),
            unit: "UN".to_string(),
            unit_cost_cents: 12_000,
            supplier: String::new(),
            lead_time_days: 2,
            manufacturer: String::new(),
            model: String::new(),
            specs: BTreeMap::new(),
            image_url: None,
        }
    }

    #[test]
    fn null_threshold_coalesces_to_zero() {
        let part = record(3, None).into_part();
        assert_eq!(part.min_quantity, 0);
        assert_eq!(part.status(), StockStatus::InStock);

        let empty = record(0, None).into_part();
        assert_eq!(empty.status(), StockStatus::Critical);
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let part = record(-4, Some(-1)).into_part();
        assert_eq!(part.quantity, 0);
        assert_eq!(part.min_quantity, 0);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Hydraulic".parse::<Category>().unwrap(), Category::Hydraulic);
        assert!("plumbing".parse::<Category>().is_err());
    }

    #[test]
    fn replenishment_quantity_is_at_least_one() {
        let p = Part::new(PartId::new(), "TR-102-99", "V-belt B-45", Category::Transmission);
        assert_eq!(p.clone().with_stock(2, 4).replenishment_quantity(), 2);
        assert_eq!(p.clone().with_stock(4, 4).replenishment_quantity(), 1);
        assert_eq!(p.with_stock(9, 0).replenishment_quantity(), 1);
    }

    #[test]
    fn stock_value_multiplies_cost_by_quantity() {
        let p = Part::new(PartId::new(), "BR-045-22", "Bearing 6204", Category::Mechanical)
            .with_stock(12, 5)
            .with_unit_cost(4_500);
        assert_eq!(p.stock_value_cents(), 54_000);
    }
}
