//! Catalog listing filters.

use serde::Deserialize;

use crate::part::{Category, Part};
use crate::stock::StockStatus;

/// Filter applied to a catalog snapshot. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    /// Case-insensitive substring over name or SKU.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub status: Option<StockStatus>,
}

impl CatalogFilter {
    pub fn matches(&self, part: &Part) -> bool {
        self.matches_search(part)
            && self.category.is_none_or(|c| part.category == c)
            && self.status.is_none_or(|s| part.status() == s)
    }

    fn matches_search(&self, part: &Part) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        part.name.to_lowercase().contains(&term) || part.sku.to_lowercase().contains(&term)
    }

    /// Matching parts in snapshot order.
    pub fn apply<'a, I>(&self, parts: I) -> Vec<Part>
    where
        I: IntoIterator<Item = &'a Part>,
    {
        parts.into_iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparekeep_core::PartId;

    fn catalog() -> Vec<Part> {
        vec![
            Part::new(PartId::new(), "BR-045-22", "SKF 6204 bearing", Category::Mechanical).with_stock(12, 5),
            Part::new(PartId::new(), "TR-102-99", "V-belt B-45", Category::Transmission).with_stock(2, 4),
            Part::new(PartId::new(), "EL-882-10", "Inductive sensor M12", Category::Electrical).with_stock(0, 2),
            Part::new(PartId::new(), "LU-101-20L", "Hydraulic oil ISO 68", Category::Lubricants).with_stock(40, 50),
        ]
    }

    #[test]
    fn default_filter_matches_everything() {
        let parts = catalog();
        assert_eq!(CatalogFilter::default().apply(&parts).len(), parts.len());
    }

    #[test]
    fn search_covers_name_and_sku_ignoring_case() {
        let parts = catalog();
        let by_name = CatalogFilter {
            search: Some("BELT".to_string()),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&parts)[0].sku, "TR-102-99");

        let by_sku = CatalogFilter {
            search: Some("el-882".to_string()),
            ..Default::default()
        };
        assert_eq!(by_sku.apply(&parts)[0].name, "Inductive sensor M12");

        let blank = CatalogFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.apply(&parts).len(), 4);
    }

    #[test]
    fn status_filter_uses_classifier() {
        let parts = catalog();
        let low = CatalogFilter {
            status: Some(StockStatus::LowStock),
            ..Default::default()
        };
        let names: Vec<_> = low.apply(&parts).into_iter().map(|p| p.sku).collect();
        assert_eq!(names, vec!["TR-102-99", "LU-101-20L"]);

        let critical = CatalogFilter {
            status: Some(StockStatus::Critical),
            category: Some(Category::Electrical),
            ..Default::default()
        };
        assert_eq!(critical.apply(&parts).len(), 1);
    }
}
