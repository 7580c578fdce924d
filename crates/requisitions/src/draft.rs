//! Material requisition drafts composed from an alert-board hand-off.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sparekeep_core::{DomainError, DomainResult, PartId, UserId};
use sparekeep_inventory::{Part, RequisitionHandoff, StockStatus};

use crate::requisition::{Priority, SubmitRequisition};

/// One pre-filled line of a material draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialDraftLine {
    pub part: Part,
    pub status: StockStatus,
    /// Quantity needed to get back above the threshold (at least one).
    pub suggested_quantity: u32,
}

/// Requisition form state for a batch of parts handed off from the alert board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterialDraft {
    pub lines: Vec<MaterialDraftLine>,
    /// Handed-off ids that are no longer in the catalog.
    pub unknown: Vec<PartId>,
}

impl MaterialDraft {
    /// Resolve the handed-off ids against a catalog snapshot, keeping hand-off
    /// order. Duplicate ids produce a single line.
    pub fn from_handoff(handoff: &RequisitionHandoff, parts: &[Part]) -> Self {
        let mut draft = MaterialDraft::default();

        for id in &handoff.part_ids {
            if draft.lines.iter().any(|l| &l.part.id == id) || draft.unknown.contains(id) {
                continue;
            }

            match parts.iter().find(|p| &p.id == id) {
                Some(part) => draft.lines.push(MaterialDraftLine {
                    status: part.status(),
                    suggested_quantity: part.replenishment_quantity(),
                    part: part.clone(),
                }),
                None => draft.unknown.push(*id),
            }
        }

        draft
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Override the suggested quantity of one line.
    pub fn set_quantity(&mut self, part_id: &PartId, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::invalid("quantity", "quantity must be positive"));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.part.id == part_id)
            .ok_or(DomainError::NotFound("draft line"))?;
        line.suggested_quantity = quantity;
        Ok(())
    }

    /// One submit command per line, sharing priority and justification.
    pub fn into_commands(
        self,
        priority: Priority,
        justification: &str,
        requested_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Vec<SubmitRequisition> {
        self.lines
            .into_iter()
            .map(|line| {
                SubmitRequisition::material(
                    &line.part,
                    line.suggested_quantity,
                    priority,
                    justification,
                    requested_by,
                    occurred_at,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparekeep_inventory::Category;

    fn id(n: u128) -> PartId {
        PartId::from_uuid(uuid::Uuid::from_u128(n))
    }

    fn catalog() -> Vec<Part> {
        vec![
            Part::new(id(1), "TR-102-99", "V-belt B-45", Category::Transmission).with_stock(2, 4),
            Part::new(id(2), "EL-882-10", "Inductive sensor M12", Category::Electrical).with_stock(0, 0),
            Part::new(id(3), "BR-045-22", "SKF 6204 bearing", Category::Mechanical).with_stock(12, 5),
        ]
    }

    #[test]
    fn resolves_lines_in_handoff_order_and_reports_unknown_ids() {
        let handoff = RequisitionHandoff {
            part_ids: vec![id(2), id(9), id(1), id(2)],
        };

        let draft = MaterialDraft::from_handoff(&handoff, &catalog());

        let skus: Vec<_> = draft.lines.iter().map(|l| l.part.sku.as_str()).collect();
        assert_eq!(skus, vec!["EL-882-10", "TR-102-99"]);
        assert_eq!(draft.unknown, vec![id(9)]);
        assert_eq!(draft.lines[0].status, StockStatus::Critical);
    }

    #[test]
    fn suggests_refill_to_threshold_with_floor_of_one() {
        let handoff = RequisitionHandoff {
            part_ids: vec![id(1), id(2)],
        };
        let draft = MaterialDraft::from_handoff(&handoff, &catalog());

        assert_eq!(draft.lines[0].suggested_quantity, 2);
        assert_eq!(draft.lines[1].suggested_quantity, 1);
    }

    #[test]
    fn commands_carry_overridden_quantities() {
        let handoff = RequisitionHandoff {
            part_ids: vec![id(1)],
        };
        let mut draft = MaterialDraft::from_handoff(&handoff, &catalog());
        draft.set_quantity(&id(1), 10).unwrap();
        assert_eq!(draft.set_quantity(&id(3), 10), Err(DomainError::NotFound("draft line")));

        let requester = UserId::new();
        let cmds = draft.into_commands(Priority::Urgent, "restock", requester, Utc::now());

        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].quantity, 10);
        assert_eq!(cmds[0].requested_by, requester);
        assert_eq!(cmds[0].subject.title(), "V-belt B-45");
    }

    #[test]
    fn zero_override_is_rejected_and_keeps_suggestion() {
        let handoff = RequisitionHandoff {
            part_ids: vec![id(1)],
        };
        let mut draft = MaterialDraft::from_handoff(&handoff, &catalog());

        let err = draft.set_quantity(&id(1), 0).unwrap_err();
        assert_eq!(err.field(), Some("quantity"));
        assert_eq!(draft.lines[0].suggested_quantity, 2);
    }

    #[test]
    fn empty_handoff_gives_empty_draft() {
        let draft = MaterialDraft::from_handoff(&RequisitionHandoff { part_ids: vec![] }, &catalog());
        assert!(draft.is_empty());
        assert!(draft.unknown.is_empty());
    }
}
