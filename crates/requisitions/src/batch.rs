//! Service requisition batches: several service lines under one work order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparekeep_core::{DomainError, RequisitionId, UserId};

use crate::requisition::{
    Priority, RequisitionSubject, SubmitRequisition, WorkOrder, WorkOrderKind, is_blank,
};

/// Service code pre-selected for new lines (specialized services).
pub const DEFAULT_SERVICE_CODE: &str = "2014160";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit: String,
    pub estimated_value_cents: i64,
}

impl ServiceItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            code: DEFAULT_SERVICE_CODE.to_string(),
            description: description.into(),
            quantity: 1,
            unit: "UN".to_string(),
            estimated_value_cents: 0,
        }
    }
}

/// Service lines sharing work order, priority and justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBatch {
    pub work_order: WorkOrder,
    pub priority: Priority,
    pub justification: String,
    items: Vec<ServiceItem>,
}

impl ServiceBatch {
    pub fn new(work_order: WorkOrder, priority: Priority, justification: impl Into<String>) -> Self {
        Self {
            work_order,
            priority,
            justification: justification.into(),
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[ServiceItem] {
        &self.items
    }

    pub fn add_item(&mut self, item: ServiceItem) -> Result<(), DomainError> {
        if item.description.trim().is_empty() {
            return Err(DomainError::invalid("description", "describe the service before adding it"));
        }
        if item.quantity == 0 {
            return Err(DomainError::invalid("quantity", "quantity must be positive"));
        }
        if item.estimated_value_cents < 0 {
            return Err(DomainError::invalid("estimated_value_cents", "estimated value cannot be negative"));
        }

        self.items.push(item);
        Ok(())
    }

    /// Remove the line at `index`, if any.
    pub fn remove_item(&mut self, index: usize) -> Option<ServiceItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn total_estimated_value_cents(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.estimated_value_cents))
    }

    /// Validate the header and expand into one submit command per line.
    pub fn submit(
        &self,
        requested_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Result<Vec<SubmitRequisition>, DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::invalid("items", "add at least one service before submitting"));
        }
        if self.work_order.usage_area.trim().is_empty() {
            return Err(DomainError::invalid("work_order.usage_area", "usage area is required"));
        }
        self.work_order.validate()?;

        let mut work_order = self.work_order.clone();
        if work_order.kind != WorkOrderKind::Project {
            work_order.project_number = None;
        }
        if is_blank(work_order.asset_number.as_deref()) {
            work_order.asset_number = None;
        }

        Ok(self
            .items
            .iter()
            .map(|item| SubmitRequisition {
                requisition_id: RequisitionId::new(),
                subject: RequisitionSubject::Service {
                    code: item.code.clone(),
                    description: item.description.trim().to_string(),
                },
                quantity: item.quantity,
                unit: item.unit.clone(),
                priority: self.priority,
                justification: self.justification.clone(),
                work_order: Some(work_order.clone()),
                estimated_value_cents: item.estimated_value_cents,
                requested_by,
                occurred_at,
            })
            .collect())
    }
}
