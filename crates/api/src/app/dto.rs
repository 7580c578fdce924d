//! Request/response DTOs and JSON mapping helpers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use sparekeep_auth::{AccountStatus, UserProfile};
use sparekeep_inventory::{AlertBoard, AlertEntry, Movement, Part, StockBadge, StockStatus};
use sparekeep_requisitions::{
    DEFAULT_SERVICE_CODE, MaterialDraft, Priority, RequisitionCategory, RequisitionStatus,
    ServiceItem, ServiceScopeDraft, ServiceType, WorkOrder,
};

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user: UserProfile,
    pub permissions: Vec<String>,
}

impl From<&UserProfile> for WhoAmIResponse {
    fn from(user: &UserProfile) -> Self {
        Self {
            user: user.clone(),
            permissions: user
                .role
                .permissions()
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parts & alerts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PartDetailsResponse {
    pub part: Part,
    pub stock: StockBadge,
    pub available: bool,
    /// Newest first.
    pub movements: Vec<Movement>,
}

#[derive(Debug, Serialize)]
pub struct AlertRow {
    pub part: Part,
    pub status: StockStatus,
    pub label: &'static str,
    pub sort_weight: u8,
}

impl From<&AlertEntry> for AlertRow {
    fn from(entry: &AlertEntry) -> Self {
        Self {
            part: entry.part.clone(),
            status: entry.badge.status,
            label: entry.badge.label,
            sort_weight: entry.badge.sort_weight,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub critical: usize,
    pub low_stock: usize,
    pub alerts: Vec<AlertRow>,
}

impl From<&AlertBoard> for AlertsResponse {
    fn from(board: &AlertBoard) -> Self {
        Self {
            critical: board.critical_count(),
            low_stock: board.low_stock_count(),
            alerts: board.entries().iter().map(AlertRow::from).collect(),
        }
    }
}

/// Selection toggles over the current alert board, in click order. An id
/// listed twice is toggled off again.
#[derive(Debug, Deserialize)]
pub struct AlertRequisitionRequest {
    #[serde(default)]
    pub part_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertRequisitionResponse {
    /// Comma-joined hand-off (`id1,id2`).
    pub handoff: String,
    pub draft: MaterialDraft,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requisitions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RequisitionsQuery {
    pub category: Option<RequisitionCategory>,
    pub status: Option<RequisitionStatus>,
}

#[derive(Debug, Deserialize)]
pub struct DraftQuery {
    /// Comma-joined part ids, as produced by the alert board.
    pub parts: String,
}

#[derive(Debug, Deserialize)]
pub struct MaterialLineRequest {
    pub part_id: String,
    /// Defaults to the draft's suggested quantity.
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialRequisitionRequest {
    pub lines: Vec<MaterialLineRequest>,
    pub priority: Priority,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub work_order: Option<WorkOrder>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceItemRequest {
    #[serde(default)]
    pub code: Option<String>,
    pub description: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub estimated_value_cents: i64,
}

impl From<ServiceItemRequest> for ServiceItem {
    fn from(req: ServiceItemRequest) -> Self {
        let mut item = ServiceItem::new(req.description);
        item.code = req.code.unwrap_or_else(|| DEFAULT_SERVICE_CODE.to_string());
        if let Some(quantity) = req.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = req.unit {
            item.unit = unit;
        }
        item.estimated_value_cents = req.estimated_value_cents;
        item
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequisitionRequest {
    pub work_order: WorkOrder,
    pub priority: Priority,
    #[serde(default)]
    pub justification: String,
    pub items: Vec<ServiceItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequisitionRequest {
    pub status: RequisitionStatus,
    #[serde(default)]
    pub erp_request_number: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Service scopes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ServiceScopeRequest {
    pub title: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(default)]
    pub suppliers: String,
    /// Step texts in execution order.
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub safety_norms: String,
    #[serde(default)]
    pub documentation: String,
}

impl ServiceScopeRequest {
    /// Draft with every field but the steps, which go through `add_step`.
    pub fn into_draft(self) -> (ServiceScopeDraft, Vec<String>) {
        let mut draft = ServiceScopeDraft::new(self.title, self.service_type);
        draft.date = self.date;
        draft.location = self.location;
        draft.suppliers = self.suppliers;
        draft.safety_norms = self.safety_norms;
        draft.documentation = self.documentation;
        (draft, self.steps)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserStatusRequest {
    pub status: AccountStatus,
}
