//! User notifications raised by requisition activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparekeep_core::{NotificationId, UserId};

use crate::requisition::{
    Priority, RequisitionCategory, RequisitionProcessed, RequisitionSubject, RequisitionSubmitted,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at,
        }
    }
}

/// Notice for the requester after submitting one or more requisitions
/// together. Returns `None` for an empty slice.
pub fn submission_notice(submitted: &[RequisitionSubmitted]) -> Option<Notification> {
    let first = submitted.first()?;
    let category = first.subject.category();
    let noun = match category {
        RequisitionCategory::Material => "material",
        RequisitionCategory::Service => "service",
    };

    let work_order = first
        .work_order
        .as_ref()
        .map(|wo| wo.number.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or("N/A");

    let (title, message) = if submitted.len() == 1 {
        let what = match &first.subject {
            RequisitionSubject::Material { part_name, sku, .. } => format!("{part_name} ({sku})"),
            RequisitionSubject::Service { description, .. } => description.clone(),
        };
        (
            format!("New {noun} requisition"),
            format!("Request for {what} (WO: {work_order}) submitted."),
        )
    } else {
        (
            format!("New {noun} requisition batch"),
            format!(
                "Batch request of {} {noun}s (WO: {work_order}) submitted.",
                submitted.len()
            ),
        )
    };

    let kind = if submitted.iter().any(|s| s.priority == Priority::Urgent) {
        NotificationKind::Critical
    } else {
        NotificationKind::Info
    };

    Some(Notification::new(
        first.requested_by,
        title,
        message,
        kind,
        first.occurred_at,
    ))
}

/// Notice for the original requester when their requisition changes status.
pub fn processed_notice(processed: &RequisitionProcessed) -> Notification {
    let noun = match processed.category {
        RequisitionCategory::Material => "material",
        RequisitionCategory::Service => "service",
    };

    let mut message = format!(
        "Your {noun} requisition was updated to: {}.",
        processed.to
    );
    if let Some(erp) = &processed.erp_request_number {
        message.push_str(&format!(" ERP request/order no.: {erp}"));
    }

    Notification::new(
        processed.requested_by,
        format!("Status update: {}", processed.to),
        message,
        NotificationKind::Info,
        processed.occurred_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requisition::{RequisitionStatus, WorkOrder, WorkOrderKind};
    use sparekeep_core::RequisitionId;

    fn service(description: &str, priority: Priority, requested_by: UserId) -> RequisitionSubmitted {
        RequisitionSubmitted {
            requisition_id: RequisitionId::new(),
            subject: RequisitionSubject::Service {
                code: "2014160".to_string(),
                description: description.to_string(),
            },
            quantity: 1,
            unit: "UN".to_string(),
            priority,
            justification: String::new(),
            work_order: Some(WorkOrder {
                number: String::new(),
                kind: WorkOrderKind::Corrective,
                usage_area: "Boiler room".to_string(),
                project_number: None,
                asset_number: None,
            }),
            estimated_value_cents: 0,
            requested_by,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn empty_submission_has_no_notice() {
        assert!(submission_notice(&[]).is_none());
    }

    #[test]
    fn single_submission_names_the_item() {
        let user = UserId::new();
        let n = submission_notice(&[service("Valve overhaul", Priority::Normal, user)]).unwrap();

        assert_eq!(n.title, "New service requisition");
        assert_eq!(n.message, "Request for Valve overhaul (WO: N/A) submitted.");
        assert_eq!(n.kind, NotificationKind::Info);
        assert_eq!(n.user_id, user);
        assert!(!n.read);
    }

    #[test]
    fn urgent_batch_is_critical() {
        let user = UserId::new();
        let batch = [
            service("Valve overhaul", Priority::Urgent, user),
            service("Pump seal", Priority::Urgent, user),
        ];
        let n = submission_notice(&batch).unwrap();

        assert_eq!(n.title, "New service requisition batch");
        assert!(n.message.starts_with("Batch request of 2 services"));
        assert_eq!(n.kind, NotificationKind::Critical);
    }

    #[test]
    fn processed_notice_goes_to_requester_with_erp_number() {
        let requester = UserId::new();
        let processed = RequisitionProcessed {
            requisition_id: RequisitionId::new(),
            category: RequisitionCategory::Material,
            from: RequisitionStatus::Pending,
            to: RequisitionStatus::RequisitionIssued,
            erp_request_number: Some("RC-4410".to_string()),
            processed_by: UserId::new(),
            requested_by: requester,
            occurred_at: Utc::now(),
        };

        let n = processed_notice(&processed);
        assert_eq!(n.user_id, requester);
        assert_eq!(n.title, "Status update: Requisition issued");
        assert!(n.message.ends_with("ERP request/order no.: RC-4410"));
    }
}
