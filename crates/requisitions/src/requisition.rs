use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sparekeep_core::{Aggregate, DomainError, DomainResult, PartId, RequisitionId, UserId};
use sparekeep_events::Event;
use sparekeep_inventory::Part;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    Urgent,
}

/// Requisition processing lifecycle.
///
/// Statuses are ranked in declaration order; `Rejected` sits outside the
/// ranking and can be reached from any open status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequisitionStatus {
    Pending,
    AwaitingRequisition,
    RequisitionIssued,
    AwaitingApproval,
    Approved,
    AwaitingOrder,
    PurchaseOrderIssued,
    Rejected,
}

impl RequisitionStatus {
    fn rank(self) -> u8 {
        match self {
            RequisitionStatus::Pending => 0,
            RequisitionStatus::AwaitingRequisition => 1,
            RequisitionStatus::RequisitionIssued => 2,
            RequisitionStatus::AwaitingApproval => 3,
            RequisitionStatus::Approved => 4,
            RequisitionStatus::AwaitingOrder => 5,
            RequisitionStatus::PurchaseOrderIssued => 6,
            RequisitionStatus::Rejected => u8::MAX,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequisitionStatus::PurchaseOrderIssued | RequisitionStatus::Rejected
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            RequisitionStatus::Pending => "Pending",
            RequisitionStatus::AwaitingRequisition => "Awaiting requisition",
            RequisitionStatus::RequisitionIssued => "Requisition issued",
            RequisitionStatus::AwaitingApproval => "Awaiting approval",
            RequisitionStatus::Approved => "Approved",
            RequisitionStatus::AwaitingOrder => "Awaiting order",
            RequisitionStatus::PurchaseOrderIssued => "Purchase order issued",
            RequisitionStatus::Rejected => "Rejected",
        }
    }
}

impl core::fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse requisition category used for listing tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequisitionCategory {
    Material,
    Service,
}

/// What is being requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RequisitionSubject {
    Material {
        part_id: PartId,
        part_name: String,
        sku: String,
    },
    Service {
        code: String,
        description: String,
    },
}

impl RequisitionSubject {
    pub fn material(part: &Part) -> Self {
        RequisitionSubject::Material {
            part_id: part.id,
            part_name: part.name.clone(),
            sku: part.sku.clone(),
        }
    }

    pub fn category(&self) -> RequisitionCategory {
        match self {
            RequisitionSubject::Material { .. } => RequisitionCategory::Material,
            RequisitionSubject::Service { .. } => RequisitionCategory::Service,
        }
    }

    /// Human-readable name of the requested item.
    pub fn title(&self) -> &str {
        match self {
            RequisitionSubject::Material { part_name, .. } => part_name,
            RequisitionSubject::Service { description, .. } => description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderKind {
    Corrective,
    Preventive,
    UnplannedCorrective,
    Improvement,
    Project,
}

/// Maintenance work order a requisition is charged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub number: String,
    pub kind: WorkOrderKind,
    pub usage_area: String,
    pub project_number: Option<String>,
    pub asset_number: Option<String>,
}

impl WorkOrder {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.kind == WorkOrderKind::Project && is_blank(self.project_number.as_deref()) {
            return Err(DomainError::invalid(
                "work_order.project_number",
                "project work orders require a project number",
            ));
        }
        Ok(())
    }
}

/// Serializable state of a submitted requisition, as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionSnapshot {
    pub id: RequisitionId,
    pub subject: RequisitionSubject,
    pub quantity: u32,
    pub unit: String,
    pub priority: Priority,
    pub justification: String,
    pub work_order: Option<WorkOrder>,
    pub estimated_value_cents: i64,
    pub requested_by: UserId,
    pub submitted_at: DateTime<Utc>,
    pub status: RequisitionStatus,
    pub erp_request_number: Option<String>,
    pub version: u64,
}

impl RequisitionSnapshot {
    pub fn category(&self) -> RequisitionCategory {
        self.subject.category()
    }
}

/// Aggregate root: Requisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requisition {
    id: RequisitionId,
    state: Option<RequisitionSnapshot>,
    version: u64,
}

impl Requisition {
    /// Create an empty, not-yet-submitted aggregate instance.
    pub fn empty(id: RequisitionId) -> Self {
        Self {
            id,
            state: None,
            version: 0,
        }
    }

    /// Rehydrate from a stored snapshot.
    pub fn restore(snapshot: RequisitionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            version: snapshot.version,
            state: Some(snapshot),
        }
    }

    /// Current state, `None` until submitted.
    pub fn snapshot(&self) -> Option<&RequisitionSnapshot> {
        self.state.as_ref()
    }

    pub fn status(&self) -> Option<RequisitionStatus> {
        self.state.as_ref().map(|s| s.status)
    }
}

/// Command: SubmitRequisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequisition {
    pub requisition_id: RequisitionId,
    pub subject: RequisitionSubject,
    pub quantity: u32,
    pub unit: String,
    pub priority: Priority,
    pub justification: String,
    pub work_order: Option<WorkOrder>,
    pub estimated_value_cents: i64,
    pub requested_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ProcessRequisition (move status, record the ERP request number).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequisition {
    pub requisition_id: RequisitionId,
    pub status: RequisitionStatus,
    /// `None` keeps the current number.
    pub erp_request_number: Option<String>,
    pub processed_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequisitionCommand {
    Submit(SubmitRequisition),
    Process(ProcessRequisition),
}

/// Event: RequisitionSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionSubmitted {
    pub requisition_id: RequisitionId,
    pub subject: RequisitionSubject,
    pub quantity: u32,
    pub unit: String,
    pub priority: Priority,
    pub justification: String,
    pub work_order: Option<WorkOrder>,
    pub estimated_value_cents: i64,
    pub requested_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RequisitionProcessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionProcessed {
    pub requisition_id: RequisitionId,
    pub category: RequisitionCategory,
    pub from: RequisitionStatus,
    pub to: RequisitionStatus,
    pub erp_request_number: Option<String>,
    pub processed_by: UserId,
    pub requested_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequisitionEvent {
    Submitted(RequisitionSubmitted),
    Processed(RequisitionProcessed),
}

impl RequisitionEvent {
    pub fn requisition_id(&self) -> RequisitionId {
        match self {
            RequisitionEvent::Submitted(e) => e.requisition_id,
            RequisitionEvent::Processed(e) => e.requisition_id,
        }
    }
}

impl Event for RequisitionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RequisitionEvent::Submitted(_) => "requisitions.submitted",
            RequisitionEvent::Processed(_) => "requisitions.processed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RequisitionEvent::Submitted(e) => e.occurred_at,
            RequisitionEvent::Processed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Requisition {
    type Id = RequisitionId;
    type Command = RequisitionCommand;
    type Event = RequisitionEvent;

    fn id(&self) -> RequisitionId {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn evolve(&mut self, event: &RequisitionEvent) {
        match event {
            RequisitionEvent::Submitted(e) => {
                self.id = e.requisition_id;
                self.state = Some(RequisitionSnapshot {
                    id: e.requisition_id,
                    subject: e.subject.clone(),
                    quantity: e.quantity,
                    unit: e.unit.clone(),
                    priority: e.priority,
                    justification: e.justification.clone(),
                    work_order: e.work_order.clone(),
                    estimated_value_cents: e.estimated_value_cents,
                    requested_by: e.requested_by,
                    submitted_at: e.occurred_at,
                    status: RequisitionStatus::Pending,
                    erp_request_number: None,
                    version: 0,
                });
            }
            RequisitionEvent::Processed(e) => {
                if let Some(state) = self.state.as_mut() {
                    state.status = e.to;
                    if e.erp_request_number.is_some() {
                        state.erp_request_number = e.erp_request_number.clone();
                    }
                }
            }
        }

        self.version += 1;
        if let Some(state) = self.state.as_mut() {
            state.version = self.version;
        }
    }

    fn decide(&self, command: &RequisitionCommand) -> DomainResult<Vec<RequisitionEvent>> {
        match command {
            RequisitionCommand::Submit(cmd) => self.handle_submit(cmd),
            RequisitionCommand::Process(cmd) => self.handle_process(cmd),
        }
    }
}

impl Requisition {
    fn ensure_requisition_id(&self, requisition_id: RequisitionId) -> DomainResult<()> {
        if self.id != requisition_id {
            return Err(DomainError::invalid(
                "requisition_id",
                "command addresses a different requisition",
            ));
        }
        Ok(())
    }

    fn handle_submit(&self, cmd: &SubmitRequisition) -> DomainResult<Vec<RequisitionEvent>> {
        if self.state.is_some() {
            return Err(DomainError::AlreadyExists("requisition"));
        }
        self.ensure_requisition_id(cmd.requisition_id)?;
        cmd.validate()?;

        Ok(vec![RequisitionEvent::Submitted(RequisitionSubmitted {
            requisition_id: cmd.requisition_id,
            subject: cmd.subject.clone(),
            quantity: cmd.quantity,
            unit: cmd.unit.clone(),
            priority: cmd.priority,
            justification: cmd.justification.trim().to_string(),
            work_order: cmd.work_order.clone(),
            estimated_value_cents: cmd.estimated_value_cents,
            requested_by: cmd.requested_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_process(&self, cmd: &ProcessRequisition) -> DomainResult<Vec<RequisitionEvent>> {
        let Some(state) = self.state.as_ref() else {
            return Err(DomainError::NotFound("requisition"));
        };
        self.ensure_requisition_id(cmd.requisition_id)?;

        let from = state.status;
        let to = cmd.status;
        let refuse = |reason| DomainError::IllegalTransition {
            from: from.label(),
            to: to.label(),
            reason,
        };

        if from.is_terminal() {
            return Err(refuse("requisition is closed"));
        }
        if to == RequisitionStatus::Pending {
            return Err(refuse("requisitions cannot return to pending"));
        }
        if to.rank() < from.rank() {
            return Err(refuse("status cannot move backwards"));
        }

        let erp_request_number = cmd
            .erp_request_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let erp_changed = erp_request_number.is_some()
            && erp_request_number != state.erp_request_number;
        if to == from && !erp_changed {
            return Err(DomainError::invalid("status", "nothing to update"));
        }

        Ok(vec![RequisitionEvent::Processed(RequisitionProcessed {
            requisition_id: cmd.requisition_id,
            category: state.subject.category(),
            from,
            to,
            erp_request_number,
            processed_by: cmd.processed_by,
            requested_by: state.requested_by,
            occurred_at: cmd.occurred_at,
        })])
    }
}

impl SubmitRequisition {
    /// Field checks that do not depend on stored state. Batches run this on
    /// every command before dispatching any of them.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity == 0 {
            return Err(DomainError::invalid("quantity", "quantity must be positive"));
        }
        if self.subject.title().trim().is_empty() {
            return Err(DomainError::invalid("subject", "requested item must be described"));
        }
        if self.estimated_value_cents < 0 {
            return Err(DomainError::invalid(
                "estimated_value_cents",
                "estimated value cannot be negative",
            ));
        }
        if let Some(wo) = &self.work_order {
            wo.validate()?;
        }
        Ok(())
    }

    /// Material request for a catalog part.
    pub fn material(
        part: &Part,
        quantity: u32,
        priority: Priority,
        justification: impl Into<String>,
        requested_by: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            requisition_id: RequisitionId::new(),
            subject: RequisitionSubject::material(part),
            quantity,
            unit: part.unit.clone(),
            priority,
            justification: justification.into(),
            work_order: None,
            estimated_value_cents: part.unit_cost_cents.saturating_mul(i64::from(quantity)),
            requested_by,
            occurred_at,
        }
    }
}

pub(crate) fn is_blank(s: Option<&str>) -> bool {
    s.is_none_or(|s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sparekeep_inventory::Category;

    const ALL_STATUSES: [RequisitionStatus; 8] = [
        RequisitionStatus::Pending,
        RequisitionStatus::AwaitingRequisition,
        RequisitionStatus::RequisitionIssued,
        RequisitionStatus::AwaitingApproval,
        RequisitionStatus::Approved,
        RequisitionStatus::AwaitingOrder,
        RequisitionStatus::PurchaseOrderIssued,
        RequisitionStatus::Rejected,
    ];

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_part() -> Part {
        Part::new(PartId::new(), "TR-102-99", "V-belt B-45", Category::Transmission)
            .with_stock(2, 4)
            .with_unit_cost(8_550)
    }

    fn submitted(requested_by: UserId) -> Requisition {
        let cmd = SubmitRequisition::material(
            &test_part(),
            4,
            Priority::Urgent,
            "Line stopped",
            requested_by,
            test_time(),
        );
        let mut req = Requisition::empty(cmd.requisition_id);
        req.execute(&RequisitionCommand::Submit(cmd)).unwrap();
        req
    }

    fn process_cmd(req: &Requisition, status: RequisitionStatus, erp: Option<&str>) -> RequisitionCommand {
        RequisitionCommand::Process(ProcessRequisition {
            requisition_id: req.id(),
            status,
            erp_request_number: erp.map(str::to_string),
            processed_by: UserId::new(),
            occurred_at: test_time(),
        })
    }

    fn process(req: &Requisition, status: RequisitionStatus, erp: Option<&str>) -> DomainResult<Vec<RequisitionEvent>> {
        req.decide(&process_cmd(req, status, erp))
    }

    fn advance(req: &mut Requisition, status: RequisitionStatus) {
        let cmd = process_cmd(req, status, None);
        req.execute(&cmd).unwrap();
    }

    #[test]
    fn submit_emits_submitted_and_starts_pending() {
        let requester = UserId::new();
        let req = submitted(requester);

        let state = req.snapshot().unwrap();
        assert_eq!(state.status, RequisitionStatus::Pending);
        assert_eq!(state.requested_by, requester);
        assert_eq!(state.quantity, 4);
        assert_eq!(state.estimated_value_cents, 34_200);
        assert_eq!(state.category(), RequisitionCategory::Material);
        assert_eq!(req.version(), 1);
        assert_eq!(state.version, 1);
    }

    #[test]
    fn submitting_twice_is_rejected() {
        let req = submitted(UserId::new());
        let mut cmd = SubmitRequisition::material(&test_part(), 1, Priority::Low, "", UserId::new(), test_time());
        cmd.requisition_id = req.id();

        assert_eq!(
            req.decide(&RequisitionCommand::Submit(cmd)),
            Err(DomainError::AlreadyExists("requisition"))
        );
    }

    #[test]
    fn submit_validates_quantity_and_project_number() {
        let mut cmd = SubmitRequisition::material(&test_part(), 0, Priority::Normal, "", UserId::new(), test_time());
        let req = Requisition::empty(cmd.requisition_id);
        let err = req.decide(&RequisitionCommand::Submit(cmd.clone())).unwrap_err();
        assert_eq!(err.field(), Some("quantity"));

        cmd.quantity = 1;
        cmd.work_order = Some(WorkOrder {
            number: "WO-17".to_string(),
            kind: WorkOrderKind::Project,
            usage_area: "Line A".to_string(),
            project_number: Some("  ".to_string()),
            asset_number: None,
        });
        assert_eq!(cmd.validate().unwrap_err().field(), Some("work_order.project_number"));
    }

    #[test]
    fn processing_unknown_requisition_is_not_found() {
        let req = Requisition::empty(RequisitionId::new());
        assert_eq!(
            process(&req, RequisitionStatus::Approved, None).unwrap_err(),
            DomainError::NotFound("requisition")
        );
    }

    #[test]
    fn process_moves_forward_and_records_erp_number() {
        let requester = UserId::new();
        let mut req = submitted(requester);

        let cmd = process_cmd(&req, RequisitionStatus::RequisitionIssued, Some(" RC-4410 "));
        let events = req.execute(&cmd).unwrap();
        match &events[0] {
            RequisitionEvent::Processed(e) => {
                assert_eq!(e.from, RequisitionStatus::Pending);
                assert_eq!(e.to, RequisitionStatus::RequisitionIssued);
                assert_eq!(e.erp_request_number.as_deref(), Some("RC-4410"));
                assert_eq!(e.requested_by, requester);
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Number is kept when omitted.
        advance(&mut req, RequisitionStatus::Approved);
        let state = req.snapshot().unwrap();
        assert_eq!(state.status, RequisitionStatus::Approved);
        assert_eq!(state.erp_request_number.as_deref(), Some("RC-4410"));
        assert_eq!(req.version(), 3);
    }

    #[test]
    fn status_cannot_move_backwards_or_to_pending() {
        let mut req = submitted(UserId::new());
        advance(&mut req, RequisitionStatus::Approved);

        assert_eq!(
            process(&req, RequisitionStatus::AwaitingApproval, None),
            Err(DomainError::IllegalTransition {
                from: "Approved",
                to: "Awaiting approval",
                reason: "status cannot move backwards",
            })
        );
        assert!(matches!(
            process(&req, RequisitionStatus::Pending, None),
            Err(DomainError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn no_change_is_rejected_but_new_erp_number_is_accepted() {
        let mut req = submitted(UserId::new());
        assert!(matches!(
            process(&req, RequisitionStatus::Pending, None),
            Err(DomainError::IllegalTransition { .. })
        ));

        advance(&mut req, RequisitionStatus::AwaitingRequisition);

        let err = process(&req, RequisitionStatus::AwaitingRequisition, Some("")).unwrap_err();
        assert_eq!(err.field(), Some("status"));
        assert!(process(&req, RequisitionStatus::AwaitingRequisition, Some("RC-1")).is_ok());
    }

    #[test]
    fn terminal_statuses_are_frozen() {
        let mut req = submitted(UserId::new());
        advance(&mut req, RequisitionStatus::Rejected);

        match process(&req, RequisitionStatus::Approved, None) {
            Err(DomainError::IllegalTransition { reason, .. }) => assert_eq!(reason, "requisition is closed"),
            other => panic!("expected closed requisition, got {other:?}"),
        }
    }

    #[test]
    fn rejected_command_leaves_aggregate_unchanged() {
        let mut req = submitted(UserId::new());
        let before = req.clone();
        assert!(req.execute(&process_cmd(&before, RequisitionStatus::Pending, None)).is_err());
        assert_eq!(req, before);
    }

    #[test]
    fn snapshot_restores_to_equivalent_aggregate() {
        let req = submitted(UserId::new());
        let restored = Requisition::restore(req.snapshot().unwrap().clone());
        assert_eq!(restored, req);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let req = submitted(UserId::new());
        let events = process(&req, RequisitionStatus::AwaitingApproval, None).unwrap();
        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["type"], "processed");
        assert_eq!(json["to"], "awaiting_approval");
    }

    proptest! {
        #[test]
        fn accepted_moves_never_go_backwards(targets in proptest::collection::vec(0usize..ALL_STATUSES.len(), 0..16)) {
            let mut req = submitted(UserId::new());

            for target in targets {
                let to = ALL_STATUSES[target];
                let from = req.status().unwrap();

                let cmd = process_cmd(&req, to, None);
                match req.execute(&cmd) {
                    Ok(_) => {
                        prop_assert!(!from.is_terminal());
                        prop_assert_ne!(to, RequisitionStatus::Pending);
                        prop_assert!(to.rank() > from.rank());
                        prop_assert_eq!(req.status(), Some(to));
                    }
                    Err(_) => prop_assert_eq!(req.status(), Some(from)),
                }
            }
        }
    }
}
