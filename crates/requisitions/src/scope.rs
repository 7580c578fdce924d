//! Service scope documents: the work description handed to a contractor
//! before a service requisition is raised.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sparekeep_core::{DomainError, DomainResult, ServiceScopeId, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    General,
    Electrical,
    Mechanical,
    Civil,
    It,
}

impl ServiceType {
    pub fn label(self) -> &'static str {
        match self {
            ServiceType::General => "General maintenance",
            ServiceType::Electrical => "Electrical / instrumentation",
            ServiceType::Mechanical => "Mechanical / hydraulics",
            ServiceType::Civil => "Civil / structural",
            ServiceType::It => "IT / networking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeStatus {
    Finalized,
}

/// One execution step. Ids are unique within a scope and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeStep {
    pub id: u32,
    pub text: String,
}

/// Scope being written. Only the title is required to finalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceScopeDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub service_type: ServiceType,
    pub suppliers: String,
    pub safety_norms: String,
    pub documentation: String,
    steps: Vec<ScopeStep>,
    next_step_id: u32,
}

impl ServiceScopeDraft {
    pub fn new(title: impl Into<String>, service_type: ServiceType) -> Self {
        Self {
            title: title.into(),
            service_type,
            ..Self::default()
        }
    }

    pub fn steps(&self) -> &[ScopeStep] {
        &self.steps
    }

    /// Append a step and return its id. Blank text is rejected.
    pub fn add_step(&mut self, text: &str) -> DomainResult<u32> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::invalid("steps", "step text is required"));
        }
        self.next_step_id += 1;
        self.steps.push(ScopeStep {
            id: self.next_step_id,
            text: text.to_string(),
        });
        Ok(self.next_step_id)
    }

    pub fn remove_step(&mut self, id: u32) -> Option<ScopeStep> {
        let pos = self.steps.iter().position(|s| s.id == id)?;
        Some(self.steps.remove(pos))
    }

    /// Freeze the draft into a stored scope.
    pub fn finalize(self, created_by: UserId, at: DateTime<Utc>) -> DomainResult<ServiceScope> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::invalid("title", "enter a title for the scope"));
        }

        Ok(ServiceScope {
            id: ServiceScopeId::new(),
            title: title.to_string(),
            date: self.date,
            location: self.location.trim().to_string(),
            service_type: self.service_type,
            suppliers: self.suppliers.trim().to_string(),
            steps: self.steps,
            safety_norms: self.safety_norms,
            documentation: self.documentation,
            created_by,
            status: ScopeStatus::Finalized,
            created_at: at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceScope {
    pub id: ServiceScopeId,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub service_type: ServiceType,
    pub suppliers: String,
    pub steps: Vec<ScopeStep>,
    pub safety_norms: String,
    pub documentation: String,
    pub created_by: UserId,
    pub status: ScopeStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_keep_order_and_ids_are_not_reused() {
        let mut draft = ServiceScopeDraft::new("Replace conveyor belt", ServiceType::Mechanical);
        let first = draft.add_step(" Lock out the line ").unwrap();
        let second = draft.add_step("Remove guards").unwrap();

        assert_eq!(draft.remove_step(first).unwrap().text, "Lock out the line");
        assert!(draft.remove_step(first).is_none());

        let third = draft.add_step("Fit new belt").unwrap();
        assert!(third > second);
        let texts: Vec<_> = draft.steps().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Remove guards", "Fit new belt"]);
    }

    #[test]
    fn blank_step_is_rejected() {
        let mut draft = ServiceScopeDraft::default();
        assert_eq!(draft.add_step("   ").unwrap_err().field(), Some("steps"));
        assert!(draft.steps().is_empty());
    }

    #[test]
    fn finalize_requires_a_title() {
        let draft = ServiceScopeDraft::new("  ", ServiceType::General);
        let err = draft.finalize(UserId::new(), Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn finalized_scope_carries_the_draft() {
        let author = UserId::new();
        let mut draft = ServiceScopeDraft::new(" Panel rewiring ", ServiceType::Electrical);
        draft.location = "Substation 2".to_string();
        draft.date = NaiveDate::from_ymd_opt(2026, 3, 2);
        draft.add_step("Isolate panel").unwrap();

        let scope = draft.finalize(author, Utc::now()).unwrap();
        assert_eq!(scope.title, "Panel rewiring");
        assert_eq!(scope.status, ScopeStatus::Finalized);
        assert_eq!(scope.created_by, author);
        assert_eq!(scope.steps.len(), 1);
        assert_eq!(scope.service_type.label(), "Electrical / instrumentation");

        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json["service_type"], "electrical");
        assert_eq!(json["status"], "finalized");
        assert_eq!(json["date"], "2026-03-02");
    }
}
