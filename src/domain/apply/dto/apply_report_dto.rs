use chrono::{DateTime, Utc};
use kube::Resource;
use serde::Serialize;
use uuid::Uuid;

/// Branch taken by the apply operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    Created,
    Updated,
}

/// Result of one apply: the branch and the object the store returned.
#[derive(Debug, Clone)]
pub struct Applied<K> {
    pub action: ApplyAction,
    pub object: K,
}

/// Kind-erased view of an [`Applied`] object, kept in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSummary {
    pub action: ApplyAction,
    pub resource_version: Option<String>,
}

impl<K: Resource> From<Applied<K>> for AppliedSummary {
    fn from(applied: Applied<K>) -> Self {
        Self {
            action: applied.action,
            resource_version: applied.object.meta().resource_version.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Created,
    Updated,
    /// Decoded fine, but no entry in the kind table.
    Unhandled,
}

impl From<ApplyAction> for DocumentStatus {
    fn from(action: ApplyAction) -> Self {
        match action {
            ApplyAction::Created => DocumentStatus::Created,
            ApplyAction::Updated => DocumentStatus::Updated,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    /// 1-based position in the split manifest, empty documents included.
    pub document: usize,
    pub api_version: String,
    pub kind: String,
    pub name: Option<String>,
    pub status: DocumentStatus,
    pub resource_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub run_id: Uuid,
    pub namespace: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<DocumentOutcome>,
}

impl ApplyReport {
    pub fn start(run_id: Uuid, namespace: &str) -> Self {
        Self {
            run_id,
            namespace: namespace.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: DocumentOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn count(&self, status: DocumentStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
