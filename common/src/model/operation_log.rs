use serde::{Deserialize, Serialize};

/// An audit entry for an administrative action (imports, creations, deletions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
    pub id: i64,
    pub action: String,
    pub target: Option<String>,
    pub detail: Option<String>,
    pub created_at: String,
}
