use crate::model::import::ImportSummary;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Number of data rows decoded so far.
    InProgress(u32),
    Completed(ImportSummary),
    Failed { kind: String, message: String },
}
