use crate::model::cell::SheetRow;
use serde::{Deserialize, Serialize};

/// Outcome of a successful ranking import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub round_id: String,
    /// Ranking rows written, not counting the schema descriptor.
    pub inserted: usize,
    /// Rows whose driver identity collided and was suffixed.
    pub renamed: usize,
    pub columns: Vec<String>,
    /// Hex MD5 of the uploaded file.
    pub checksum: String,
}

/// What an upload would import, shown to the user before committing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
    pub total_rows: usize,
}
