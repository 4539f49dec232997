use crate::model::cell::{CellValue, SheetRow};
use serde::{Deserialize, Serialize};

/// Reserved `driver_identity` of the row that stores a round's column schema.
pub const METADATA_IDENTITY: &str = "__METADATA__";

/// Rank given to rows whose rank cell is missing or unreadable.
pub const UNRANKED: i64 = 999;

/// One stored row of the `rankings` table.
///
/// Both driver rankings and the per-round schema descriptor share this shape;
/// the descriptor is told apart by [`METADATA_IDENTITY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub round_id: String,
    /// Unique within `round_id`.
    pub driver_identity: String,
    pub rank: i64,
    pub points: i64,
    pub tier: Option<String>,
    pub safety_score: i64,
    pub podiums: i64,
    pub finished_races: i64,
    pub total_races: i64,
    /// The original sheet row as a JSON object, or `{"columns": [...]}` for the descriptor.
    pub raw_payload_json: String,
    pub created_at: String,
}

impl RankingRecord {
    /// A record as produced by an import: only rank and points are derived,
    /// every other statistic starts at zero.
    pub fn imported(
        round_id: &str,
        driver_identity: &str,
        rank: i64,
        points: i64,
        raw_payload_json: String,
        created_at: &str,
    ) -> Self {
        Self {
            round_id: round_id.to_string(),
            driver_identity: driver_identity.to_string(),
            rank,
            points,
            tier: None,
            safety_score: 0,
            podiums: 0,
            finished_races: 0,
            total_races: 0,
            raw_payload_json,
            created_at: created_at.to_string(),
        }
    }

    pub fn is_schema_descriptor(&self) -> bool {
        self.driver_identity == METADATA_IDENTITY
    }

    /// Decodes the stored sheet row.
    pub fn payload(&self) -> Result<SheetRow, serde_json::Error> {
        serde_json::from_str(&self.raw_payload_json)
    }
}

/// Ordered column headers of the sheet a round was imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub columns: Vec<String>,
}

impl SchemaDescriptor {
    pub fn into_record(
        self,
        round_id: &str,
        created_at: &str,
    ) -> Result<RankingRecord, serde_json::Error> {
        let payload = serde_json::to_string(&self)?;
        Ok(RankingRecord::imported(
            round_id,
            METADATA_IDENTITY,
            0,
            0,
            payload,
            created_at,
        ))
    }

    pub fn from_record(record: &RankingRecord) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&record.raw_payload_json)
    }
}

/// A round's rankings laid out for display: one cell per schema column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub round_id: String,
    pub columns: Vec<String>,
    pub rows: Vec<RankingTableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTableRow {
    pub driver_identity: String,
    pub rank: i64,
    pub points: i64,
    /// Aligned with [`RankingTable::columns`]; `Null` where the row had no value.
    pub cells: Vec<CellValue>,
}
