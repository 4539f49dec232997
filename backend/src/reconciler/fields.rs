//! Derives the three indexing fields (rank, driver identity, points) from a row.
//!
//! Headers are matched against a fixed bilingual synonym table, compared
//! case-sensitively after trimming. These values are only used for storage
//! keys and ordering; display always goes through the raw row.

use common::model::cell::{CellValue, SheetRow};
use common::model::ranking::UNRANKED;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity used when no header names a driver.
pub const UNKNOWN_DRIVER: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Rank,
    DriverIdentity,
    Points,
}

/// Header spellings recognised for each role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSynonyms {
    pub rank: Vec<String>,
    pub driver: Vec<String>,
    pub points: Vec<String>,
}

impl Default for HeaderSynonyms {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        };
        Self {
            rank: owned(&["排名", "名次", "Rank", "rank", "Pos", "Position"]),
            driver: owned(&[
                "车手", "车手名", "姓名", "选手", "Driver", "driver", "Name", "name",
            ]),
            points: owned(&["积分", "总积分", "得分", "Points", "points", "Pts"]),
        }
    }
}

impl HeaderSynonyms {
    pub fn role_of(&self, header: &str) -> Option<FieldRole> {
        let header = header.trim();
        let listed = |words: &[String]| words.iter().any(|w| w == header);
        if listed(&self.rank) {
            Some(FieldRole::Rank)
        } else if listed(&self.driver) {
            Some(FieldRole::DriverIdentity)
        } else if listed(&self.points) {
            Some(FieldRole::Points)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssentialFields {
    pub rank: i64,
    pub points: i64,
    pub driver_identity: String,
}

/// Scans `row` in column order; when several headers share a role the last
/// non-empty one wins.
pub fn resolve_essential_fields(row: &SheetRow, synonyms: &HeaderSynonyms) -> EssentialFields {
    let mut rank_cell: Option<&CellValue> = None;
    let mut driver_cell: Option<&CellValue> = None;
    let mut points_cell: Option<&CellValue> = None;

    for (header, value) in row.iter() {
        if matches!(value, CellValue::Null) {
            continue;
        }
        match synonyms.role_of(header) {
            Some(FieldRole::Rank) => rank_cell = Some(value),
            Some(FieldRole::DriverIdentity) => driver_cell = Some(value),
            Some(FieldRole::Points) => points_cell = Some(value),
            None => {}
        }
    }

    let rank = rank_cell.and_then(CellValue::to_integer).unwrap_or(UNRANKED);
    let points = points_cell.and_then(CellValue::to_integer).unwrap_or(0);
    let mut driver_identity = driver_cell
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN_DRIVER.to_string());
    if driver_identity == UNKNOWN_DRIVER {
        driver_identity = format!("{}_{}", UNKNOWN_DRIVER, short_token());
    }

    EssentialFields {
        rank,
        points,
        driver_identity,
    }
}

/// Eight lowercase alphanumerics; only needs to be distinct within one batch.
fn short_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
