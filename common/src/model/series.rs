use serde::{Deserialize, Serialize};

/// A tournament; owns an ordered list of rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub name: String,
    pub season: Option<String>,
    pub created_at: String,
}

/// A single race weekend within a series. Rankings are imported per round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub series_id: String,
    pub name: String,
    pub round_number: Option<i64>,
    pub race_date: Option<String>,
    pub created_at: String,
}
