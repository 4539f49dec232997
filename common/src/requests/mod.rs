use serde::Deserialize;

/// Metadata part of a ranking import upload.
#[derive(Deserialize, Default, Debug)]
pub struct ImportRequest {
    pub round_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateSeriesRequest {
    pub name: String,
    pub season: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CreateRoundRequest {
    pub name: String,
    pub round_number: Option<i64>,
    pub race_date: Option<String>,
}
