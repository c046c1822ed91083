use claims_analytics::Region;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Rounded monetary or density value; `null` when there is nothing to report
#[derive(Debug, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub state: String,
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenClaimsQuery {
    pub min_severity: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenClaimsResponse {
    pub agent_id: i64,
    pub min_severity: i64,
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthsResponse {
    pub months: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionResponse {
    pub region: Region,
    pub states: Vec<String>,
}
