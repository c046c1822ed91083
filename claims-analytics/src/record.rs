use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status value marking a claim as closed. Any other status counts as open.
pub const CLOSED_STATUS: &str = "Closed";

/// The four record collections the engine scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Agents,
    ClaimHandlers,
    Claims,
    Disasters,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Agents,
        Collection::ClaimHandlers,
        Collection::Claims,
        Collection::Disasters,
    ];

    /// File name of the collection inside a data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Agents => "sfcc_2023_agents.json",
            Collection::ClaimHandlers => "sfcc_2023_claim_handlers.json",
            Collection::Claims => "sfcc_2023_claims.json",
            Collection::Disasters => "sfcc_2023_disasters.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Agents => "agents",
            Collection::ClaimHandlers => "claim handlers",
            Collection::Claims => "claims",
            Collection::Disasters => "disasters",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub state: String,
    pub city: Option<String>,
    pub primary_language: Option<String>,
    pub secondary_language: Option<String>,
}

impl Agent {
    /// Second language, treating an empty string as no second language
    pub fn secondary_language(&self) -> Option<&str> {
        self.secondary_language
            .as_deref()
            .filter(|language| !language.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimHandler {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: i64,
    pub disaster_id: i64,
    pub status: String,
    pub total_loss: Option<bool>,
    pub loss_of_life: Option<bool>,
    #[serde(rename = "type")]
    pub claim_type: Option<String>,
    pub severity_rating: i64,
    pub estimate_cost: f64,
    pub agent_assigned_id: i64,
    pub claim_handler_assigned_id: i64,
}

impl Claim {
    pub fn is_closed(&self) -> bool {
        self.status == CLOSED_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disaster {
    pub id: i64,
    #[serde(rename = "type")]
    pub disaster_type: Option<String>,
    pub state: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
    pub declared_date: NaiveDate,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub radius_miles: f64,
}

impl Disaster {
    pub fn declared_after_end(&self) -> bool {
        self.declared_date > self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claim_accepts_minimal_record() {
        let claim: Claim = serde_json::from_value(json!({
            "id": 1,
            "disaster_id": 4,
            "status": "Received",
            "severity_rating": 3,
            "estimate_cost": 1520.5,
            "agent_assigned_id": 12,
            "claim_handler_assigned_id": 7
        }))
        .unwrap();

        assert!(!claim.is_closed());
        assert!(claim.claim_type.is_none());
    }

    #[test]
    fn test_disaster_dates_compare_as_calendar_dates() {
        let disaster: Disaster = serde_json::from_value(json!({
            "id": 1,
            "type": "Flood",
            "state": "Texas",
            "end_date": "2023-05-09",
            "declared_date": "2023-05-10",
            "radius_miles": 12.5
        }))
        .unwrap();

        assert!(disaster.declared_after_end());
        assert_eq!(disaster.disaster_type.as_deref(), Some("Flood"));
    }

    #[test]
    fn test_empty_secondary_language_is_none() {
        let agent: Agent = serde_json::from_value(json!({
            "id": 3,
            "state": "Ohio",
            "secondary_language": ""
        }))
        .unwrap();

        assert_eq!(agent.secondary_language(), None);
    }
}
