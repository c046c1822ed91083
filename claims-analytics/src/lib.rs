pub mod dataset;
pub mod engine;
pub mod error;
pub mod loader;
pub mod record;
pub mod region;

// Re-export commonly used types
pub use dataset::Dataset;
pub use engine::{AGENT_ID_RANGE, AgentTotal, Extremum, QueryEngine, SEVERITY_RANGE};
pub use error::{AnalyticsError, Result};
pub use loader::{InMemoryLoader, JsonDirLoader, RecordLoader};
pub use record::{Agent, CLOSED_STATUS, Claim, ClaimHandler, Collection, Disaster};
pub use region::Region;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loader() -> InMemoryLoader {
        InMemoryLoader::new()
            .with(
                Collection::Agents,
                vec![
                    json!({"id": 1, "state": "Florida", "secondary_language": "Spanish"}),
                    json!({"id": 2, "state": "Florida", "secondary_language": "Haitian Creole"}),
                    json!({"id": 3, "state": "Florida", "secondary_language": "Spanish"}),
                ],
            )
            .with(
                Collection::ClaimHandlers,
                vec![json!({"id": 7, "first_name": "Grace", "last_name": "Hopper"})],
            )
            .with(
                Collection::Claims,
                vec![
                    json!({
                        "id": 1, "disaster_id": 1, "status": "Closed", "type": "Fire",
                        "severity_rating": 9, "estimate_cost": 100.0,
                        "agent_assigned_id": 1, "claim_handler_assigned_id": 7
                    }),
                    json!({
                        "id": 2, "disaster_id": 1, "status": "Received", "type": "Flood",
                        "severity_rating": 6, "estimate_cost": 250.555,
                        "agent_assigned_id": 1, "claim_handler_assigned_id": 7
                    }),
                    json!({
                        "id": 3, "disaster_id": 2, "status": "In Review", "type": "Wind",
                        "severity_rating": 2, "estimate_cost": 49.445,
                        "agent_assigned_id": 150, "claim_handler_assigned_id": 7
                    }),
                ],
            )
            .with(
                Collection::Disasters,
                vec![
                    json!({
                        "id": 1, "type": "Hurricane", "state": "Florida", "name": "Big Storm",
                        "start_date": "2023-09-01", "end_date": "2023-09-20",
                        "declared_date": "2023-09-03", "radius_miles": 1.0
                    }),
                    json!({
                        "id": 2, "type": "Flood", "state": "Georgia", "name": "High Water",
                        "start_date": "2023-04-01", "end_date": "2023-04-05",
                        "declared_date": "2023-04-07", "radius_miles": 0.0
                    }),
                ],
            )
    }

    #[tokio::test]
    async fn test_load_and_query() {
        let dataset = Dataset::load(&loader()).await.unwrap();
        let engine = QueryEngine::from(dataset);

        assert_eq!(engine.closed_claim_count(), 1);
        assert_eq!(engine.claims_for_handler(7), 3);
        assert_eq!(engine.average_claim_cost_for_handler(7), Some(133.33));
        assert_eq!(engine.total_claim_cost_for_disaster(1), Some(350.56));
        assert_eq!(engine.most_spoken_secondary_language("Florida"), "Spanish");
        assert_eq!(engine.open_claims_for_agent(1, 5).unwrap(), Some(1));
        assert_eq!(engine.disasters_declared_after_end(), 1);
        assert_eq!(engine.disaster_claim_density(2), None);
        assert_eq!(engine.state_with_most_disasters().as_deref(), Some("Florida"));
        assert_eq!(engine.disasters_for_region(Region::South), 2);
        assert_eq!(
            engine.top_three_months_by_claims(),
            vec!["September 2023", "April 2023"]
        );

        let totals = engine.agent_total_claim_costs();
        assert_eq!(totals[&1], AgentTotal::Total(350.56));
        assert_eq!(totals[&150], AgentTotal::Invalid);
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryEngine>();
    }
}
