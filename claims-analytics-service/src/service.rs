use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::get,
};
use claims_analytics::{AgentTotal, AnalyticsError, Dataset, JsonDirLoader, QueryEngine, Region};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, info, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    models::{
        CountResponse, LanguageResponse, MonthsResponse, OpenClaimsQuery, OpenClaimsResponse,
        RegionResponse, StateResponse, ValueResponse,
    },
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[derive(Clone)]
pub struct AppState {
    pub engine: QueryEngine,
}

impl AppState {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            engine: QueryEngine::new(Arc::new(dataset)),
        }
    }
}

/// Load the dataset from the configured directory and build the router.
///
/// The dataset is fully loaded before the router exists, so no request can
/// observe a partially populated collection.
pub async fn create_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    info!(data_dir = %config.data_dir.display(), "loading claims dataset");
    let loader = JsonDirLoader::new(config.data_dir.clone());
    let dataset = Dataset::load(&loader).await?;
    Ok(build_router(AppState::new(dataset)))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/claims/closed/count", get(closed_claim_count))
        .route("/claims/top-months", get(top_three_months))
        .route("/claim-handlers/{id}/claims/count", get(claims_for_handler))
        .route(
            "/claim-handlers/{id}/claims/average-cost",
            get(average_claim_cost_for_handler),
        )
        .route("/disasters/{id}/claims/total-cost", get(total_claim_cost_for_disaster))
        .route("/disasters/{id}/claim-density", get(disaster_claim_density))
        .route("/disasters/declared-after-end/count", get(disasters_declared_after_end))
        .route("/states/most-disasters", get(state_with_most_disasters))
        .route("/states/least-disasters", get(state_with_least_disasters))
        .route("/states/{state}/disasters/count", get(disasters_for_state))
        .route("/states/{state}/secondary-language", get(most_spoken_secondary_language))
        .route("/agents/claim-costs", get(agent_total_claim_costs))
        .route("/agents/{id}/open-claims", get(open_claims_for_agent))
        .route("/regions/{region}", get(region_states))
        .route("/regions/{region}/disasters/count", get(disasters_for_region))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Claims Analytics Service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /claims/closed/count": "Number of closed claims",
            "GET /claims/top-months": "Three months with the most claims",
            "GET /claim-handlers/{id}/claims/count": "Claims assigned to a handler",
            "GET /claim-handlers/{id}/claims/average-cost": "Average claim cost for a handler",
            "GET /disasters/{id}/claims/total-cost": "Total claim cost for a disaster",
            "GET /disasters/{id}/claim-density": "Claims per square mile of a disaster",
            "GET /disasters/declared-after-end/count": "Disasters declared after they ended",
            "GET /states/most-disasters": "State with the most disasters",
            "GET /states/least-disasters": "State with the least disasters",
            "GET /states/{state}/disasters/count": "Disasters in a state",
            "GET /states/{state}/secondary-language": "Most spoken second language of a state's agents",
            "GET /agents/claim-costs": "Total claim cost per agent",
            "GET /agents/{id}/open-claims?min_severity=N": "Open claims of an agent at or above a severity",
            "GET /regions/{region}": "States in a census region",
            "GET /regions/{region}/disasters/count": "Disasters in a census region",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn closed_claim_count(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.engine.closed_claim_count(),
    })
}

async fn top_three_months(State(state): State<AppState>) -> Json<MonthsResponse> {
    Json(MonthsResponse {
        months: state.engine.top_three_months_by_claims(),
    })
}

async fn claims_for_handler(
    State(state): State<AppState>,
    Path(claim_handler_id): Path<i64>,
) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.engine.claims_for_handler(claim_handler_id),
    })
}

async fn average_claim_cost_for_handler(
    State(state): State<AppState>,
    Path(claim_handler_id): Path<i64>,
) -> Json<ValueResponse> {
    Json(ValueResponse {
        value: state.engine.average_claim_cost_for_handler(claim_handler_id),
    })
}

async fn total_claim_cost_for_disaster(
    State(state): State<AppState>,
    Path(disaster_id): Path<i64>,
) -> Json<ValueResponse> {
    Json(ValueResponse {
        value: state.engine.total_claim_cost_for_disaster(disaster_id),
    })
}

async fn disaster_claim_density(
    State(state): State<AppState>,
    Path(disaster_id): Path<i64>,
) -> Json<ValueResponse> {
    Json(ValueResponse {
        value: state.engine.disaster_claim_density(disaster_id),
    })
}

async fn disasters_declared_after_end(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.engine.disasters_declared_after_end(),
    })
}

async fn state_with_most_disasters(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse {
        state: state.engine.state_with_most_disasters(),
    })
}

async fn state_with_least_disasters(State(state): State<AppState>) -> Json<StateResponse> {
    Json(StateResponse {
        state: state.engine.state_with_least_disasters(),
    })
}

async fn disasters_for_state(
    State(state): State<AppState>,
    Path(state_name): Path<String>,
) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.engine.disasters_for_state(&state_name),
    })
}

async fn most_spoken_secondary_language(
    State(state): State<AppState>,
    Path(state_name): Path<String>,
) -> Json<LanguageResponse> {
    let language = state.engine.most_spoken_secondary_language(&state_name);
    Json(LanguageResponse {
        state: state_name,
        language,
    })
}

async fn agent_total_claim_costs(
    State(state): State<AppState>,
) -> Json<BTreeMap<i64, AgentTotal>> {
    Json(state.engine.agent_total_claim_costs())
}

async fn open_claims_for_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<i64>,
    Query(query): Query<OpenClaimsQuery>,
) -> ApiResult<OpenClaimsResponse> {
    let count = state
        .engine
        .open_claims_for_agent(agent_id, query.min_severity)
        .map_err(|e| match &e {
            AnalyticsError::SeverityOutOfRange(_) => bad_request_error(&e.to_string()),
            other => {
                warn!(error = %other, "unexpected query failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": other.to_string() })),
                )
            }
        })?;

    Ok(Json(OpenClaimsResponse {
        agent_id,
        min_severity: query.min_severity,
        count,
    }))
}

fn parse_region(region: &str) -> Result<Region, ApiError> {
    region.parse::<Region>().map_err(|e| bad_request_error(&e))
}

async fn region_states(Path(region): Path<String>) -> ApiResult<RegionResponse> {
    let region = parse_region(&region)?;
    Ok(Json(RegionResponse {
        region,
        states: region.states().iter().map(|s| s.to_string()).collect(),
    }))
}

async fn disasters_for_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> ApiResult<CountResponse> {
    let region = parse_region(&region)?;
    Ok(Json(CountResponse {
        count: state.engine.disasters_for_region(region),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use claims_analytics::{Collection, InMemoryLoader};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let loader = InMemoryLoader::new()
            .with(
                Collection::Agents,
                vec![
                    json!({"id": 1, "state": "New York", "secondary_language": "Italian"}),
                    json!({"id": 2, "state": "New York", "secondary_language": "Polish"}),
                ],
            )
            .with(Collection::ClaimHandlers, vec![json!({"id": 7})])
            .with(
                Collection::Claims,
                vec![
                    json!({
                        "id": 1, "disaster_id": 1, "status": "Open",
                        "severity_rating": 8, "estimate_cost": 100.0,
                        "agent_assigned_id": 1, "claim_handler_assigned_id": 7
                    }),
                    json!({
                        "id": 2, "disaster_id": 1, "status": "Closed",
                        "severity_rating": 3, "estimate_cost": 250.555,
                        "agent_assigned_id": 101, "claim_handler_assigned_id": 7
                    }),
                    json!({
                        "id": 3, "disaster_id": 1, "status": "Open",
                        "severity_rating": 1, "estimate_cost": 49.445,
                        "agent_assigned_id": 2, "claim_handler_assigned_id": 7
                    }),
                ],
            )
            .with(
                Collection::Disasters,
                vec![json!({
                    "id": 1, "state": "New York",
                    "declared_date": "2023-06-02", "end_date": "2023-06-01",
                    "radius_miles": 1.0
                })],
            );

        let dataset = Dataset::load(&loader).await.unwrap();
        build_router(AppState::new(dataset))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_count_endpoints() {
        let router = test_router().await;

        let (status, body) = get_json(router.clone(), "/claims/closed/count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"count": 1}));

        let (_, body) = get_json(router.clone(), "/claim-handlers/7/claims/count").await;
        assert_eq!(body, json!({"count": 3}));

        let (_, body) = get_json(router.clone(), "/states/New%20York/disasters/count").await;
        assert_eq!(body, json!({"count": 1}));

        let (_, body) = get_json(router, "/disasters/declared-after-end/count").await;
        assert_eq!(body, json!({"count": 1}));
    }

    #[tokio::test]
    async fn test_sentinels_render_as_null() {
        let router = test_router().await;

        let (_, body) = get_json(router.clone(), "/claim-handlers/7/claims/average-cost").await;
        assert_eq!(body, json!({"value": 133.33}));

        let (_, body) = get_json(router.clone(), "/disasters/2/claims/total-cost").await;
        assert_eq!(body, json!({"value": null}));

        let (_, body) = get_json(router.clone(), "/disasters/1/claim-density").await;
        assert_eq!(body, json!({"value": 0.95493}));

        let (_, body) = get_json(router, "/agents/claim-costs").await;
        assert_eq!(body["1"], json!(100.0));
        assert_eq!(body["3"], json!(0.0));
        assert_eq!(body["101"], Value::Null);
    }

    #[tokio::test]
    async fn test_open_claims_severity_bounds() {
        let router = test_router().await;

        let (status, body) = get_json(router.clone(), "/agents/1/open-claims?min_severity=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], Value::Null);

        let (_, body) = get_json(router.clone(), "/agents/1/open-claims?min_severity=8").await;
        assert_eq!(body["count"], json!(1));

        let (status, _) = get_json(router, "/agents/1/open-claims?min_severity=11").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_state_and_region_endpoints() {
        let router = test_router().await;

        let (_, body) = get_json(router.clone(), "/states/most-disasters").await;
        assert_eq!(body, json!({"state": "New York"}));

        let (_, body) = get_json(router.clone(), "/states/New%20York/secondary-language").await;
        assert_eq!(body, json!({"state": "New York", "language": "Italian"}));

        let (_, body) = get_json(router.clone(), "/regions/northeast/disasters/count").await;
        assert_eq!(body, json!({"count": 1}));

        let (_, body) = get_json(router.clone(), "/claims/top-months").await;
        assert_eq!(body, json!({"months": ["June 2023"]}));

        let (status, _) = get_json(router, "/regions/atlantis").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
