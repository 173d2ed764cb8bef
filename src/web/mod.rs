use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

use crate::{
    batch::{select_coverage, BatchSummary, Planter},
    conversion_plan::{plan_asphalt_conversion, ConversionRequest},
    error::PlantingError,
    rectangle::Rectangle,
    rng::{self, RngManager},
    sampler::Tree,
    species::Species,
};

pub struct WebServerConfig {
    pub rectangles: Vec<Rectangle>,
    pub seed: Option<u64>,
    pub host: String,
    pub port: u16,
}

struct AppState {
    rectangles: Vec<Rectangle>,
    seed: Option<u64>,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        rectangles,
        seed,
        host,
        port,
    } = config;

    let rectangle_count = rectangles.len();
    let router = router(AppState { rectangles, seed });

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid address {host}:{port}"))?;
    log::info!("serving {rectangle_count} rectangles at http://{addr} (Ctrl+C to stop)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trees", get(trees))
        .route("/trees/", get(trees))
        .route("/rectangles/summary", get(summary))
        .route("/asphalt-conversion", post(asphalt_conversion))
        .route("/asphalt-conversion/", post(asphalt_conversion))
        .with_state(Arc::new(state))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("shutting down");
}

/// Validation failures and unparseable queries or bodies all become 422 with a
/// `detail` message.
#[derive(Debug)]
enum ApiError {
    Invalid(PlantingError),
    Rejected(String),
}

impl From<PlantingError> for ApiError {
    fn from(value: PlantingError) -> Self {
        ApiError::Invalid(value)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::Rejected(value.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Rejected(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match self {
            ApiError::Invalid(err) => err.to_string(),
            ApiError::Rejected(text) => text,
        };
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}

fn default_percentage() -> f64 {
    1.0
}

fn default_trees_per_square_meter() -> f64 {
    0.01
}

#[derive(Debug, Deserialize)]
struct TreesQuery {
    #[serde(default = "default_percentage")]
    percentage: f64,
    #[serde(default = "default_trees_per_square_meter")]
    trees_per_square_meter: f64,
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(default = "default_trees_per_square_meter")]
    trees_per_square_meter: f64,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn trees(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TreesQuery>, QueryRejection>,
) -> Result<Json<Vec<Tree>>, ApiError> {
    let Query(query) = query?;
    let rng = RngManager::from_optional_seed(state.seed);
    let selected = select_coverage(
        &state.rectangles,
        query.percentage,
        &mut rng.stream(rng::SELECTION),
    )?;
    let result = Planter::new(&rng).plant(&selected, query.trees_per_square_meter)?;
    Ok(Json(result.trees))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<BatchSummary>, ApiError> {
    let Query(query) = query?;
    let rng = RngManager::from_optional_seed(state.seed);
    let result = Planter::new(&rng).plant(&state.rectangles, query.trees_per_square_meter)?;
    Ok(Json(result.summary))
}

#[derive(Debug, Serialize)]
struct ConversionResponse {
    total_trees: u64,
    total_cost: f64,
    co2_sequestration: f64,
    maintenance_cost: f64,
    asphalt_removal_cost: f64,
    trees_planted_per_species: BTreeMap<Species, u64>,
}

async fn asphalt_conversion(
    request: Result<Json<ConversionRequest>, JsonRejection>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let Json(request) = request?;
    let plan = plan_asphalt_conversion(&request)?;
    Ok(Json(ConversionResponse {
        total_trees: plan.total_trees,
        total_cost: plan.total_cost,
        co2_sequestration: plan.total_co2_reduction_kg,
        maintenance_cost: plan.total_maintenance_cost,
        asphalt_removal_cost: plan.asphalt_removal_cost,
        trees_planted_per_species: plan.trees_planted_per_species,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geodesy::Coordinate, rectangle::AreaType};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
    };

    fn app_state() -> AppState {
        let rectangles = (0..4)
            .map(|i| {
                Rectangle::new(
                    Coordinate::new(37.77 + i as f64 * 0.001, -122.41),
                    10.0,
                    10.0,
                    AreaType::ParkingLot,
                )
                .unwrap()
            })
            .collect();
        AppState {
            rectangles,
            seed: Some(3),
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(app_state())
    }

    /// Serve the full router on an ephemeral port and send one raw request.
    async fn request(method: &str, uri: &str, body: &str) -> (u16, serde_json::Value) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(app_state())).await.unwrap();
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let raw = format!(
            "{method} {uri} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\
             Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        let (head, payload) = response.split_once("\r\n\r\n").unwrap();
        let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
        (status, serde_json::from_str(payload).unwrap())
    }

    #[tokio::test]
    async fn router_serves_trees_with_and_without_trailing_slash() {
        for uri in [
            "/trees/?percentage=0.5&trees_per_square_meter=0.1",
            "/trees?percentage=0.5&trees_per_square_meter=0.1",
        ] {
            let (status, body) = request("GET", uri, "").await;
            assert_eq!(status, 200, "{uri}");
            let trees = body.as_array().unwrap();
            assert_eq!(trees.len(), 20);
            assert!(trees[0].get("tree_type").is_some());
        }

        let (status, body) = request("GET", "/trees/", "").await;
        assert_eq!(status, 200);
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn router_maps_bad_queries_and_bodies_to_422() {
        for uri in [
            "/trees/?percentage=abc",
            "/trees/?percentage=2.0",
            "/trees/?trees_per_square_meter=-1",
            "/trees/?trees_per_square_meter=1e300",
            "/rectangles/summary?trees_per_square_meter=zero",
        ] {
            let (status, body) = request("GET", uri, "").await;
            assert_eq!(status, 422, "{uri}");
            assert!(body["detail"].is_string());
        }

        let (status, _) = request("POST", "/asphalt-conversion/", "{not json").await;
        assert_eq!(status, 422);
        let (status, _) = request(
            "POST",
            "/asphalt-conversion/",
            r#"{"asphalt_sqft": -1000.0, "species_distribution": {"redwood": 1.0}}"#,
        )
        .await;
        assert_eq!(status, 422);
    }

    #[tokio::test]
    async fn router_serves_health_and_conversion() {
        let (status, body) = request("GET", "/health", "").await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({ "status": "healthy" }));

        let (status, body) = request(
            "POST",
            "/asphalt-conversion/",
            r#"{"asphalt_sqft": 1000.0, "species_distribution": {"coast_live_oak": 0.5, "monterey_pine": 0.3, "redwood": 0.2}}"#,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["total_trees"], 10);
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let Json(body) = health().await;
        assert_eq!(body, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn trees_honours_density_and_percentage() {
        let query = TreesQuery {
            percentage: 0.5,
            trees_per_square_meter: 0.1,
        };
        let Json(trees) = trees(State(state()), Ok(Query(query))).await.unwrap();
        assert_eq!(trees.len(), 20);
    }

    #[tokio::test]
    async fn trees_rejects_invalid_parameters() {
        for (percentage, density) in [(2.0, 0.01), (1.0, -1.0)] {
            let query = TreesQuery {
                percentage,
                trees_per_square_meter: density,
            };
            let err = trees(State(state()), Ok(Query(query))).await.unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[tokio::test]
    async fn summary_reports_aggregates() {
        let query = SummaryQuery {
            trees_per_square_meter: 0.05,
        };
        let Json(summary) = summary(State(state()), Ok(Query(query))).await.unwrap();
        assert_eq!(summary.total_area, 400.0);
        assert_eq!(summary.expected_tree_count, 20);
        assert_eq!(summary.actual_tree_count, 20);
    }

    #[tokio::test]
    async fn asphalt_conversion_matches_spacing() {
        let request: ConversionRequest = serde_json::from_value(json!({
            "asphalt_sqft": 1000.0,
            "species_distribution": {
                "coast_live_oak": 0.5,
                "monterey_pine": 0.3,
                "redwood": 0.2
            }
        }))
        .unwrap();
        let Json(response) = asphalt_conversion(Ok(Json(request))).await.unwrap();
        assert_eq!(response.total_trees, 10);
        assert!(response.total_cost > 0.0);
        assert!(response.co2_sequestration > 0.0);
        assert!(response.maintenance_cost > 0.0);
    }

    #[tokio::test]
    async fn asphalt_conversion_rejects_negative_area() {
        let request = ConversionRequest::new(-1000.0, BTreeMap::new());
        let err = asphalt_conversion(Ok(Json(request))).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
