//! REST server for the builder directory.
//!
//! Exposes search, proximity search, record CRUD, marker placement, and
//! validation as a JSON HTTP API for the directory's web front end and
//! admin tools.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/builders` | Attribute search (`name`, `state`, `city`, `service`, `vanType`, `limit`) |
//! | `POST`   | `/builders` | Add a builder; responds `201` with the stored record |
//! | `GET`    | `/builders/near` | Proximity search (`lat`+`lng`, `zip`, or `city`+`state`; optional `radius`) |
//! | `GET`    | `/builders/{id}` | One builder |
//! | `PUT`    | `/builders/{id}` | Partial update |
//! | `DELETE` | `/builders/{id}` | Remove; responds with the removed record |
//! | `GET`    | `/states` | The per-state index with counts |
//! | `GET`    | `/markers` | Map marker placements, optionally for one `state` |
//! | `GET`    | `/validate` | Consistency report |
//!
//! # Response Envelope
//!
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "error": { "code": "not_found", "message": "builder not found: 42" } }
//! ```
//!
//! Error codes: `validation_error` (400), `bad_request` (400), `not_found` (404),
//! `storage_error` (500). Storage failures are logged in full and reported
//! to the client with a generic message.
//!
//! # Concurrency
//!
//! The directory sits behind a single async mutex, so writes to the backing
//! store are serialized within the process.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use van_directory_core::directory::Directory;
use van_directory_core::error::DirectoryError;
use van_directory_core::models::{BuilderPatch, BuilderRecord, SearchQuery};
use van_directory_core::proximity::OriginSpec;
use van_directory_core::resolver::Geocoder;

use crate::backend::{open_directory, DynStore};
use crate::config::Config;
use crate::geocode;
use crate::locate::markers_for;
use crate::search::{near, with_default_limit, NearError};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    directory: Arc<Mutex<Directory<DynStore>>>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl AppState {
    pub fn new(
        config: Config,
        directory: Directory<DynStore>,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(Mutex::new(directory)),
            geocoder,
        }
    }
}

/// All routes, with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/builders", get(handle_search).post(handle_create))
        .route("/builders/near", get(handle_near))
        .route(
            "/builders/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/states", get(handle_states))
        .route("/markers", get(handle_markers))
        .route("/validate", get(handle_validate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the REST server.
///
/// Loads the directory through the configured backend, binds to
/// `[server].bind`, and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let directory = open_directory(config).await?;
    let geocoder: Option<Arc<dyn Geocoder>> = match geocode::from_config(&config.geocoding)? {
        Some(g) => Some(Arc::new(g)),
        None => None,
    };
    let bind_addr = config.server.bind.clone();

    tracing::info!(
        builders = directory.len(),
        states = directory.by_state().len(),
        geocoding = config.geocoding.is_enabled(),
        "directory loaded"
    );

    let app = build_router(AppState::new(config.clone(), directory, geocoder));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);
    println!("Van directory server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Envelope ============

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    data: T,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                fields: self.fields,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
        fields: None,
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Validation(ref fields) => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "validation_error",
                message: err.to_string(),
                fields: Some(fields.clone()),
            },
            DirectoryError::NotFound(_) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found",
                message: err.to_string(),
                fields: None,
            },
            DirectoryError::Store(ref inner) => {
                tracing::error!(error = ?inner, "store operation failed");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "storage_error",
                    message: err.public_message(),
                    fields: None,
                }
            }
        }
    }
}

impl From<NearError> for AppError {
    fn from(err: NearError) -> Self {
        bad_request(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> impl IntoResponse {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ /builders ============

#[derive(Serialize)]
struct BuilderList {
    count: usize,
    builders: Vec<BuilderRecord>,
}

async fn handle_search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let query = with_default_limit(&state.config, query);

    let directory = state.directory.lock().await;
    let builders: Vec<BuilderRecord> = directory.search(&query).into_iter().cloned().collect();
    Ok(ok(BuilderList {
        count: builders.len(),
        builders,
    }))
}

async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<BuilderRecord>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(record) = body?;

    let mut directory = state.directory.lock().await;
    let id = directory.add(record).await?;
    let created = directory
        .get(&id)
        .cloned()
        .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
    tracing::info!(id = %id, "added builder");

    Ok((StatusCode::CREATED, ok(created)))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let directory = state.directory.lock().await;
    let record = directory
        .get(&id)
        .cloned()
        .ok_or(DirectoryError::NotFound(id))?;
    Ok(ok(record))
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<BuilderPatch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(patch) = body?;

    let mut directory = state.directory.lock().await;
    let updated = directory.update(&id, patch).await?;
    tracing::info!(id = %id, "updated builder");
    Ok(ok(updated))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut directory = state.directory.lock().await;
    let removed = directory.remove(&id).await?;
    tracing::info!(id = %id, "removed builder");
    Ok(ok(removed))
}

// ============ GET /builders/near ============

// Spelled out rather than flattening `OriginSpec`: flattened query
// parameters lose their numeric types.
#[derive(Deserialize)]
struct NearParams {
    lat: Option<f64>,
    lng: Option<f64>,
    zip: Option<String>,
    city: Option<String>,
    state: Option<String>,
    radius: Option<f64>,
}

async fn handle_near(
    State(state): State<AppState>,
    params: Result<Query<NearParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let origin = OriginSpec {
        lat: params.lat,
        lng: params.lng,
        zip: params.zip,
        city: params.city,
        state: params.state,
    };

    // Geocoding may hit the network, so search a snapshot outside the lock.
    let records = state.directory.lock().await.records().to_vec();
    let results = near(
        &state.config,
        &records,
        &origin,
        params.radius,
        state.geocoder.as_deref(),
    )
    .await?;
    Ok(ok(results))
}

// ============ GET /states ============

async fn handle_states(State(state): State<AppState>) -> impl IntoResponse {
    let directory = state.directory.lock().await;
    ok(serde_json::json!({
        "total": directory.len(),
        "states": directory.by_state(),
    }))
}

// ============ GET /markers ============

#[derive(Deserialize)]
struct MarkerParams {
    state: Option<String>,
}

async fn handle_markers(
    State(state): State<AppState>,
    params: Result<Query<MarkerParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params?;
    let directory = state.directory.lock().await;
    let markers = markers_for(
        directory.records(),
        params.state.as_deref(),
        state.config.map.offset,
    );
    Ok(ok(markers))
}

// ============ GET /validate ============

async fn handle_validate(State(state): State<AppState>) -> impl IntoResponse {
    let directory = state.directory.lock().await;
    ok(directory.validate())
}
