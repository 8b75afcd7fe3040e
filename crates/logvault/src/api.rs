use std::str::FromStr;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use logvault_core::config::Config;
use logvault_core::dimension::Dimension;
use logvault_core::query::{AggregateRequest, IngestError, IngestReport, PageRequest};
use logvault_ingest::ingest;
use logvault_store::Store;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::auth::{AuthVerifier, Authenticated};

#[derive(Clone)]
pub struct ApiState {
    pub store: Store,
    pub verifier: AuthVerifier,
    pub page_size: u32,
}

pub fn router(store: Store, cfg: &Config) -> Router {
    let state = ApiState {
        store,
        verifier: AuthVerifier::new(&cfg.auth_secret),
        page_size: cfg.page_size,
    };
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(upload))
        .route("/logs", post(page))
        .route("/logs/aggregate", post(aggregate))
        .route("/status", get(status))
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// CSV upload. The whole valid partition commits in one transaction; a store
/// failure therefore reports zero inserted rows, never a partial count.
async fn upload(
    Authenticated(ctx): Authenticated,
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Response {
    let data = match read_logfile_field(multipart).await {
        Ok(Some(data)) => data,
        Ok(None) => return failure(StatusCode::BAD_REQUEST, "missing logfile field"),
        Err(response) => return response,
    };

    let outcome = match ingest(data.as_ref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(request_id = %ctx.request_id, error = %e, "upload not decodable");
            return failure(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    match state.store.insert_batch(&outcome.valid) {
        Ok(inserted) => {
            tracing::info!(
                request_id = %ctx.request_id,
                user = %ctx.principal.username,
                inserted,
                invalid = outcome.invalid_count,
                "upload committed"
            );
            Json(IngestReport {
                total_entries: inserted,
                invalid_entries: outcome.invalid_count,
                error: outcome
                    .first_error
                    .as_ref()
                    .map(IngestError::from_validation),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %ctx.request_id, error = %e, "upload rolled back");
            failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn page(
    Authenticated(ctx): Authenticated,
    State(state): State<ApiState>,
    Json(req): Json<PageRequest>,
) -> Response {
    let page = req.page.unwrap_or(1).max(1);
    let limit = req.limit.unwrap_or(state.page_size).max(1);

    match state.store.page(page, limit) {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            tracing::error!(request_id = %ctx.request_id, error = %e, "page read failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to retrieve logs")
        }
    }
}

async fn aggregate(
    Authenticated(ctx): Authenticated,
    State(state): State<ApiState>,
    Json(req): Json<AggregateRequest>,
) -> Response {
    // The dimension is parsed before any query is shaped; unknown values
    // never reach the store.
    let dimension = match Dimension::from_str(&req.group_by) {
        Ok(dimension) => dimension,
        Err(e) => return failure(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match state.store.aggregate(dimension) {
        Ok(rows) => {
            let body: Vec<Value> = rows
                .into_iter()
                .map(|row| {
                    let mut obj = serde_json::Map::new();
                    obj.insert(dimension.as_str().to_string(), Value::String(row.key));
                    obj.insert("count".to_string(), Value::from(row.count));
                    obj.insert("error_count".to_string(), Value::from(row.error_count));
                    Value::Object(obj)
                })
                .collect();
            Json(body).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %ctx.request_id, error = %e, "aggregation failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Aggregation failed")
        }
    }
}

async fn status(State(state): State<ApiState>) -> Response {
    match state.store.status() {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "status read failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Status unavailable")
        }
    }
}

async fn read_logfile_field(
    mut multipart: Multipart,
) -> Result<Option<axum::body::Bytes>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(failure(StatusCode::BAD_REQUEST, &e.to_string())),
        };

        if field.name() != Some("logfile") {
            continue;
        }

        return match field.bytes().await {
            Ok(data) => Ok(Some(data)),
            Err(e) => Err(failure(StatusCode::BAD_REQUEST, &e.to_string())),
        };
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": { "message": message } }))).into_response()
}
