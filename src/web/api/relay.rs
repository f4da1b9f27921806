use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::relay::{plan_route, RelayPath};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub at: Option<String>,
}

#[utoipa::path(
    get,
    path = "/path/{from}/{to}/",
    tag = "relay",
    params(
        ("from" = String, Path, description = "Source place name or \"lat,lon\""),
        ("to" = String, Path, description = "Destination place name or \"lat,lon\"")
    ),
    responses(
        (status = 200, description = "GeoJSON FeatureCollection with one LineString from destination to source"),
        (status = 400, description = "Undecodable place name", body = ErrorResponse),
        (status = 404, description = "No relay path between the endpoints", body = ErrorResponse),
        (status = 503, description = "No relay satellites loaded", body = ErrorResponse)
    )
)]
pub async fn city_path(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path((from, to)) = path.map_err(|e| ApiError::Validation(e.body_text()))?;
    let path = compute_path(state, from, to, Utc::now()).await?;
    Ok((StatusCode::OK, Json(path.to_feature_collection())))
}

#[utoipa::path(
    get,
    path = "/api/path",
    tag = "relay",
    params(
        ("from" = Option<String>, Query, description = "Source place; the configured default when omitted"),
        ("to" = Option<String>, Query, description = "Destination place; the configured default when omitted"),
        ("at" = Option<String>, Query, description = "Instant (RFC3339), now when omitted")
    ),
    responses(
        (status = 200, description = "GeoJSON FeatureCollection with one LineString from destination to source"),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "No relay path between the endpoints", body = ErrorResponse),
        (status = 503, description = "No relay satellites loaded", body = ErrorResponse)
    )
)]
pub async fn query_path(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let at = match query.at.as_deref() {
        Some(s) => parse_datetime(s)?,
        None => Utc::now(),
    };
    let relay = &state.config.relay;
    let from = query.from.unwrap_or_else(|| relay.default_source.clone());
    let to = query.to.unwrap_or_else(|| relay.default_destination.clone());

    let path = compute_path(state, from, to, at).await?;
    Ok((StatusCode::OK, Json(path.to_feature_collection())))
}

async fn compute_path(
    state: AppState,
    from: String,
    to: String,
    at: DateTime<Utc>,
) -> ApiResult<RelayPath> {
    let result = tokio::task::spawn_blocking(move || {
        let settings = state.config.relay.settings();
        plan_route(
            &state.catalog,
            state.gazetteer.as_ref(),
            &settings,
            &from,
            &to,
            at,
        )
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    result.map_err(|e| {
        log::warn!("Relay query failed: {}", e);
        ApiError::from(e)
    })
}

fn parse_datetime(s: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Validation(format!("invalid 'at' timestamp: {}", e)))
}
