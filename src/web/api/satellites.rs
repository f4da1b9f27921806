use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::ephemeris::{ground_track, SatelliteInfo};
use crate::geo::geojson::{Feature, FeatureCollection, Geometry, NameProperties};
use crate::web::api::error::{ApiError, ApiResult};
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogItem {
    #[serde(flatten)]
    pub info: SatelliteInfo,
    pub epoch: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub satellite_count: usize,
    pub satellites: Vec<CatalogItem>,
}

#[utoipa::path(
    get,
    path = "/sats.geojson",
    tag = "satellites",
    responses(
        (status = 200, description = "GeoJSON FeatureCollection with one Point per satellite")
    )
)]
pub async fn satellites_geojson(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let now = Utc::now();
    let collection = tokio::task::spawn_blocking(move || {
        state
            .catalog
            .snapshot(now)
            .into_iter()
            .map(|node| Feature {
                properties: NameProperties {
                    name: node.info.name,
                },
                geometry: Geometry::Point {
                    coordinates: node.subpoint.lon_lat(),
                },
            })
            .collect::<FeatureCollection<_>>()
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, Json(collection)))
}

#[utoipa::path(
    get,
    path = "/orbits.geojson",
    tag = "satellites",
    responses(
        (status = 200, description = "GeoJSON FeatureCollection with one LineString ground track per satellite")
    )
)]
pub async fn orbits_geojson(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let orbits = &state.config.orbits;
    let half_window =
        Duration::from_std(orbits.half_window).map_err(|e| ApiError::Internal(e.to_string()))?;
    let step = Duration::from_std(orbits.step).map_err(|e| ApiError::Internal(e.to_string()))?;
    let now = Utc::now();

    let collection = tokio::task::spawn_blocking(move || {
        state
            .catalog
            .entries()
            .iter()
            .filter_map(|entry| match ground_track(entry, now, half_window, step) {
                Ok(coordinates) => Some(Feature {
                    properties: NameProperties {
                        name: entry.info.name.clone(),
                    },
                    geometry: Geometry::LineString { coordinates },
                }),
                Err(e) => {
                    log::debug!("No ground track for {}: {}", entry.info.name, e);
                    None
                }
            })
            .collect::<FeatureCollection<_>>()
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::OK, Json(collection)))
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "satellites",
    responses(
        (status = 200, description = "Loaded satellites", body = CatalogResponse)
    )
)]
pub async fn catalog_summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let satellites: Vec<CatalogItem> = state
        .catalog
        .entries()
        .iter()
        .map(|entry| CatalogItem {
            info: entry.info.clone(),
            epoch: entry.epoch(),
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(CatalogResponse {
            satellite_count: satellites.len(),
            satellites,
        }),
    ))
}
