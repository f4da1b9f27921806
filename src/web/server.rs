use axum::{routing::get, Router};
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ephemeris::Catalog;
use crate::geo::Gazetteer;

use super::api::error::not_found;
use super::api::relay as relay_handlers;
use super::api::satellites as satellite_handlers;
use super::api_doc::ApiDoc;
use super::config::{Config, ConfigError};

/// Shared, read-only state. Per-request graph state never lives here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub gazetteer: Arc<Gazetteer>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> Result<Self, ConfigError> {
        let gazetteer = config.gazetteer()?;
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            gazetteer: Arc::new(gazetteer),
        })
    }
}

/// Load the catalog once. A missing folder leaves the catalog empty.
pub fn load_catalog(config: &Config) -> Catalog {
    match Catalog::load(
        &config.catalog.tle_folder,
        config.catalog.name_filter.as_deref(),
        Utc::now(),
    ) {
        Ok(catalog) => {
            if catalog.is_empty() {
                log::warn!("No satellites loaded; relay queries will fail");
            }
            catalog
        }
        Err(e) => {
            log::warn!("Failed to load TLE catalog: {}", e);
            Catalog::default()
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // GeoJSON layers
        .route("/path/{from}/{to}", get(relay_handlers::city_path))
        .route("/path/{from}/{to}/", get(relay_handlers::city_path))
        .route("/sats.geojson", get(satellite_handlers::satellites_geojson))
        .route("/orbits.geojson", get(satellite_handlers::orbits_geojson))
        // JSON API
        .route("/api/path", get(relay_handlers::query_path))
        .route("/api/catalog", get(satellite_handlers::catalog_summary))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let catalog = load_catalog(&config);

    let state = AppState::new(config, catalog)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Serving {} satellites, {} known places",
        state.catalog.len(),
        state.gazetteer.len()
    );

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::fixtures::{epoch, STARLINK_TLES};
    use crate::geo::LocationResolver;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn config() -> Config {
        Config::from_str(
            r#"
catalog:
  tle_folder: tle
locations:
  - name: Ocean Station
    coordinates: "-10.5, 140.25"
"#,
        )
        .unwrap()
    }

    fn app(catalog: Catalog) -> Router {
        router(AppState::new(config(), catalog).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_path_without_satellites() {
        let (status, body) = get_json(app(Catalog::default()), "/path/London/Tokyo/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "no_relay_nodes");
    }

    #[tokio::test]
    async fn test_query_path_at_epoch() {
        let catalog = Catalog::from_tle_str(STARLINK_TLES, "test.tle", None, epoch());
        let nodes = catalog.snapshot(epoch());
        let from = format!("{},{}", nodes[0].subpoint.latitude_deg, nodes[0].subpoint.longitude_deg);
        let to = format!("{},{}", nodes[1].subpoint.latitude_deg, nodes[1].subpoint.longitude_deg);
        let uri = format!(
            "/api/path?from={}&to={}&at={}",
            from,
            to,
            "2020-07-12T21:16:00Z"
        );

        let (status, body) = get_json(app(catalog), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");

        let feature = &body["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["properties"]["name"], format!("{} to {}", from, to));
        assert!(feature["properties"]["distance"].as_f64().unwrap() > 0.0);
        assert!(feature["properties"]["time"].as_f64().unwrap() > 0.0);

        let coordinates = feature["geometry"]["coordinates"].as_array().unwrap();
        assert_eq!(coordinates.len(), 4);
        // Destination first, [lon, lat]
        let close = |value: &Value, expected: f64| (value.as_f64().unwrap() - expected).abs() < 1e-9;
        assert!(close(&coordinates[0][0], nodes[1].subpoint.longitude_deg));
        assert!(close(&coordinates[0][1], nodes[1].subpoint.latitude_deg));
        assert!(close(&coordinates[3][0], nodes[0].subpoint.longitude_deg));
        assert!(close(&coordinates[3][1], nodes[0].subpoint.latitude_deg));
    }

    #[tokio::test]
    async fn test_query_path_rejects_bad_timestamp() {
        let (status, body) = get_json(app(Catalog::default()), "/api/path?at=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn test_query_path_disconnected() {
        let catalog = Catalog::from_tle_str(STARLINK_TLES, "test.tle", None, epoch());
        let nodes = catalog.snapshot(epoch());
        let uri = format!(
            "/api/path?from={},{}&to={},{}&at=2020-07-12T21:16:00Z",
            nodes[0].subpoint.latitude_deg,
            nodes[0].subpoint.longitude_deg,
            nodes[2].subpoint.latitude_deg,
            nodes[2].subpoint.longitude_deg,
        );

        let (status, body) = get_json(app(catalog), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no_path");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_json() {
        let (status, body) = get_json(app(Catalog::default()), "/path/London/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, body) = get_json(app(Catalog::default()), "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_undecodable_place_is_rejected() {
        let (status, body) = get_json(app(Catalog::default()), "/path/%FF/London").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn test_catalog_summary() {
        let catalog = Catalog::from_tle_str(STARLINK_TLES, "test.tle", None, epoch());
        let (status, body) = get_json(app(catalog), "/api/catalog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["satellite_count"], 3);
        assert_eq!(body["satellites"][0]["name"], "STARLINK-1007");
        assert_eq!(body["satellites"][0]["norad_id"], 44713);
        assert!(body["satellites"][0]["epoch"].as_str().unwrap().starts_with("2020-07-12T21:16"));
    }

    #[tokio::test]
    async fn test_layers_are_feature_collections() {
        let (status, body) = get_json(app(Catalog::default()), "/sats.geojson").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "type": "FeatureCollection", "features": [] }));

        let (status, body) = get_json(app(Catalog::default()), "/orbits.geojson").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
    }

    #[test]
    fn test_configured_places_are_resolvable() {
        let state = AppState::new(config(), Catalog::default()).unwrap();
        assert!(state.gazetteer.resolve("ocean station").is_some());
        assert!(state.gazetteer.resolve("London").is_some());
    }
}
