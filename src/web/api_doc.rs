use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::satellites::{CatalogItem, CatalogResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::relay::city_path,
        super::api::relay::query_path,
        super::api::satellites::satellites_geojson,
        super::api::satellites::orbits_geojson,
        super::api::satellites::catalog_summary,
    ),
    components(
        schemas(
            ErrorResponse,
            CatalogItem,
            CatalogResponse,
            crate::ephemeris::SatelliteInfo,
        )
    ),
    info(
        title = "Starlink Relay API",
        description = "Shortest relay paths between ground locations through a satellite mesh",
        version = "0.1.0"
    ),
    tags(
        (name = "relay", description = "Relay path queries"),
        (name = "satellites", description = "Satellite positions and ground tracks")
    )
)]
pub struct ApiDoc;
