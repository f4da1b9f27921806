use serde::Serialize;

/// GeoJSON geometry. Coordinates are always `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature<P> {
    pub properties: P,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection<P> {
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self { features }
    }
}

impl<P> FromIterator<Feature<P>> for FeatureCollection<P> {
    fn from_iter<I: IntoIterator<Item = Feature<P>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Properties carried by per-satellite layers.
#[derive(Debug, Clone, Serialize)]
pub struct NameProperties {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_feature_layout() {
        let collection: FeatureCollection<NameProperties> = vec![Feature {
            properties: NameProperties {
                name: "STARLINK-1007".into(),
            },
            geometry: Geometry::Point {
                coordinates: [153.4, -27.4],
            },
        }]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": { "name": "STARLINK-1007" },
                    "geometry": { "type": "Point", "coordinates": [153.4, -27.4] }
                }]
            })
        );
    }

    #[test]
    fn test_empty_collection() {
        let collection: FeatureCollection<NameProperties> = FeatureCollection::new(Vec::new());
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value, json!({ "type": "FeatureCollection", "features": [] }));
    }
}
