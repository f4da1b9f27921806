use std::collections::HashMap;

use super::point::GeoPoint;

/// Resolves a free-text place name to a surface point.
pub trait LocationResolver {
    fn resolve(&self, name: &str) -> Option<GeoPoint>;
}

// (name, latitude, longitude)
const BUILTIN_CITIES: &[(&str, f64, f64)] = &[
    ("Abu Dhabi", 24.4666667, 54.3666667),
    ("Amsterdam", 52.3730556, 4.8922222),
    ("Athens", 37.9792200, 23.7166470),
    ("Atlanta", 33.7489954, -84.3879824),
    ("Auckland", -36.8484597, 174.7633315),
    ("Bangkok", 13.7234186, 100.4762319),
    ("Barcelona", 41.3879170, 2.1699187),
    ("Beijing", 39.9042110, 116.4073950),
    ("Berlin", 52.5234051, 13.4113999),
    ("Bogota", 4.5980556, -74.0758333),
    ("Boston", 42.3584308, -71.0597732),
    ("Brisbane", -27.4709331, 153.0235024),
    ("Buenos Aires", -34.6084175, -58.3731613),
    ("Cairo", 30.0444196, 31.2357116),
    ("Cape Town", -33.9248685, 18.4240553),
    ("Chicago", 41.8781136, -87.6297982),
    ("Copenhagen", 55.6760968, 12.5683371),
    ("Dallas", 32.7801399, -96.8004511),
    ("Delhi", 28.6353080, 77.2249600),
    ("Denver", 39.7391536, -104.9847034),
    ("Dubai", 25.2644444, 55.3116667),
    ("Dublin", 53.3441040, -6.2674937),
    ("Edinburgh", 55.9501755, -3.1875359),
    ("Hong Kong", 22.2855200, 114.1576900),
    ("Honolulu", 21.3069444, -157.8583333),
    ("Houston", 29.7628844, -95.3830615),
    ("Istanbul", 41.0052367, 28.9776970),
    ("Jakarta", -6.2087634, 106.8455990),
    ("Johannesburg", -26.2041028, 28.0473051),
    ("Lagos", 6.4530556, 3.3958333),
    ("Lima", -12.0433333, -77.0283333),
    ("Lisbon", 38.7071631, -9.1359960),
    ("London", 51.5001524, -0.1262362),
    ("Los Angeles", 34.0522342, -118.2436849),
    ("Madrid", 40.4166909, -3.7003454),
    ("Manila", 14.5833333, 120.9666667),
    ("Melbourne", -37.8131869, 144.9629796),
    ("Mexico City", 19.4270499, -99.1275711),
    ("Miami", 25.7889689, -80.2264393),
    ("Montreal", 45.5088889, -73.5541667),
    ("Moscow", 55.7557860, 37.6176330),
    ("Mumbai", 18.9752780, 72.8258330),
    ("Nairobi", -1.2833333, 36.8166667),
    ("New York", 40.7143528, -74.0059731),
    ("Oslo", 59.9138204, 10.7387413),
    ("Paris", 48.8566667, 2.3509871),
    ("Perth", -31.9554000, 115.8585900),
    ("Reykjavik", 64.1353380, -21.8952100),
    ("Rio de Janeiro", -22.9035393, -43.2095869),
    ("Rome", 41.8954656, 12.4823243),
    ("San Francisco", 37.7749295, -122.4194155),
    ("Santiago", -33.4253598, -70.5664659),
    ("Sao Paulo", -23.5489433, -46.6388182),
    ("Seattle", 47.6062095, -122.3320708),
    ("Seoul", 37.5663889, 126.9997222),
    ("Shanghai", 31.2304160, 121.4737010),
    ("Singapore", 1.2930556, 103.8558333),
    ("Stockholm", 59.3327881, 18.0644881),
    ("Sydney", -33.8599722, 151.2111111),
    ("Taipei", 25.0910750, 121.5598345),
    ("Tokyo", 35.6894875, 139.6917064),
    ("Toronto", 43.6525000, -79.3816667),
    ("Vancouver", 49.2630548, -123.1385450),
    ("Vienna", 48.2092062, 16.3727778),
    ("Warsaw", 52.2296756, 21.0122287),
    ("Washington", 38.8951118, -77.0363658),
    ("Wellington", -41.2864603, 174.7762421),
    ("Zurich", 47.3833333, 8.5333333),
];

/// Place-name lookup table.
///
/// Names are matched case-insensitively and URL-decoded (`+` or `%20` for a
/// space), so `new+york`, `New%20York` and `New York` resolve alike. A
/// `"lat,lon"` string resolves to itself.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: HashMap<String, GeoPoint>,
}

impl Gazetteer {
    pub fn builtin() -> Self {
        let mut gazetteer = Self::default();
        for (name, lat, lon) in BUILTIN_CITIES {
            gazetteer.insert(name, GeoPoint::new(*lat, *lon));
        }
        gazetteer
    }

    /// Add or replace a place.
    pub fn insert(&mut self, name: &str, point: GeoPoint) {
        self.places.insert(normalize_place_name(name), point);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }
}

impl LocationResolver for Gazetteer {
    fn resolve(&self, name: &str) -> Option<GeoPoint> {
        if let Some(point) = self.places.get(&normalize_place_name(name)) {
            return Some(*point);
        }
        GeoPoint::from_coordinates(&decode_place_name(name))
    }
}

/// Resolve `name`, falling back to `fallback` when it is unknown.
pub fn resolve_with_fallback<R: LocationResolver + ?Sized>(
    resolver: &R,
    name: &str,
    fallback: &str,
) -> Option<GeoPoint> {
    match resolver.resolve(name) {
        Some(point) => Some(point),
        None => {
            log::info!("Unknown location {:?}, using default {:?}", name, fallback);
            resolver.resolve(fallback)
        }
    }
}

fn decode_place_name(name: &str) -> String {
    let spaced = name.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).ok().map(|d| d.into_owned());
    decoded.unwrap_or(spaced)
}

fn normalize_place_name(name: &str) -> String {
    decode_place_name(name)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
