use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::ephemeris::error::CatalogError;
use crate::ephemeris::propagation::{propagate_ecef, Ephemeris};
use crate::ephemeris::types::{SatelliteInfo, SatelliteNode};
use crate::geo::GeoPoint;

pub struct CatalogEntry {
    pub info: SatelliteInfo,
    elements: Elements,
    constants: Constants,
}

impl CatalogEntry {
    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn observe(&self, timestamp: DateTime<Utc>) -> Result<SatelliteNode, CatalogError> {
        let position_km = self.position_at(timestamp)?;
        let node = SatelliteNode {
            info: self.info.clone(),
            position_km,
            subpoint: GeoPoint::from_ecef_km(position_km),
        };
        if !node.is_finite() {
            return Err(CatalogError::NonFinite(self.info.name.clone()));
        }
        Ok(node)
    }
}

impl Ephemeris for CatalogEntry {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], CatalogError> {
        propagate_ecef(&self.elements, &self.constants, timestamp)
    }
}

/// Read-only set of orbital element sets, ordered by NORAD id.
///
/// Built once at startup and shared across requests.
#[derive(Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load all `.tle`/`.txt` files from `tle_dir`.
    ///
    /// Entries whose name does not contain `name_filter`, that fail to parse,
    /// or that do not propagate to a finite position at `checked_at` are
    /// skipped.
    pub fn load(
        tle_dir: &Path,
        name_filter: Option<&str>,
        checked_at: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        if !tle_dir.exists() {
            return Err(CatalogError::DirectoryNotFound(
                tle_dir.display().to_string(),
            ));
        }

        let mut satellites = HashMap::new();

        for entry in fs::read_dir(tle_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension() else {
                continue;
            };
            if ext != "tle" && ext != "txt" {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Failed to read TLE file {}: {}", path.display(), e);
                    continue;
                }
            };
            let source = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            for tle_entry in parse_entries(&content, &source, name_filter, checked_at) {
                satellites.insert(tle_entry.info.norad_id, tle_entry);
            }
        }

        let catalog = Self::from_entries(satellites.into_values().collect());
        log::info!(
            "Loaded {} satellites from {}",
            catalog.len(),
            tle_dir.display()
        );
        Ok(catalog)
    }

    /// Build a catalog from TLE text.
    pub fn from_tle_str(
        content: &str,
        source: &str,
        name_filter: Option<&str>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let mut satellites = HashMap::new();
        for entry in parse_entries(content, source, name_filter, checked_at) {
            satellites.insert(entry.info.norad_id, entry);
        }
        Self::from_entries(satellites.into_values().collect())
    }

    fn from_entries(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by_key(|e| e.info.norad_id);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Positions of every satellite at `timestamp`, in catalog order.
    pub fn snapshot(&self, timestamp: DateTime<Utc>) -> Vec<SatelliteNode> {
        self.entries
            .iter()
            .filter_map(|entry| match entry.observe(timestamp) {
                Ok(node) => Some(node),
                Err(e) => {
                    log::debug!("Skipping {}: {}", entry.info.name, e);
                    None
                }
            })
            .collect()
    }
}

fn parse_entries(
    content: &str,
    source: &str,
    name_filter: Option<&str>,
    checked_at: DateTime<Utc>,
) -> Vec<CatalogEntry> {
    let mut results = Vec::new();

    for (name, line1, line2) in parse_multi_tle(content) {
        if let Some(filter) = name_filter {
            if !name.as_deref().is_some_and(|n| n.contains(filter)) {
                continue;
            }
        }

        match parse_entry(name, &line1, &line2, source) {
            Ok(entry) => match entry.observe(checked_at) {
                Ok(_) => results.push(entry),
                Err(e) => log::warn!("Skipping {} from {}: {}", entry.info.name, source, e),
            },
            Err(e) => log::warn!("{}", e),
        }
    }

    results
}

fn parse_entry(
    name: Option<String>,
    line1: &str,
    line2: &str,
    source: &str,
) -> Result<CatalogEntry, CatalogError> {
    let invalid = |message: String| CatalogError::InvalidTle {
        source_name: source.to_string(),
        message,
    };

    let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
        .map_err(|e| invalid(e.to_string()))?;
    let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

    let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

    Ok(CatalogEntry {
        info: SatelliteInfo {
            name: sat_name,
            norad_id: elements.norad_id as u32,
            tle_source: source.to_string(),
        },
        elements,
        constants,
    })
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    pub(crate) const STARLINK_TLES: &str = "\
STARLINK-1007
1 44713U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9991
2 44713  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236007
STARLINK-1008
1 44714U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 44714  51.6461 221.2784 0001413  89.1723 285.0000 15.49507896236000
STARLINK-1009
1 44715U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9993
2 44715  51.6461 150.0000 0001413  89.1723 100.0000 15.49507896236007
";

    pub(crate) const ISS_TLE: &str = "\
ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

    pub(crate) fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 12, 21, 16, 0).unwrap()
    }

    #[test]
    fn test_parse_multi_tle() {
        let content = format!("{}\n{}", STARLINK_TLES, "garbage line\n");
        let parsed = parse_multi_tle(&content);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0.as_deref(), Some("STARLINK-1007"));

        let unnamed = parse_multi_tle(ISS_TLE.split_once('\n').unwrap().1);
        assert_eq!(unnamed.len(), 1);
        assert!(unnamed[0].0.is_none());
    }

    #[test]
    fn test_catalog_name_filter() {
        let content = format!("{}{}", ISS_TLE, STARLINK_TLES);
        let catalog = Catalog::from_tle_str(&content, "test.tle", Some("STARLINK"), epoch());
        assert_eq!(catalog.len(), 3);
        assert!(catalog
            .entries()
            .iter()
            .all(|e| e.info.name.starts_with("STARLINK")));

        let unfiltered = Catalog::from_tle_str(&content, "test.tle", None, epoch());
        assert_eq!(unfiltered.len(), 4);
        // Ordered by NORAD id
        assert_eq!(unfiltered.entries()[0].info.norad_id, 25544);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let broken = "\
STARLINK-BROKEN
1 44716U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9994
2 44716  51.6461 221.2784 0001413
";
        let content = format!("{}{}", broken, STARLINK_TLES);
        let catalog = Catalog::from_tle_str(&content, "test.tle", None, epoch());
        assert_eq!(catalog.len(), 3);
        assert!(catalog.entries().iter().all(|e| e.info.norad_id != 44716));
    }

    #[test]
    fn test_snapshot_positions() {
        let catalog = Catalog::from_tle_str(STARLINK_TLES, "test.tle", None, epoch());
        let nodes = catalog.snapshot(epoch());
        assert_eq!(nodes.len(), 3);

        for node in &nodes {
            assert!(node.is_finite());
            let radius = crate::geo::distance_km(node.position_km, [0.0, 0.0, 0.0]);
            // Low Earth orbit
            assert!(radius > 6600.0 && radius < 7000.0, "radius {}", radius);
            assert!(node.subpoint.latitude_deg.abs() <= 52.0);
        }

        // Same plane, 4.5 degrees apart in mean anomaly
        let separation = crate::geo::distance_km(nodes[0].position_km, nodes[1].position_km);
        assert!(separation > 400.0 && separation < 700.0, "separation {}", separation);
    }

    #[test]
    fn test_entry_epoch() {
        let catalog = Catalog::from_tle_str(ISS_TLE, "iss.tle", None, epoch());
        let entry = &catalog.entries()[0];
        assert_eq!(entry.info.name, "ISS (ZARYA)");
        assert!((entry.epoch() - epoch()).num_seconds().abs() < 60);
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("starlink.tle"), STARLINK_TLES).unwrap();
        fs::write(dir.path().join("iss.txt"), ISS_TLE).unwrap();
        fs::write(dir.path().join("notes.md"), ISS_TLE).unwrap();

        let catalog = Catalog::load(dir.path(), None, epoch()).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.entries()[1].info.tle_source, "starlink.tle");

        let filtered = Catalog::load(dir.path(), Some("STARLINK"), epoch()).unwrap();
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = Catalog::load(&dir.path().join("missing"), None, epoch());
        assert!(matches!(result, Err(CatalogError::DirectoryNotFound(_))));
    }
}
