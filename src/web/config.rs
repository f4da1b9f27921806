use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::geo::{Gazetteer, GeoPoint, LocationResolver};
use crate::relay::{RelaySettings, SPEED_OF_LIGHT_KM_S};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid location {name:?}: {coordinates:?}")]
    InvalidLocation { name: String, coordinates: String },
    #[error("default location {0:?} cannot be resolved")]
    UnknownDefault(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub orbits: OrbitsConfig,
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub tle_folder: PathBuf,
    /// Only satellites whose name contains this string are loaded.
    #[serde(default)]
    pub name_filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_max_link_range_km")]
    pub max_link_range_km: f64,
    #[serde(default = "default_speed_of_light_km_s")]
    pub speed_of_light_km_s: f64,
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default = "default_destination")]
    pub default_destination: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_link_range_km: default_max_link_range_km(),
            speed_of_light_km_s: default_speed_of_light_km_s(),
            default_source: default_source(),
            default_destination: default_destination(),
        }
    }
}

impl RelayConfig {
    pub fn settings(&self) -> RelaySettings {
        RelaySettings {
            max_link_range_km: self.max_link_range_km,
            speed_of_light_km_s: self.speed_of_light_km_s,
            default_source: self.default_source.clone(),
            default_destination: self.default_destination.clone(),
        }
    }
}

fn default_max_link_range_km() -> f64 {
    1500.0
}

fn default_speed_of_light_km_s() -> f64 {
    SPEED_OF_LIGHT_KM_S
}

fn default_source() -> String {
    "London".to_string()
}

fn default_destination() -> String {
    "New York".to_string()
}

/// Ground-track window served by `/orbits.geojson`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrbitsConfig {
    #[serde(
        default = "default_half_window",
        deserialize_with = "deserialize_duration"
    )]
    pub half_window: Duration,
    #[serde(default = "default_step", deserialize_with = "deserialize_duration")]
    pub step: Duration,
}

impl Default for OrbitsConfig {
    fn default() -> Self {
        Self {
            half_window: default_half_window(),
            step: default_step(),
        }
    }
}

// 0.0012 days
fn default_half_window() -> Duration {
    Duration::from_millis(103_680)
}

// 0.0002 days
fn default_step() -> Duration {
    Duration::from_millis(17_280)
}

/// Extra named place, `coordinates` as `"lat,lon"`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub coordinates: String,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.relay.max_link_range_km > 0.0) {
            return Err(ConfigError::Invalid(
                "relay.max_link_range_km must be positive".into(),
            ));
        }
        if !(self.relay.speed_of_light_km_s > 0.0) {
            return Err(ConfigError::Invalid(
                "relay.speed_of_light_km_s must be positive".into(),
            ));
        }
        if self.orbits.step.is_zero() {
            return Err(ConfigError::Invalid("orbits.step must be positive".into()));
        }
        Ok(())
    }

    /// Built-in places plus the configured ones. Both relay defaults must
    /// resolve.
    pub fn gazetteer(&self) -> Result<Gazetteer, ConfigError> {
        let mut gazetteer = Gazetteer::builtin();
        for location in &self.locations {
            let point = GeoPoint::from_coordinates(&location.coordinates).ok_or_else(|| {
                ConfigError::InvalidLocation {
                    name: location.name.clone(),
                    coordinates: location.coordinates.clone(),
                }
            })?;
            gazetteer.insert(&location.name, point);
        }

        for default in [&self.relay.default_source, &self.relay.default_destination] {
            if gazetteer.resolve(default).is_none() {
                return Err(ConfigError::UnknownDefault(default.clone()));
            }
        }

        Ok(gazetteer)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_str("catalog:\n  tle_folder: tle\n").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.catalog.tle_folder, PathBuf::from("tle"));
        assert!(config.catalog.name_filter.is_none());
        assert_eq!(config.relay.max_link_range_km, 1500.0);
        assert_eq!(config.relay.speed_of_light_km_s, SPEED_OF_LIGHT_KM_S);
        assert_eq!(config.relay.default_source, "London");
        assert_eq!(config.relay.default_destination, "New York");
        assert_eq!(config.orbits.half_window, Duration::from_millis(103_680));
        assert_eq!(config.orbits.step, Duration::from_millis(17_280));
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
web:
  bind: "127.0.0.1:9000"
catalog:
  tle_folder: /var/lib/tle
  name_filter: STARLINK
relay:
  max_link_range_km: 2000
  speed_of_light_km_s: 299792
  default_source: Brisbane
  default_destination: Ground Station A
orbits:
  half_window: 5m
  step: 30s
locations:
  - name: Ground Station A
    coordinates: "-35.4, 149.0"
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.web.bind, "127.0.0.1:9000");
        assert_eq!(config.catalog.name_filter.as_deref(), Some("STARLINK"));
        assert_eq!(config.relay.max_link_range_km, 2000.0);
        assert_eq!(config.orbits.half_window, Duration::from_secs(300));
        assert_eq!(config.orbits.step, Duration::from_secs(30));

        let settings = config.relay.settings();
        assert_eq!(settings.default_destination, "Ground Station A");

        let gazetteer = config.gazetteer().unwrap();
        assert_eq!(
            gazetteer.resolve("ground station a"),
            Some(GeoPoint::new(-35.4, 149.0))
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let zero_range = "catalog:\n  tle_folder: tle\nrelay:\n  max_link_range_km: 0\n";
        assert!(matches!(
            Config::from_str(zero_range),
            Err(ConfigError::Invalid(_))
        ));

        let bad_duration = "catalog:\n  tle_folder: tle\norbits:\n  step: soon\n";
        assert!(matches!(
            Config::from_str(bad_duration),
            Err(ConfigError::Yaml(_))
        ));

        assert!(matches!(Config::from_str("web: {}\n"), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_gazetteer_validation() {
        let bad_location = r#"
catalog:
  tle_folder: tle
locations:
  - name: Nowhere
    coordinates: "north-ish"
"#;
        let config = Config::from_str(bad_location).unwrap();
        assert!(matches!(
            config.gazetteer(),
            Err(ConfigError::InvalidLocation { .. })
        ));

        let unknown_default = "catalog:\n  tle_folder: tle\nrelay:\n  default_source: Atlantis\n";
        let config = Config::from_str(unknown_default).unwrap();
        assert!(matches!(
            config.gazetteer(),
            Err(ConfigError::UnknownDefault(name)) if name == "Atlantis"
        ));
    }
}
