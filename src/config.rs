use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::binning::BinningParams;
use crate::geodesy::DEFAULT_SPHERE_RADIUS_M;
use crate::publish::PublishSettings;
use crate::stats::AggregateParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_sites")]
    pub sites: PathBuf,
    #[serde(default)]
    pub binning: BinningConfig,
    #[serde(default)]
    pub aggregate: AggregateConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_sites() -> PathBuf {
    PathBuf::from("launchSites.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            binning: BinningConfig::default(),
            aggregate: AggregateConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinningConfig {
    pub radius_km: f64,
    pub alt_limit_m: f64,
    /// Sphere radius for distance calculations. The default suits
    /// Australian latitudes.
    pub sphere_radius_m: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            radius_km: 30.0,
            alt_limit_m: 5000.0,
            sphere_radius_m: DEFAULT_SPHERE_RADIUS_M,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateConfig {
    pub min_samples: usize,
    pub descent_max_alt_m: f64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            min_samples: 5,
            descent_max_alt_m: 12000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub sink_dir: PathBuf,
    pub prefix: String,
    pub workers: usize,
    pub queue_capacity: usize,
    /// Replacement for the built-in sonde type table.
    pub type_table: Option<PathBuf>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            sink_dir: PathBuf::from("uploads"),
            prefix: "launchsites".to_string(),
            workers: 4,
            queue_capacity: 256,
            type_table: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.aggregate.min_samples < 1 {
            return Err(ConfigError::Invalid(
                "aggregate.min_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn binning_params(&self) -> BinningParams {
        BinningParams {
            radius_km: self.binning.radius_km,
            alt_limit_m: self.binning.alt_limit_m,
            sphere_radius_m: self.binning.sphere_radius_m,
        }
    }

    pub fn aggregate_params(&self) -> AggregateParams {
        AggregateParams {
            min_samples: self.aggregate.min_samples,
            descent_max_alt_m: self.aggregate.descent_max_alt_m,
        }
    }

    pub fn publish_settings(&self) -> PublishSettings {
        PublishSettings {
            prefix: self.publish.prefix.clone(),
            workers: self.publish.workers,
            queue_capacity: self.publish.queue_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.sites, PathBuf::from("launchSites.json"));
        assert_eq!(config.binning_params(), BinningParams::default());
        assert_eq!(config.aggregate_params(), AggregateParams::default());
        assert_eq!(config.publish_settings(), PublishSettings::default());
        assert!(config.publish.type_table.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
sites: /data/launchSites.json
binning:
  radius_km: 15
  sphere_radius_m: 6371000
aggregate:
  min_samples: 10
publish:
  workers: 8
  type_table: types.yaml
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.sites, PathBuf::from("/data/launchSites.json"));
        assert_eq!(config.binning.radius_km, 15.0);
        assert_eq!(config.binning.alt_limit_m, 5000.0);
        assert_eq!(config.binning.sphere_radius_m, 6_371_000.0);
        assert_eq!(config.aggregate.min_samples, 10);
        assert_eq!(config.aggregate.descent_max_alt_m, 12000.0);
        assert_eq!(config.publish.workers, 8);
        assert_eq!(config.publish.queue_capacity, 256);
        assert_eq!(config.publish.type_table, Some(PathBuf::from("types.yaml")));
    }

    #[test]
    fn test_zero_min_samples_rejected() {
        let err = Config::from_str("aggregate:\n  min_samples: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("min_samples"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            Config::from_str("binning:\n  radius: 10\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
