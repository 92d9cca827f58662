use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Analytics engine tuning parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Expected outlier fraction for anomaly detection, in (0.0, 0.5)
    pub contamination: f64,
    /// Target cluster count for region clustering
    pub cluster_count: usize,
    /// Random seed for the isolation forest
    pub anomaly_seed: u64,
    /// Random seed for k-means initialization
    pub kmeans_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            cluster_count: 3,
            anomaly_seed: 42,
            kmeans_seed: 42,
        }
    }
}

impl EngineConfig {
    /// Check parameter ranges before handing the config to the engine.
    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination < 0.5) {
            return Err(Error::Configuration(format!(
                "contamination must be in (0.0, 0.5), got {}",
                self.contamination
            )));
        }
        if self.cluster_count == 0 {
            return Err(Error::Configuration(
                "cluster_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Dataset directory layout for the (out-of-scope) ingestion layer.
///
/// The engine itself never touches the filesystem; this object only
/// replaces hard-coded paths so callers can inject locations explicitly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSourceConfig {
    /// Base directory holding the dataset folders
    pub base_dir: String,
    /// Enrollment dataset folder
    pub enrollment_dir: String,
    /// Demographic-update dataset folder
    pub demographic_dir: String,
    /// Biometric-update dataset folder
    pub biometric_dir: String,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            enrollment_dir: "enrollment".to_string(),
            demographic_dir: "demographic".to_string(),
            biometric_dir: "biometric".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InsightConfig {
    pub engine: EngineConfig,
    pub sources: DataSourceConfig,
}

impl InsightConfig {
    /// Load configuration: defaults, then an optional TOML file, then
    /// environment variables (INSIGHT_ prefix) on top.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        let defaults = InsightConfig::default();
        settings = settings.add_source(
            config::Config::try_from(&defaults)
                .map_err(|e| Error::Configuration(e.to_string()))?,
        );

        let config_paths = ["insight-config.toml", "config/insight.toml"];
        for path in &config_paths {
            if std::path::Path::new(path).exists() {
                settings = settings.add_source(config::File::with_name(path));
                break;
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("INSIGHT")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: InsightConfig = settings
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Configuration(e.to_string()))?;
        loaded.engine.validate()?;
        Ok(loaded)
    }
}
