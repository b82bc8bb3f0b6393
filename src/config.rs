use serde::Deserialize;

use crate::canonical::schema::{
    BASELINE_COUNTERS, CanonicalOptions, DEFAULT_CPU_CAPACITY, DEFAULT_DISK_CAPACITY,
    DEFAULT_NETWORK_CAPACITY, standard_measures,
};
use crate::canonical::transform::TransformSet;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub normalizers: NormalizersConfig,
    #[serde(default)]
    pub canonical: CanonicalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Root under which `<run_name>/data` and `<run_name>/deploy` are laid out.
    pub reports_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Max canonicalization tasks running at once.
    pub workers: usize,
    /// Recompute every output even when it already exists.
    #[serde(default)]
    pub reset: bool,
}

/// Theoretical capacity each aggregate is normalized by.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizersConfig {
    #[serde(default = "default_network")]
    pub network: f64,
    #[serde(default = "default_disk")]
    pub disk: f64,
    #[serde(default = "default_cpu")]
    pub cpu: f64,
}

fn default_network() -> f64 {
    DEFAULT_NETWORK_CAPACITY
}

fn default_disk() -> f64 {
    DEFAULT_DISK_CAPACITY
}

fn default_cpu() -> f64 {
    DEFAULT_CPU_CAPACITY
}

impl Default for NormalizersConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            disk: default_disk(),
            cpu: default_cpu(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanonicalConfig {
    /// End-of-hour padding above this is reported as a row-count anomaly.
    #[serde(default = "default_row_tolerance")]
    pub row_tolerance: usize,
    /// Raw columns smoothed with a 2-point trailing mean. Empty disables smoothing.
    #[serde(default = "default_smooth_columns")]
    pub smooth_columns: Vec<String>,
}

fn default_row_tolerance() -> usize {
    100
}

fn default_smooth_columns() -> Vec<String> {
    vec!["nr".into(), "nw".into()]
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            row_tolerance: default_row_tolerance(),
            smooth_columns: default_smooth_columns(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("read config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.paths.reports_dir.is_empty(),
            "paths.reports_dir must be non-empty"
        );
        anyhow::ensure!(
            self.processing.workers > 0,
            "processing.workers must be > 0, got {}",
            self.processing.workers
        );
        for (name, value) in [
            ("network", self.normalizers.network),
            ("disk", self.normalizers.disk),
            ("cpu", self.normalizers.cpu),
        ] {
            anyhow::ensure!(
                value.is_finite() && value > 0.0,
                "normalizers.{} must be a positive number, got {}",
                name,
                value
            );
        }
        anyhow::ensure!(
            self.canonical.smooth_columns.iter().all(|c| !c.is_empty()),
            "canonical.smooth_columns must not contain empty names"
        );
        Ok(())
    }

    /// Canonicalization template: baseline counters, standard aggregates, smoothing.
    pub fn canonical_options(&self) -> CanonicalOptions {
        CanonicalOptions {
            baseline: BASELINE_COUNTERS.iter().map(|s| s.to_string()).collect(),
            measures: standard_measures(
                self.normalizers.network,
                self.normalizers.disk,
                self.normalizers.cpu,
            ),
            transforms: TransformSet::trailing_mean(self.canonical.smooth_columns.iter().cloned()),
            row_tolerance: self.canonical.row_tolerance,
        }
    }
}
