use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aggregate::DEFAULT_NOISE_FLOOR;
use crate::budget::DEFAULT_MAX_TERMS;
use crate::classify::EXCLUSIVE_THRESHOLD;
use crate::errors::{CloudError, Result};
use crate::layout::{Canvas, DEFAULT_MAX_ATTEMPTS};

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "CLOUD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub threshold: f64,
    pub noise_floor: f64,
    pub max_terms: usize,
    pub max_attempts: usize,
    pub canvas: Canvas,
    /// Fixed layout seed; random per pass when absent.
    pub seed: Option<u64>,
    pub source: SourceConfig,
    pub output_dir: PathBuf,
}

/// Where topic files come from. `dir` wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            threshold: EXCLUSIVE_THRESHOLD,
            noise_floor: DEFAULT_NOISE_FLOOR,
            max_terms: DEFAULT_MAX_TERMS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            canvas: Canvas::new(1200.0, 700.0),
            seed: None,
            source: SourceConfig::default(),
            output_dir: PathBuf::from("out"),
        }
    }
}

impl CloudConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: CloudConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config - path={}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// `--config` beats `CLOUD_CONFIG`; defaults when neither is set.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let path = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(p) => Self::load(&p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Below 0.5 both parties could claim the same term.
        if self.threshold.is_nan() || self.threshold <= 0.5 || self.threshold > 1.0 {
            return Err(CloudError::invalid_config(format!(
                "threshold must be in (0.5, 1], got {}",
                self.threshold
            )));
        }
        if self.noise_floor.is_nan() || self.noise_floor < 0.0 {
            return Err(CloudError::invalid_config("noise_floor must be >= 0"));
        }
        if self.max_terms == 0 || self.max_attempts == 0 {
            return Err(CloudError::invalid_config("max_terms and max_attempts must be positive"));
        }
        if self.canvas.width.is_nan() || self.canvas.height.is_nan() || self.canvas.width <= 0.0 || self.canvas.height <= 0.0 {
            return Err(CloudError::invalid_config(format!(
                "canvas must be positive, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        Ok(())
    }
}
