use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::plotting::{CorrelationOptions, DistributionOptions};

/// Environment variable naming a JSON config file for the viewer.
pub const CONFIG_ENV: &str = "COHORT_VIEW_CONFIG";

/// Viewer settings; every field falls back to its default when absent.
///
/// ```json
/// {
///   "correlation": { "scheme": "viridis", "cat_mode": "violin", "n_out": 4 },
///   "distribution": { "nbins": 20 },
///   "chart_height": 320.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub correlation: CorrelationOptions,
    pub distribution: DistributionOptions,
    /// Height of each plot in the fraction view, in points.
    pub chart_height: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            correlation: CorrelationOptions::default(),
            distribution: DistributionOptions::default(),
            chart_height: 300.0,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from the file named by [`CONFIG_ENV`], or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = Path::new(&path);
                log::info!("loading viewer config from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorScheme;
    use crate::plotting::{CategoricalMode, ColumnKind};
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"correlation": {{"scheme": "viridis", "cat_mode": "violin"}}, "distribution": {{"kind": "continuous"}}}}"#
        )
        .unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.correlation.scheme, ColorScheme::Viridis);
        assert_eq!(config.correlation.cat_mode, CategoricalMode::Violin);
        assert_eq!(config.correlation.prefac, 10.0);
        assert_eq!(config.distribution.kind, ColumnKind::Continuous);
        assert_eq!(config.distribution.nbins, 30);
        assert_eq!(config.chart_height, 300.0);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"correlation": {{"cont_mode": "hexbin"}}}}"#).unwrap();
        assert!(ViewerConfig::load(file.path()).is_err());
    }
}
