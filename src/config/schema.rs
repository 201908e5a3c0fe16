use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Where the comparison is stored (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,
    pub seed: SeedMode,
    pub results: ResultsConfig,
}

/// Contents of a store that has never been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    #[default]
    Example,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Displayed score is `round(score * score_scale)`
    pub score_scale: f64,
    pub show_breakdown: bool,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            score_scale: 1000.0,
            show_breakdown: false,
        }
    }
}
