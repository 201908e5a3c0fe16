mod schema;

pub use schema::{Config, ResultsConfig, SeedMode};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::Comparison;

/// Get the config directory path (~/.config/comparo/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("comparo"))
}

/// Get the default config file path (~/.config/comparo/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Platform data directory for the stored comparison
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("comparo"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.local/share/comparo",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Load configuration from a YAML file
///
/// A missing file yields the defaults. An explicit `path` that does not exist
/// is an error.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}

pub fn parse_config(yaml: &str) -> Result<Config> {
    // An empty document means "all defaults"
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_saphyr::from_str(yaml)?;
    Ok(config)
}

/// Validate a loaded config, reporting every problem at once.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let scale = config.results.score_scale;
    if !(scale.is_finite() && scale > 0.0) {
        errors.push(format!(
            "results.score_scale: must be a positive number, got {}",
            scale
        ));
    }

    if let Some(dir) = &config.data_dir {
        if dir.as_os_str().is_empty() {
            errors.push("data_dir: must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Config {
    /// Store location with a leading `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => expand_home(dir),
            None => default_data_dir(),
        }
    }

    /// Initial comparison for a fresh store
    pub fn seed_comparison(&self) -> Comparison {
        match self.seed {
            SeedMode::Example => Comparison::example(),
            SeedMode::Empty => Comparison::empty(),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.seed, SeedMode::Example);
        assert_eq!(config.results.score_scale, 1000.0);
        assert!(!config.results.show_breakdown);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
data_dir: /tmp/comparo-data
seed: empty
results:
  score_scale: 100
  show_breakdown: true
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/comparo-data"));
        assert_eq!(config.seed, SeedMode::Empty);
        assert_eq!(config.results.score_scale, 100.0);
        assert!(config.results.show_breakdown);
        assert_eq!(config.seed_comparison(), Comparison::empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = parse_config("results:\n  show_breakdown: true\n").unwrap();
        assert_eq!(config.seed, SeedMode::Example);
        assert_eq!(config.results.score_scale, 1000.0);
        assert!(config.results.show_breakdown);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_unknown_seed_is_rejected() {
        assert!(parse_config("seed: sample\n").is_err());
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let mut config = Config::default();
        config.results.score_scale = 0.0;
        config.data_dir = Some(PathBuf::new());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("results.score_scale"));
        assert!(errors[1].starts_with("data_dir"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_path = env::temp_dir().join("comparo_test_config_missing.yaml");
        let _ = std::fs::remove_file(&temp_path);
        assert!(load_config(Some(temp_path)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_path = env::temp_dir().join("comparo_test_config_load.yaml");
        std::fs::write(&temp_path, "seed: empty\n").unwrap();

        let config = load_config(Some(temp_path.clone())).unwrap();
        assert_eq!(config.seed, SeedMode::Empty);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_tilde_expansion() {
        if let Some(home) = dirs::home_dir() {
            let config = Config {
                data_dir: Some(PathBuf::from("~/comparo")),
                ..Default::default()
            };
            assert_eq!(config.data_dir(), home.join("comparo"));
        }
    }
}
