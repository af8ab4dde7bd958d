use crate::constants::{
    DEFAULT_FLAT_OUTPUT, DEFAULT_GROUPED_OUTPUT, DEFAULT_HEIGHT_CM, DEFAULT_IMG_DIR,
    DEFAULT_INPUT, IMG_DIR_ENV,
};
use crate::error::{ImportError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transform: TransformConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub input: PathBuf,
    pub flat_output: PathBuf,
    pub grouped_output: PathBuf,
    pub default_height_cm: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            flat_output: PathBuf::from(DEFAULT_FLAT_OUTPUT),
            grouped_output: PathBuf::from(DEFAULT_GROUPED_OUTPUT),
            default_height_cm: DEFAULT_HEIGHT_CM,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub img_dir: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            img_dir: PathBuf::from(DEFAULT_IMG_DIR),
        }
    }
}

impl Config {
    /// Load the config file if it exists, falling back to built-in defaults,
    /// then apply environment overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                ImportError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path.display(),
                    e
                ))
            })?;
            Self::parse(&config_content)?
        } else {
            debug!("No config at {}, using defaults", config_path.display());
            Self::default()
        };

        if let Ok(dir) = std::env::var(IMG_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.download.img_dir = PathBuf::from(dir);
            }
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if !config.transform.default_height_cm.is_finite() {
            return Err(ImportError::Config(
                "transform.default_height_cm must be a finite number".into(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config.transform.input, PathBuf::from("input.tsv"));
        assert_eq!(config.transform.default_height_cm, 160.0);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse("[transform]\ndefault_height_cm = 172.5\n").unwrap();
        assert_eq!(config.transform.default_height_cm, 172.5);
        assert_eq!(config.transform.grouped_output, PathBuf::from("output_file.json"));
        assert_eq!(config.download.img_dir, PathBuf::from("img"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = Config::parse("[transform\n").unwrap_err();
        assert!(matches!(err, ImportError::Toml(_)));
    }
}
