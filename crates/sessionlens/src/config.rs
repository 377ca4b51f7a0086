//! Pipeline configuration file support.
//!
//! Loads `sessionlens.toml` from the working directory, or from an explicit
//! `--config` path.

use anyhow::{Context, Result};
use std::path::Path;

use sessionlens_core::PipelineConfig;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "sessionlens.toml";

/// Load configuration from a file.
///
/// Returns:
/// - `Ok(Some(config))` if file exists and parses successfully
/// - `Ok(None)` if file does not exist
/// - `Err(...)` if file exists but fails to parse (hard error)
pub fn load(config_path: &Path) -> Result<Option<PipelineConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    let config: PipelineConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    Ok(Some(config))
}

/// Resolve the effective configuration. An explicit path must exist; the
/// default file in `working_dir` is optional.
pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Result<PipelineConfig> {
    match explicit {
        Some(path) => load(path)?
            .with_context(|| format!("Config file not found: {}", path.display())),
        None => Ok(load(&working_dir.join(CONFIG_FILE_NAME))?.unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join(CONFIG_FILE_NAME)).unwrap().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[similarity]\nthreshold = 0.9\n\n[classifier]\nrecent_messages = 3\n",
        )
        .unwrap();

        let config = load(&path).unwrap().unwrap();

        assert_eq!(config.similarity.threshold, 0.9);
        assert_eq!(config.similarity.window_size, 5);
        assert_eq!(config.classifier.recent_messages, 3);
        assert_eq!(config.animation.rate_gate_ms, 100);
    }

    #[test]
    fn test_unknown_field_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[animation]\nrate_gate = 50\n").unwrap();

        let err = load(&path).unwrap_err();

        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_resolve_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve(None, dir.path()).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_resolve_explicit_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("custom.toml");
        assert!(resolve(Some(&missing), dir.path()).is_err());
    }
}
