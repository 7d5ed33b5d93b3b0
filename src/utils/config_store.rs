//! ConfigStore - Engine Configuration Files
//!
//! Loads and saves `EngineConfig`-style documents. The format is chosen by
//! file extension: `.toml` or `.json`.

use std::fs;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        other => Err(Error::InvalidConfig {
            message: format!("unsupported config extension: {other:?}"),
        }),
    }
}

/// Load a config file, falling back to `T::default()` when it does not exist
pub fn load_config<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = format_of(path)?;

    if !path.exists() {
        tracing::debug!("Config {} not found, using defaults", path.display());
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)?;
    let config = match format {
        Format::Toml => toml::from_str(&content)?,
        Format::Json => serde_json::from_str(&content)?,
    };
    Ok(config)
}

/// Save a config file
pub fn save_config<T: Serialize>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let path = path.as_ref();
    let content = match format_of(path)? {
        Format::Toml => toml::to_string_pretty(config)?,
        Format::Json => serde_json::to_string_pretty(config)?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EngineConfig;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("dfc-vtable-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_missing_file_gives_default() {
        let config: EngineConfig = load_config(temp_path("absent.toml")).expect("default");
        assert_eq!(config.table.page_size, EngineConfig::default().table.page_size);
    }

    #[test]
    fn test_save_and_load_toml() {
        let path = temp_path("table.toml");
        let mut config = EngineConfig::default();
        config.table.page_size = 42;

        save_config(&path, &config).expect("save");
        let loaded: EngineConfig = load_config(&path).expect("load");
        assert_eq!(loaded.table.page_size, 42);

        let _ = fs::remove_dir_all(path.parent().expect("parent"));
    }

    #[test]
    fn test_unknown_extension() {
        let result: Result<EngineConfig> = load_config("table.yaml");
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
