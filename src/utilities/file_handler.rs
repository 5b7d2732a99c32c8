//! Lenient JSON file loading and pretty saving.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::utilities::errors::ConfigError;

/// Load `path` as JSON, falling back to `default` when the file is missing,
/// unreadable or does not parse.
pub fn load_json_or<T: DeserializeOwned>(path: &Path, default: T) -> T {
    if !path.exists() {
        return default;
    }
    match load_json(path) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{}; using defaults", e);
            default
        }
    }
}

/// Load `path` as JSON, reporting why it could not be used.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Write `value` to `path` as indented JSON, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let io_err = |e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
    }
    let content = serde_json::to_string_pretty(value).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    fs::write(path, content).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_missing_and_corrupt_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        assert_eq!(load_json_or(&path, json!({"a": 1})), json!({"a": 1}));

        fs::write(&path, "{not json").unwrap();
        assert_eq!(load_json_or(&path, json!({"a": 1})), json!({"a": 1}));
        assert!(matches!(load_json::<Value>(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("cfg.json");
        save_json(&path, &json!({"ui": {"theme": "grey"}})).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"ui\""));
        let loaded: Value = load_json(&path).unwrap();
        assert_eq!(loaded["ui"]["theme"], "grey");
    }
}
