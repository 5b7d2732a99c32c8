//! Lab configuration.
//!
//! Stored as pretty JSON (default `~/.romanai_lab_state/config.json`), read
//! at startup and rewritten whenever a persisted choice changes. Every
//! section and field has a default, so partial files load fine; a missing
//! or corrupt file silently yields [`LabConfig::default`].
//!
//! ```json
//! {
//!   "ui": {"theme": "dark"},
//!   "models": {
//!     "scriptor": {"base_url": "http://127.0.0.1:8080/v1", "model": "qwen2.5-coder"},
//!     "master": null,
//!     "helpers": {"multimodel": [{"model": "a"}, {"model": "b"}]}
//!   },
//!   "backend": {"scriptor": "Scriptor (Model)", "master": "Master (Model)"},
//!   "memory_dir": null,
//!   "server": {"host": "127.0.0.1", "port": 8888}
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llms::ModelEndpoint;
use crate::utilities::errors::ConfigError;
use crate::utilities::file_handler::{load_json, load_json_or, save_json};
use crate::utilities::paths;

/// Display name of the scriptor side's direct-model backend.
pub const SCRIPTOR_MODEL_BACKEND: &str = "Scriptor (Model)";
/// Display name of the master side's direct-model backend.
pub const MASTER_MODEL_BACKEND: &str = "Master (Model)";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8888;

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// UI colour theme. Unknown names normalize to [`Theme::Dark`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Dark,
    Grey,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Grey => "grey",
            Theme::Light => "light",
        }
    }
}

impl From<String> for Theme {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "grey" | "gray" => Theme::Grey,
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.as_str().to_string()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
}

/// Model endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Model used by the scriptor side's direct mode.
    pub scriptor: Option<ModelEndpoint>,
    /// Model used by the master side's direct mode.
    pub master: Option<ModelEndpoint>,
    /// Per-helper models keyed by router key (`scriptor`, `micro`, ...).
    /// Single-model helpers use the first entry; `multimodel` uses all.
    pub helpers: BTreeMap<String, Vec<ModelEndpoint>>,
}

impl ModelsConfig {
    /// All models configured for the helper with router key `key`.
    pub fn helper_models(&self, key: &str) -> &[ModelEndpoint] {
        self.helpers.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Backend selected on each side, by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSelection {
    pub scriptor: String,
    pub master: String,
}

impl Default for BackendSelection {
    fn default() -> Self {
        Self {
            scriptor: SCRIPTOR_MODEL_BACKEND.to_string(),
            master: MASTER_MODEL_BACKEND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// LabConfig
// ---------------------------------------------------------------------------

/// Whole lab configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub ui: UiConfig,
    pub models: ModelsConfig,
    pub backend: BackendSelection,
    /// Engine memory directory; `None` means [`paths::memory_dir`].
    pub memory_dir: Option<PathBuf>,
    pub server: ServerConfig,
}

impl LabConfig {
    /// `$HOME/.romanai_lab_state` unless `ROMANAI_STATE_DIR` is set.
    pub fn default_state_dir() -> PathBuf {
        paths::lab_state_dir()
    }

    /// `ROMANAI_CONFIG` if set, else `config.json` in the state directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os("ROMANAI_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(paths::config_path)
    }

    /// Load leniently: missing or corrupt files yield defaults (logged at warn).
    pub fn load(path: &Path) -> Self {
        load_json_or(path, Self::default())
    }

    /// Load, reporting why the file could not be used.
    pub fn load_strict(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    /// Write as pretty JSON, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        save_json(path, self)
    }

    /// Effective memory directory.
    pub fn memory_dir(&self) -> PathBuf {
        self.memory_dir.clone().unwrap_or_else(paths::memory_dir)
    }

    /// Direct-mode model for the side whose config key is `side`.
    pub fn direct_model(&self, side: &str) -> Option<&ModelEndpoint> {
        match side {
            "scriptor" => self.models.scriptor.as_ref(),
            "master" => self.models.master.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LabConfig::default();
        assert_eq!(cfg.ui.theme, Theme::Dark);
        assert_eq!(cfg.backend.scriptor, SCRIPTOR_MODEL_BACKEND);
        assert_eq!(cfg.backend.master, MASTER_MODEL_BACKEND);
        assert_eq!(cfg.server.bind_addr(), "127.0.0.1:8888");
        assert!(cfg.models.scriptor.is_none());
    }

    #[test]
    fn test_unknown_theme_is_dark() {
        let cfg: LabConfig = serde_json::from_str(r#"{"ui": {"theme": "neon"}}"#).unwrap();
        assert_eq!(cfg.ui.theme, Theme::Dark);
        let cfg: LabConfig = serde_json::from_str(r#"{"ui": {"theme": "Light"}}"#).unwrap();
        assert_eq!(cfg.ui.theme, Theme::Light);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: LabConfig = serde_json::from_str(
            r#"{"backend": {"master": "Master Helper"}, "models": {"helpers": {"micro": [{"model": "tiny"}]}}}"#,
        )
        .unwrap();
        assert_eq!(cfg.backend.master, "Master Helper");
        assert_eq!(cfg.backend.scriptor, SCRIPTOR_MODEL_BACKEND);
        assert_eq!(cfg.models.helper_models("micro")[0].model, "tiny");
        assert!(cfg.models.helper_models("patcher").is_empty());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{{{{").unwrap();
        assert_eq!(LabConfig::load(&path), LabConfig::default());
        assert!(LabConfig::load_strict(&path).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("config.json");
        let mut cfg = LabConfig::default();
        cfg.ui.theme = Theme::Grey;
        cfg.backend.scriptor = "Micro Helper".to_string();
        cfg.models.master = Some(ModelEndpoint::new("llama3"));
        cfg.save(&path).unwrap();

        let loaded = LabConfig::load(&path);
        assert_eq!(loaded, cfg);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"grey\""));
    }
}
