use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HandtraceError, Result};
use crate::util::expand_tilde;

pub const DEFAULT_FIELDS: [&str; 2] = ["palmNormal", "stabilizedPalmPosition"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandtraceConfig {
    pub host: String,
    pub port: u16,
    /// Directory that list and save paths are resolved against.
    pub root: String,
    /// Static asset directory; relative paths are taken from `root`.
    pub static_dir: String,
    pub max_body_bytes: usize,
    /// Base URL the upload client talks to.
    pub server: String,
    pub fields: Vec<String>,
}

impl Default for HandtraceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            root: ".".into(),
            static_dir: "static".into(),
            max_body_bytes: 16 * 1024 * 1024,
            server: "http://127.0.0.1:5000".into(),
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl HandtraceConfig {
    pub fn root_dir(&self) -> PathBuf {
        expand_tilde(&self.root)
    }

    pub fn static_path(&self) -> PathBuf {
        let dir = expand_tilde(&self.static_dir);
        if dir.is_absolute() {
            dir
        } else {
            self.root_dir().join(dir)
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".handtrace").join("config.json"))
}

/// Load the config from `explicit` or the default location.
///
/// A missing default file yields the defaults; a missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<HandtraceConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(HandtraceConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path).map_err(|e| {
        HandtraceError::Custom(format!("Cannot read config {}: {e}", path.display()))
    })?;
    let config = serde_json::from_str(&content)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config(path: &Path, config: &HandtraceConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
