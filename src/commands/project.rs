use std::fs;
use std::path::{Path, PathBuf};

use super::config::{save_config, HandtraceConfig};
use crate::error::Result;
use crate::templates;

/// Lays out a store root: the store page under `static/` and, if given,
/// a default config file that does not exist yet.
pub fn init_store(root: &Path, config_file: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let mut config = HandtraceConfig::default();
    config.root = root.to_string_lossy().to_string();

    let static_dir = config.static_path();
    fs::create_dir_all(&static_dir)?;

    let title = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "handtrace".to_string());

    let index = static_dir.join("index.html");
    fs::write(&index, templates::index_html(&title))?;
    written.push(index);

    if let Some(path) = config_file {
        if path.exists() {
            tracing::info!("Keeping existing config {}", path.display());
        } else {
            save_config(path, &config)?;
            written.push(path.to_path_buf());
        }
    }

    Ok(written)
}
