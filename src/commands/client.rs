use serde::Deserialize;
use std::path::Path;

use crate::error::{HandtraceError, Result};

/// Body of `/list/<path>`: either the files or the error tag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListReply {
    Files { files: Vec<String> },
    Failed { error: String, kind: Option<String> },
}

/// Talks to a running store the way the store page does.
pub struct StoreClient {
    base: String,
    http: reqwest::Client,
}

impl StoreClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// POST `data` as the `data` form field to `/save/<name>`.
    pub async fn save(&self, name: &str, data: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/save/{}", self.base, name))
            .form(&[("data", data)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() || body != "okay" {
            return Err(HandtraceError::Custom(format!(
                "Store refused '{name}' ({status}): {body}"
            )));
        }
        Ok(())
    }

    /// List `path` under the store root. `""` and `"."` list the root itself.
    pub async fn list(&self, path: &str) -> Result<ListReply> {
        let path = path.trim_start_matches('/');
        let path = if path == "." { "" } else { path };
        let response = self
            .http
            .get(format!("{}/list/{}", self.base, path))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HandtraceError::Custom(format!(
                "Listing '{path}' failed ({status}): {body}"
            )));
        }
        Ok(response.json::<ListReply>().await?)
    }
}

/// Upload a local capture file, named after the file unless `name` is given.
pub async fn upload_file(client: &StoreClient, file: &Path, name: Option<&str>) -> Result<String> {
    let name = match name {
        Some(n) => n.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| HandtraceError::Custom(format!("No file name in {}", file.display())))?,
    };

    let data = tokio::fs::read_to_string(file).await?;
    if data.is_empty() {
        tracing::warn!("{} is empty, the store will not write it", file.display());
    }
    client.save(&name, &data).await?;
    tracing::info!("Uploaded {} as '{name}' ({} bytes)", file.display(), data.len());
    Ok(name)
}
