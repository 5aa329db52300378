use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::config::HandtraceConfig;
use super::store::{SampleStore, SaveOutcome};
use crate::error::{HandtraceError, Result};

pub const INDEX_LOCATION: &str = "/static/index.html";

#[derive(Clone)]
struct AppState {
    store: Arc<SampleStore>,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    files: Vec<String>,
}

/// Build the router for a store rooted at `config.root`.
pub fn router(config: &HandtraceConfig) -> Router {
    let state = AppState {
        store: Arc::new(SampleStore::new(config.root_dir())),
    };

    Router::new()
        .route("/", get(index))
        .route("/list/", get(list_root))
        .route("/list/*path", get(list_entries))
        .route("/save/:name", get(save_sample).post(save_sample))
        .nest_service("/static", ServeDir::new(config.static_path()))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A running store server bound to a local address.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Abort the server task without waiting for in-flight requests.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(result) => Ok(result?),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(HandtraceError::Custom(format!("Server task failed: {e}"))),
        }
    }
}

/// Bind the configured address and serve in a background task.
pub async fn spawn(config: &HandtraceConfig) -> Result<ServerHandle> {
    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    let app = router(config);

    let (tx, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
    });

    Ok(ServerHandle {
        addr,
        shutdown: Some(tx),
        task,
    })
}

/// Serve until Ctrl-C.
pub async fn serve(config: &HandtraceConfig) -> Result<()> {
    let handle = spawn(config).await?;
    tracing::info!(
        "Store at {} listening on http://{}",
        config.root_dir().display(),
        handle.addr()
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.stop().await
}

async fn index() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, INDEX_LOCATION)]).into_response()
}

async fn list_root(state: State<AppState>) -> Response {
    list_entries(state, Path(String::new())).await
}

async fn list_entries(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    match state.store.list(&path).await {
        Ok(files) => Json(ListResponse { files }).into_response(),
        Err(e) => {
            tracing::warn!("Listing '{path}' failed: {e}");
            Json(e).into_response()
        }
    }
}

async fn save_sample(
    State(state): State<AppState>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    let fields = match form_fields(request).await {
        Ok(fields) => fields,
        Err(rejection) => {
            tracing::warn!("Rejected save of '{name}' ({})", rejection.status());
            return rejection;
        }
    };

    let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
    tracing::info!("Saving \"{name}\", with data = {keys:?}");

    let data = fields.iter().find(|(k, _)| k == "data").map(|(_, v)| v.as_str());
    match state.store.save(&name, data).await {
        Ok(SaveOutcome::Written { bytes }) => {
            tracing::debug!("Wrote {bytes} bytes to '{name}'");
            "okay".into_response()
        }
        Ok(SaveOutcome::Skipped) => {
            tracing::debug!("No data for '{name}', nothing written");
            "okay".into_response()
        }
        Err(e) => {
            tracing::error!("Saving '{name}' failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Form fields from the request body, in the order they were sent.
///
/// Urlencoded and multipart bodies are read whatever the method. Any other
/// content type has no fields. The query string is never consulted. Bodies
/// over the configured limit are rejected with 413.
async fn form_fields(request: Request) -> std::result::Result<Vec<(String, String)>, Response> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        return serde_urlencoded::from_bytes(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()).into_response());
    }

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        let mut fields = Vec::new();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            // Uploaded files are not form fields.
            if field.file_name().is_some() {
                continue;
            }
            let Some(key) = field.name().map(str::to_string) else {
                continue;
            };
            let value = field.text().await.map_err(multipart_error)?;
            fields.push((key, value));
        }
        return Ok(fields);
    }

    Ok(Vec::new())
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> Response {
    (e.status(), e.body_text()).into_response()
}
