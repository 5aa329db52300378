use serde::Serialize;

/// All errors surfaced by the store, the viewer and the upload client.
#[derive(Debug, thiserror::Error)]
pub enum HandtraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("record {index}: field '{field}' {reason}")]
    Record {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("{0}")]
    Format(String),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, HandtraceError>;

/// Why a directory listing failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("no such directory")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("not a directory")]
    NotADirectory,

    #[error("{0}")]
    Other(String),
}

impl ListError {
    pub fn kind(&self) -> &'static str {
        match self {
            ListError::NotFound => "not_found",
            ListError::PermissionDenied => "permission_denied",
            ListError::NotADirectory => "not_a_directory",
            ListError::Other(_) => "other",
        }
    }
}

impl From<std::io::Error> for ListError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ListError::NotFound,
            std::io::ErrorKind::PermissionDenied => ListError::PermissionDenied,
            _ => ListError::Other(err.to_string()),
        }
    }
}

// Listing clients only know the legacy `{"error": "Error"}` body; the kind rides alongside.
impl Serialize for ListError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut body = serializer.serialize_struct("ListError", 2)?;
        body.serialize_field("error", "Error")?;
        body.serialize_field("kind", self.kind())?;
        body.end()
    }
}
