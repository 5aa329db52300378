use std::path::{Path, PathBuf};

use crate::error::ListError;

/// Filesystem-backed store for recorded sessions.
///
/// Paths are resolved against `root`. Writes are not coordinated: two saves
/// to the same name race and the last one to finish wins.
#[derive(Clone, Debug)]
pub struct SampleStore {
    root: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Written { bytes: usize },
    Skipped,
}

impl SampleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the entries of `path`, sorted by name and prefixed with `path`.
    ///
    /// An empty `path` lists the root with bare names.
    pub async fn list(&self, path: &str) -> Result<Vec<String>, ListError> {
        let dir = self.root.join(path);

        let meta = tokio::fs::metadata(&dir).await?;
        if !meta.is_dir() {
            return Err(ListError::NotADirectory);
        }

        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut names: Vec<String> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        let prefix = Path::new(path);
        Ok(names
            .into_iter()
            .map(|name| prefix.join(name).to_string_lossy().to_string())
            .collect())
    }

    /// Write `data` to `name`, replacing whatever is there.
    ///
    /// Absent or empty data leaves the existing file alone.
    pub async fn save(&self, name: &str, data: Option<&str>) -> std::io::Result<SaveOutcome> {
        let data = match data {
            Some(d) if !d.is_empty() => d,
            _ => return Ok(SaveOutcome::Skipped),
        };

        tokio::fs::write(self.root.join(name), data).await?;
        Ok(SaveOutcome::Written { bytes: data.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_sorted_and_prefixed() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = dir.path().join("sessions");
        std::fs::create_dir(&sessions).unwrap();
        for name in ["zeta", "Zulu", "beta", "alpha"] {
            std::fs::write(sessions.join(name), "[]").unwrap();
        }

        let store = SampleStore::new(dir.path());
        let files = store.list("sessions").await.unwrap();
        assert_eq!(
            files,
            vec!["sessions/Zulu", "sessions/alpha", "sessions/beta", "sessions/zeta"]
        );
    }

    #[tokio::test]
    async fn test_list_trailing_slash_is_not_doubled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("runs")).unwrap();
        std::fs::write(dir.path().join("runs").join("a.json"), "[]").unwrap();

        let store = SampleStore::new(dir.path());
        assert_eq!(store.list("runs/").await.unwrap(), vec!["runs/a.json"]);
    }

    #[tokio::test]
    async fn test_list_root_has_bare_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("exp1"), "[]").unwrap();
        std::fs::create_dir(dir.path().join("runs")).unwrap();

        let store = SampleStore::new(dir.path());
        assert_eq!(store.list("").await.unwrap(), vec!["exp1", "runs"]);
    }

    #[tokio::test]
    async fn test_list_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path());
        assert_eq!(store.list("nowhere").await, Err(ListError::NotFound));
    }

    #[tokio::test]
    async fn test_list_on_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("capture"), "[]").unwrap();
        let store = SampleStore::new(dir.path());
        assert_eq!(store.list("capture").await, Err(ListError::NotADirectory));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path());

        let first = store.save("exp1", Some("[1]")).await.unwrap();
        assert_eq!(first, SaveOutcome::Written { bytes: 3 });
        store.save("exp1", Some("[2,3]")).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("exp1")).unwrap();
        assert_eq!(content, "[2,3]");
    }

    #[tokio::test]
    async fn test_save_without_data_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("exp1"), "original").unwrap();
        let store = SampleStore::new(dir.path());

        assert_eq!(store.save("exp1", None).await.unwrap(), SaveOutcome::Skipped);
        assert_eq!(store.save("exp1", Some("")).await.unwrap(), SaveOutcome::Skipped);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("exp1")).unwrap(),
            "original"
        );
    }

    #[tokio::test]
    async fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("does-not-exist"));
        assert!(store.save("exp1", Some("[]")).await.is_err());
    }
}
