//! Directory-backed store for uploaded resumes.
//!
//! Every upload lives exactly as long as its `StoredUpload` guard.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Creates the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under a fresh uuid name. The extension of
    /// `original_name` is kept (lower-cased) so format dispatch still works;
    /// the rest of the client-supplied name is discarded.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<StoredUpload> {
        let ext = extension(original_name);
        let name = loop {
            let candidate = match &ext {
                Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
                None => Uuid::new_v4().to_string(),
            };
            if !self.exists(&candidate).await {
                break candidate;
            }
        };
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored upload {name} ({} bytes)", bytes.len());
        Ok(StoredUpload {
            store: self.clone(),
            name,
            path,
            removed: false,
        })
    }

    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.dir.join(name))
            .await
            .unwrap_or(false)
    }

    pub async fn delete(&self, name: &str) -> std::io::Result<()> {
        tokio::fs::remove_file(self.dir.join(name)).await
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}

/// Removes its file on drop, whether the analysis succeeded or not.
/// `discard` does the same without blocking the runtime.
#[derive(Debug)]
pub struct StoredUpload {
    store: UploadStore,
    name: String,
    path: PathBuf,
    removed: bool,
}

impl StoredUpload {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn discard(mut self) -> std::io::Result<()> {
        self.store.delete(&self.name).await?;
        self.removed = true;
        debug!("Removed upload {}", self.name);
        Ok(())
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed upload {}", self.name),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove upload {}: {e}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_keeps_extension_and_guard_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).await.unwrap();

        let upload = store.save("My Resume.PDF", b"%PDF").await.unwrap();
        assert!(upload.name().ends_with(".pdf"));
        assert!(!upload.name().contains("Resume"));
        assert!(store.exists(upload.name()).await);

        let name = upload.name().to_string();
        drop(upload);
        assert!(!store.exists(&name).await);
    }

    #[tokio::test]
    async fn test_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).await.unwrap();
        let a = store.save("cv.txt", b"a").await.unwrap();
        let b = store.save("cv.txt", b"b").await.unwrap();
        assert_ne!(a.name(), b.name());
    }

    #[tokio::test]
    async fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).await.unwrap();
        let upload = store.save("cv.txt", b"Summary").await.unwrap();
        let name = upload.name().to_string();
        upload.discard().await.unwrap();
        assert!(!store.exists(&name).await);
    }

    #[tokio::test]
    async fn test_explicit_delete_then_drop_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).await.unwrap();
        let upload = store.save("cv.docx", b"PK").await.unwrap();
        store.delete(upload.name()).await.unwrap();
        assert!(!store.exists(upload.name()).await);
        drop(upload);
    }

    #[test]
    fn test_extension_rejects_odd_suffixes() {
        assert_eq!(extension("a.TXT").as_deref(), Some("txt"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("evil.p/df"), None);
    }
}
