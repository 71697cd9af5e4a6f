use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::{ContentStore, Upload};
use crate::error::{FolioError, Result};

/// Path segment under which stored objects are served.
pub const UPLOADS_MOUNT: &str = "uploads";

const TEMP_PREFIX: &str = ".tmp-";

/// Filesystem-backed content store.
///
/// Objects live at `<root>/<folder>/<name>` and are published as
/// `<public base>/uploads/<folder>/<name>`; the HTTP layer serves `root`
/// under the same mount. Names are `<unix millis>-<uuid>.<ext>`, so
/// concurrent writers never collide.
#[derive(Clone, Debug)]
pub struct LocalContentStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalContentStore {
    pub fn new(root: PathBuf, public_base_url: &str) -> Result<Self> {
        let trimmed = public_base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|err| {
            FolioError::Internal(format!(
                "invalid public base URL '{public_base_url}': {err}"
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FolioError::Internal(format!(
                "public base URL must be http(s), got '{public_base_url}'"
            )));
        }

        Ok(Self {
            root,
            public_prefix: format!("{trimmed}/{UPLOADS_MOUNT}/"),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every URL handed out by this store starts with this prefix.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Create the root and clear temp files left by writes that never
    /// finished.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            FolioError::Storage(format!(
                "failed to create upload dir {:?}: {err}",
                self.root
            ))
        })?;

        let swept = self.sweep_temp_objects().await?;
        if swept > 0 {
            info!(swept, "removed abandoned temp objects");
        }
        Ok(())
    }

    async fn sweep_temp_objects(&self) -> Result<usize> {
        let mut swept = 0;
        let mut folders = tokio::fs::read_dir(&self.root).await.map_err(|err| {
            FolioError::Storage(format!("failed to list {:?}: {err}", self.root))
        })?;

        while let Ok(Some(folder)) = folders.next_entry().await {
            let Ok(mut entries) = tokio::fs::read_dir(folder.path()).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                if !entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                    continue;
                }
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => swept += 1,
                    Err(err) => {
                        warn!(path = ?entry.path(), error = %err, "failed to remove temp object")
                    }
                }
            }
        }
        Ok(swept)
    }

    fn object_name(extension: &str) -> String {
        format!(
            "{}-{}.{extension}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        )
    }

    fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
    }

    /// Map a key relative to the root (`folder/name`) onto disk, refusing
    /// anything that could escape the root.
    pub fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if !Self::is_valid_segment(segment) {
                return Err(FolioError::Storage(format!(
                    "invalid object key: {key}"
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let rest = url.strip_prefix(self.public_prefix.as_str())?;
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(dir).await.map_err(|err| {
            FolioError::Storage(format!(
                "failed to create upload dir {:?}: {err}",
                dir
            ))
        })?;

        let tmp_name = format!("{TEMP_PREFIX}{}", Uuid::new_v4().simple());
        let tmp = TempObject::new(dir.join(tmp_name));

        let mut file = tokio::fs::File::create(tmp.path()).await.map_err(|err| {
            FolioError::Storage(format!(
                "failed to create temp object {:?}: {err}",
                tmp.path()
            ))
        })?;
        file.write_all(bytes).await.map_err(|err| {
            FolioError::Storage(format!(
                "failed to write temp object {:?}: {err}",
                tmp.path()
            ))
        })?;
        file.flush().await.map_err(|err| {
            FolioError::Storage(format!(
                "failed to flush temp object {:?}: {err}",
                tmp.path()
            ))
        })?;
        drop(file);

        tokio::fs::rename(tmp.path(), path).await.map_err(|err| {
            FolioError::Storage(format!(
                "failed to move object {:?} -> {:?}: {err}",
                tmp.path(),
                path
            ))
        })?;
        tmp.persist();
        Ok(())
    }
}

/// Temp file of an in-flight write. Removed on drop unless persisted, so a
/// write that errors or whose future is cancelled leaves nothing behind.
struct TempObject {
    path: PathBuf,
    persisted: bool,
}

impl TempObject {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persist(mut self) {
        self.persisted = true;
    }
}

impl Drop for TempObject {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = ?self.path, "removed abandoned temp object"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = ?self.path, error = %err, "failed to remove temp object")
            }
        }
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn put(&self, upload: &Upload, folder: &str) -> Result<String> {
        let format = upload.image_format()?;
        let key = format!("{folder}/{}", Self::object_name(format.extension()));
        let path = self.path_for_key(&key)?;

        self.write_atomic(&path, &upload.bytes).await?;
        debug!(key = %key, bytes = upload.len(), "stored upload");

        Ok(format!("{}{key}", self.public_prefix))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let key = self.key_for_url(url).ok_or_else(|| {
            FolioError::Storage(format!("{url} is not a local upload"))
        })?;
        let path = self.path_for_key(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "removed stored object");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(FolioError::Storage(format!(
                "failed to remove {:?}: {err}",
                path
            ))),
        }
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(self.public_prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn store(dir: &tempfile::TempDir) -> LocalContentStore {
        LocalContentStore::new(dir.path().to_path_buf(), "http://localhost:5000/")
            .unwrap()
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let url = store
            .put(&Upload::new(PNG.to_vec()), "projects")
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:5000/uploads/projects/"));
        assert!(url.ends_with(".png"));
        assert!(store.owns(&url));

        let key = url.strip_prefix(store.public_prefix()).unwrap();
        let on_disk = tokio::fs::read(dir.path().join(key)).await.unwrap();
        assert_eq!(on_disk, PNG);
    }

    #[tokio::test]
    async fn names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let upload = Upload::new(PNG.to_vec());

        let a = store.put(&upload, "projects").await.unwrap();
        let b = store.put(&upload, "projects").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn delete_removes_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let url = store
            .put(&Upload::new(PNG.to_vec()), "projects")
            .await
            .unwrap();
        let key = url.strip_prefix(store.public_prefix()).unwrap().to_string();

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join(&key).exists());
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn refuses_foreign_and_escaping_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        assert!(!store.owns("https://images.example.com/a.png"));
        assert!(store.delete("https://images.example.com/a.png").await.is_err());
        assert!(
            store
                .delete("http://localhost:5000/uploads/../secret.txt")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let err = store
            .put(&Upload::new(b"hello".to_vec()).with_file_name("a.txt"), "projects")
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn temp_object_is_removed_unless_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let abandoned = dir.path().join(".tmp-abandoned");
        let kept = dir.path().join(".tmp-kept");
        std::fs::write(&abandoned, PNG).unwrap();
        std::fs::write(&kept, PNG).unwrap();

        drop(TempObject::new(abandoned.clone()));
        TempObject::new(kept.clone()).persist();

        assert!(!abandoned.exists());
        assert!(kept.exists());
        // nothing on disk is fine too
        drop(TempObject::new(dir.path().join(".tmp-missing")));
    }

    #[tokio::test]
    async fn ensure_root_sweeps_abandoned_temp_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let url = store
            .put(&Upload::new(PNG.to_vec()), "projects")
            .await
            .unwrap();
        let stale = dir.path().join("projects").join(".tmp-0123abcd");
        std::fs::write(&stale, PNG).unwrap();

        store.ensure_root().await.unwrap();

        assert!(!stale.exists());
        let key = url.strip_prefix(store.public_prefix()).unwrap();
        assert!(dir.path().join(key).exists());
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(LocalContentStore::new(PathBuf::from("/tmp"), "ftp://host").is_err());
        assert!(LocalContentStore::new(PathBuf::from("/tmp"), "not a url").is_err());
    }
}
