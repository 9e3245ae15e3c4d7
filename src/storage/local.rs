use std::path::{Path, PathBuf};
use tokio::fs;

use super::{sanitize_file_name, Attachment, AttachmentStore, StorageError};

/// Stores attachments on the local filesystem below a fixed root.
#[derive(Clone, Debug)]
pub struct LocalAttachmentStore {
    root: PathBuf,
}

impl LocalAttachmentStore {
    /// Creates the upload root if needed and resolves it to an absolute path.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root).await.map_err(|source| StorageError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let root = fs::canonicalize(root)
            .await
            .map_err(|source| StorageError::Io {
                path: root.to_path_buf(),
                source,
            })?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn store(&self, attachment: &Attachment, folder: &str) -> Result<String, StorageError> {
        let file_name = sanitize_file_name(&attachment.file_name)?;
        let dir = self.root.join(folder);
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io {
                path: dir.clone(),
                source,
            })?;

        let target = dir.join(file_name);
        fs::write(&target, &attachment.data)
            .await
            .map_err(|source| StorageError::Io {
                path: target.clone(),
                source,
            })?;

        tracing::info!(
            "Stored attachment {} ({} bytes)",
            target.display(),
            attachment.data.len()
        );

        Ok(target.to_string_lossy().into_owned())
    }

    async fn load(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        let path = PathBuf::from(reference);
        if !path.starts_with(&self.root) {
            return Err(StorageError::InvalidReference(reference.to_string()));
        }

        // `..` segments and symlinks only resolve on the real filesystem.
        let path = fs::canonicalize(&path)
            .await
            .map_err(|source| StorageError::Io { path, source })?;
        if !path.starts_with(&self.root) {
            return Err(StorageError::InvalidReference(reference.to_string()));
        }

        fs::read(&path)
            .await
            .map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::INCIDENT_FOLDER;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_missing_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("uploads");

        let store = LocalAttachmentStore::open(&root).await.unwrap();

        assert!(store.root().is_absolute());
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn store_writes_under_folder_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path()).await.unwrap();
        let photo = Attachment::new("bridge.jpg", b"\xff\xd8\xff\xe0jpeg".to_vec());

        let reference = store.store(&photo, INCIDENT_FOLDER).await.unwrap();

        assert_eq!(
            PathBuf::from(&reference),
            store.root().join(INCIDENT_FOLDER).join("bridge.jpg")
        );
        assert_eq!(store.load(&reference).await.unwrap(), photo.data.to_vec());
    }

    #[tokio::test]
    async fn same_file_name_overwrites() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path()).await.unwrap();

        let first = store
            .store(&Attachment::new("scene.png", b"first".to_vec()), INCIDENT_FOLDER)
            .await
            .unwrap();
        let second = store
            .store(&Attachment::new("scene.png", b"second".to_vec()), INCIDENT_FOLDER)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.load(&second).await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn traversal_names_stay_inside_folder() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path().join("uploads"))
            .await
            .unwrap();

        let reference = store
            .store(
                &Attachment::new("../../escape.txt", b"x".to_vec()),
                INCIDENT_FOLDER,
            )
            .await
            .unwrap();

        assert!(PathBuf::from(reference).starts_with(store.root().join(INCIDENT_FOLDER)));
    }

    #[tokio::test]
    async fn load_rejects_paths_outside_root() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path().join("uploads"))
            .await
            .unwrap();

        let outside = dir.path().join("elsewhere.txt");
        let err = store.load(&outside.to_string_lossy()).await.unwrap_err();

        assert!(matches!(err, StorageError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn load_rejects_parent_segments_escaping_root() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path().join("uploads"))
            .await
            .unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"TOP-SECRET").unwrap();

        let escaping = format!("{}/../secret.txt", store.root().display());
        let err = store.load(&escaping).await.unwrap_err();

        assert!(matches!(err, StorageError::InvalidReference(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn load_rejects_symlink_out_of_root() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path().join("uploads"))
            .await
            .unwrap();
        let secret = dir.path().join("secret.txt");
        std::fs::write(&secret, b"TOP-SECRET").unwrap();
        let link = store.root().join("link.txt");
        std::os::unix::fs::symlink(&secret, &link).unwrap();

        let err = store.load(&link.to_string_lossy()).await.unwrap_err();

        assert!(matches!(err, StorageError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn load_of_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let store = LocalAttachmentStore::open(dir.path()).await.unwrap();
        let missing = store.root().join(INCIDENT_FOLDER).join("gone.jpg");

        let err = store.load(&missing.to_string_lossy()).await.unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test]
    async fn unwritable_root_is_a_storage_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = LocalAttachmentStore::open(blocker.join("uploads"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
    }
}
