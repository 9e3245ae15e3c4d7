//! Attachment storage for incident photos.
//!
//! Content is written under a logical folder using the uploader's file name;
//! a second upload with the same name replaces the first.

mod gcs;
mod local;

pub use gcs::GcsAttachmentStore;
pub use local::LocalAttachmentStore;

use axum::body::Bytes;
use std::path::PathBuf;
use std::sync::Arc;

/// Folder used for photos attached to incident reports.
pub const INCIDENT_FOLDER: &str = "incident";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid attachment file name: {0:?}")]
    InvalidFileName(String),
    #[error("attachment reference is not managed by this store: {0}")]
    InvalidReference(String),
    #[error("remote storage request failed: {0}")]
    Remote(String),
}

/// An uploaded file as received from the client.
#[derive(Clone, Debug)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Declared content type, falling back to a guess from the file name.
    pub fn content_type(&self) -> mime::Mime {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .unwrap_or_else(|| mime_guess::from_path(&self.file_name).first_or_octet_stream())
    }
}

#[async_trait::async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Writes `attachment` under `folder` and returns the resolved reference.
    async fn store(&self, attachment: &Attachment, folder: &str) -> Result<String, StorageError>;

    /// Reads back content previously returned by [`AttachmentStore::store`].
    async fn load(&self, reference: &str) -> Result<Vec<u8>, StorageError>;
}

pub type SharedAttachmentStore = Arc<dyn AttachmentStore>;

/// Reduces an uploaded file name to its final component.
pub(crate) fn sanitize_file_name(name: &str) -> Result<&str, StorageError> {
    std::path::Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| StorageError::InvalidFileName(name.to_string()))
}
