use google_cloud_storage::client::Client as GcsClient;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};

use super::{sanitize_file_name, Attachment, AttachmentStore, StorageError};

/// Stores attachments as objects in a Google Cloud Storage bucket.
#[derive(Clone)]
pub struct GcsAttachmentStore {
    client: GcsClient,
    bucket: String,
}

impl GcsAttachmentStore {
    pub fn new(client: GcsClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

/// Splits `gs://bucket/object` into its bucket and object name.
fn parse_reference(reference: &str) -> Option<(&str, &str)> {
    let path = reference.strip_prefix("gs://")?;
    let (bucket, object) = path.split_once('/')?;
    if bucket.is_empty() || object.is_empty() {
        return None;
    }
    Some((bucket, object))
}

#[async_trait::async_trait]
impl AttachmentStore for GcsAttachmentStore {
    async fn store(&self, attachment: &Attachment, folder: &str) -> Result<String, StorageError> {
        let file_name = sanitize_file_name(&attachment.file_name)?;
        let object_name = format!("{}/{}", folder, file_name);

        let upload_type = UploadType::Simple(Media {
            name: object_name.clone().into(),
            content_type: attachment.content_type().to_string().into(),
            content_length: Some(attachment.data.len() as u64),
        });

        self.client
            .upload_object(
                &UploadObjectRequest {
                    bucket: self.bucket.clone(),
                    ..Default::default()
                },
                attachment.data.to_vec(),
                &upload_type,
            )
            .await
            .map_err(|e| StorageError::Remote(format!("GCS upload failed: {}", e)))?;

        tracing::info!("Stored attachment gs://{}/{}", self.bucket, object_name);

        Ok(format!("gs://{}/{}", self.bucket, object_name))
    }

    async fn load(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        let (bucket, object) = parse_reference(reference)
            .filter(|(bucket, _)| *bucket == self.bucket)
            .ok_or_else(|| StorageError::InvalidReference(reference.to_string()))?;

        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: object.to_string(),
            ..Default::default()
        };

        self.client
            .download_object(&request, &Default::default())
            .await
            .map_err(|e| StorageError::Remote(format!("GCS download failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_reference;

    #[test]
    fn parses_bucket_and_object() {
        assert_eq!(
            parse_reference("gs://relief-uploads/incident/flood.jpg"),
            Some(("relief-uploads", "incident/flood.jpg"))
        );
    }

    #[test]
    fn rejects_foreign_references() {
        assert_eq!(parse_reference("/var/uploads/incident/flood.jpg"), None);
        assert_eq!(parse_reference("gs://bucket-only"), None);
        assert_eq!(parse_reference("gs:///object"), None);
    }
}
