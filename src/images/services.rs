use bytes::Bytes;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::storage::StorageClient;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// A profile image that has been stored, with the key needed to remove it again.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub key: String,
    pub url: String,
}

pub async fn upload_profile_image(
    storage: &dyn StorageClient,
    image: UploadItem,
) -> AppResult<StoredImage> {
    if image.body.is_empty() {
        return Err(AppError::Validation("Profile image is required".into()));
    }
    let ext = ext_from_mime(&image.content_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported profile image type: {}",
            image.content_type
        ))
    })?;

    let key = format!("profiles/{}.{}", Uuid::new_v4(), ext);
    storage
        .put_object(&key, image.body, &image.content_type)
        .await
        .map_err(|e| {
            error!(error = %e, key = %key, "profile image upload failed");
            AppError::Upstream("Profile image upload failed".into())
        })?;

    Ok(StoredImage {
        url: storage.object_url(&key),
        key,
    })
}

/// Best-effort removal of an image whose owner was never created.
pub async fn discard_profile_image(storage: &dyn StorageClient, image: &StoredImage) {
    if let Err(e) = storage.delete_object(&image.key).await {
        warn!(error = %e, key = %image.key, "orphaned profile image left in storage");
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
