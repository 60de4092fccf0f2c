//! Profile image uploads to Supabase Storage

use bytes::Bytes;
use uuid::Uuid;

use super::supabase::{SupabaseClient, SupabaseError};

pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Please upload an image file")]
    NotAnImage,

    #[error("Image must be smaller than 2MB")]
    TooLarge,

    #[error("Image is empty")]
    Empty,

    #[error(transparent)]
    Storage(#[from] SupabaseError),
}

#[derive(Clone)]
pub struct AvatarStore {
    client: SupabaseClient,
    bucket: String,
}

impl AvatarStore {
    pub fn new(client: SupabaseClient, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    /// Store an image under a fresh object name and return its public URL
    pub async fn upload(
        &self,
        user_id: Uuid,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, AvatarError> {
        let ext = check_image(content_type, body.len())?;
        let path = format!("{}/{}.{}", user_id, Uuid::new_v4(), ext);

        self.client
            .upload_object(&self.bucket, &path, content_type, body)
            .await?;

        tracing::info!(user_id = %user_id, path = %path, "Avatar uploaded");
        Ok(self.client.public_object_url(&self.bucket, &path))
    }
}

/// Validate an upload and pick the file extension from its MIME type
fn check_image(content_type: &str, len: usize) -> Result<&str, AvatarError> {
    let subtype = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .strip_prefix("image/")
        .filter(|s| !s.is_empty())
        .ok_or(AvatarError::NotAnImage)?;

    if len == 0 {
        return Err(AvatarError::Empty);
    }
    if len > MAX_AVATAR_BYTES {
        return Err(AvatarError::TooLarge);
    }

    Ok(match subtype {
        "jpeg" | "pjpeg" => "jpg",
        "svg+xml" => "svg",
        other => other,
    })
}
