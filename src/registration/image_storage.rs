//! Profile pictures attached to a registration
//! Only files within the configured size limit can be constructed.

use crate::registration::error::ClientError;
use image::ImageFormat;
use std::path::Path;

#[derive(Clone, PartialEq)]
pub struct ProfilePicture {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ProfilePicture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilePicture")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ProfilePicture {
    /// Wrap in-memory image data, rejecting anything over `limit` bytes.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        limit: u64,
    ) -> Result<Self, ClientError> {
        let size = bytes.len() as u64;
        if size > limit {
            return Err(ClientError::FileTooLarge { size, limit });
        }

        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name);
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Read a picture from disk. The size is checked before the file is read.
    pub async fn load(path: impl AsRef<Path>, limit: u64) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        if size > limit {
            return Err(ClientError::FileTooLarge { size, limit });
        }

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profile-picture".to_string());

        Self::from_bytes(file_name, bytes, limit)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    match ImageFormat::from_path(file_name) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::WebP) => "image/webp",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::Bmp) => "image/bmp",
        _ => "application/octet-stream",
    }
}
