use olosuashi_shared::ImageUpload;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("{0} is not a supported image type (jpg, png, webp, gif)")]
    UnsupportedType(String),

    #[error("{file_name} is {size} bytes, limit is {limit}")]
    TooLarge {
        file_name: String,
        size: usize,
        limit: usize,
    },

    #[error("{0} is empty")]
    Empty(String),
}

/// A file picked in the admin form but not uploaded yet. It only goes to the
/// server after the tour record exists.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub file_name: String,
    pub content_type: String,
    bytes: Arc<Vec<u8>>,
    /// Local handle the form uses to show a thumbnail before upload.
    pub preview: String,
}

impl PendingImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ImageError> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name)
            .ok_or_else(|| ImageError::UnsupportedType(file_name.clone()))?;

        if bytes.is_empty() {
            return Err(ImageError::Empty(file_name));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                file_name,
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        Ok(Self {
            file_name,
            content_type: content_type.to_string(),
            bytes: Arc::new(bytes),
            preview: format!("blob:olosuashi/{}", Uuid::new_v4()),
        })
    }

    pub fn to_upload(&self) -> ImageUpload {
        ImageUpload {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes: self.bytes.as_ref().clone(),
        }
    }
}

impl fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .field("preview", &self.preview)
            .finish()
    }
}

fn content_type_for(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        let image = PendingImage::new("Mara-Sunset.JPG", vec![0xff, 0xd8]).unwrap();
        assert_eq!(image.content_type, "image/jpeg");
        assert!(image.preview.starts_with("blob:olosuashi/"));
        assert_eq!(image.to_upload().bytes, vec![0xff, 0xd8]);
    }

    #[test]
    fn test_rejects_bad_files() {
        assert_eq!(
            PendingImage::new("itinerary.pdf", vec![1]),
            Err(ImageError::UnsupportedType("itinerary.pdf".into()))
        );
        assert_eq!(PendingImage::new("empty.png", vec![]), Err(ImageError::Empty("empty.png".into())));
        assert!(matches!(
            PendingImage::new("huge.png", vec![0; MAX_IMAGE_BYTES + 1]),
            Err(ImageError::TooLarge { .. })
        ));
    }
}
