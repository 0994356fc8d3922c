use serde::{Deserialize, Serialize};

use crate::framework::ApiError;

/// Photo metadata attached to a pet or tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: u32,
    #[serde(rename = "nome")]
    pub filename: String,
    pub content_type: String,
    pub url: String,
}

/// An image picked for upload.
///
/// The content type is checked on construction; the remote side stays the
/// authority on anything else.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ApiError> {
        let filename = filename.into();
        let content_type = content_type.into();
        if filename.trim().is_empty() {
            return Err(ApiError::Validation {
                field: "photo",
                reason: "filename is empty".to_string(),
            });
        }
        if !content_type.starts_with("image/") {
            return Err(ApiError::Validation {
                field: "photo",
                reason: format!("{content_type} is not an image"),
            });
        }
        if bytes.is_empty() {
            return Err(ApiError::Validation {
                field: "photo",
                reason: "file is empty".to_string(),
            });
        }
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Shows the payload length instead of the bytes.
impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images() {
        let upload = PhotoUpload::new("rex.png", "image/png", vec![1, 2, 3]).unwrap();
        assert_eq!(upload.filename(), "rex.png");
        assert_eq!(upload.bytes().len(), 3);
    }

    #[test]
    fn rejects_non_images() {
        let err = PhotoUpload::new("notes.pdf", "application/pdf", vec![1]).unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "photo", .. }));
    }

    #[test]
    fn rejects_empty_files() {
        assert!(PhotoUpload::new("rex.png", "image/png", Vec::new()).is_err());
        assert!(PhotoUpload::new(" ", "image/png", vec![1]).is_err());
    }

    #[test]
    fn debug_output_omits_bytes() {
        let upload = PhotoUpload::new("rex.png", "image/png", vec![7; 64]).unwrap();
        let rendered = format!("{upload:?}");
        assert!(rendered.contains("len: 64"));
        assert!(!rendered.contains("7, 7"));
    }
}
