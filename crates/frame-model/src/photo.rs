//! Raw captured photos.
//!
//! A photo is an opaque encoded still. It has no identity of its own:
//! callers address photos by their index in the captured list, so removing
//! one renumbers everything after it.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::ModelError;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_MAGIC: &[u8] = &[0xff, 0xd8, 0xff];

/// A captured still image, kept in its encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPhoto {
    bytes: Arc<[u8]>,
    captured_at: Option<DateTime<Utc>>,
}

impl RawPhoto {
    /// Wrap freshly captured bytes, stamped with the current time.
    pub fn captured_now(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            captured_at: Some(Utc::now()),
        }
    }

    /// Wrap bytes with no known capture time (e.g. restored from the store).
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            captured_at: None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Encoded size in whole kilobytes, rounded.
    pub fn size_kb(&self) -> usize {
        (self.bytes.len() + 512) / 1024
    }

    /// MIME type sniffed from the leading bytes.
    pub fn mime_type(&self) -> &'static str {
        if self.bytes.starts_with(PNG_MAGIC) {
            "image/png"
        } else if self.bytes.starts_with(JPEG_MAGIC) {
            "image/jpeg"
        } else {
            "application/octet-stream"
        }
    }

    /// Encode as a `data:` URL, the form photos take in the store.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    /// Parse a base64 `data:` URL.
    pub fn from_data_url(url: &str) -> Result<Self, ModelError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ModelError::invalid("capturedPhotos", "missing data: prefix"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ModelError::invalid("capturedPhotos", "missing data URL payload"))?;
        if !header.ends_with(";base64") {
            return Err(ModelError::invalid(
                "capturedPhotos",
                "only base64 data URLs are supported",
            ));
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ModelError::invalid("capturedPhotos", format!("bad base64: {e}")))?;
        Ok(Self::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_png() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        bytes
    }

    #[test]
    fn test_data_url_preserves_bytes() {
        let photo = RawPhoto::captured_now(fake_png());
        let url = photo.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));

        let restored = RawPhoto::from_data_url(&url).unwrap();
        assert_eq!(restored.bytes(), photo.bytes());
        assert!(restored.captured_at().is_none());
    }

    #[test]
    fn test_mime_sniffing() {
        assert_eq!(RawPhoto::from_bytes(fake_png()).mime_type(), "image/png");
        assert_eq!(
            RawPhoto::from_bytes(vec![0xff, 0xd8, 0xff, 0xe0]).mime_type(),
            "image/jpeg"
        );
        assert_eq!(
            RawPhoto::from_bytes(vec![0u8; 4]).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_rejects_malformed_data_urls() {
        assert!(RawPhoto::from_data_url("image/png;base64,AAAA").is_err());
        assert!(RawPhoto::from_data_url("data:image/png;base64").is_err());
        assert!(RawPhoto::from_data_url("data:text/plain,hello").is_err());
        assert!(RawPhoto::from_data_url("data:image/png;base64,***").is_err());
    }

    #[test]
    fn test_size_kb_rounds() {
        assert_eq!(RawPhoto::from_bytes(vec![0u8; 1024]).size_kb(), 1);
        assert_eq!(RawPhoto::from_bytes(vec![0u8; 1600]).size_kb(), 2);
        assert_eq!(RawPhoto::from_bytes(Vec::new()).size_kb(), 0);
    }
}
