//! Frame layouts and their capture rules.
//!
//! The frame orientation decides everything else: whether photos are
//! consumed in pairs, which photo counts are valid, and the pixel size of
//! every composited output.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Output canvas for landscape (paired) layouts.
pub const LANDSCAPE_SIZE: (u32, u32) = (1920, 1080);

/// Output canvas for portrait (single) layouts.
pub const PORTRAIT_SIZE: (u32, u32) = (1080, 1350);

/// Frame orientation chosen at the start of a photobooth run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    /// Two photos side by side in one output.
    Landscape,
    /// One photo per output.
    #[default]
    Portrait,
}

impl FrameType {
    /// Whether photos are composed two at a time.
    pub fn pairing(self) -> bool {
        matches!(self, FrameType::Landscape)
    }

    /// Fixed output canvas `(width, height)` for this orientation.
    pub fn canvas_size(self) -> (u32, u32) {
        match self {
            FrameType::Landscape => LANDSCAPE_SIZE,
            FrameType::Portrait => PORTRAIT_SIZE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FrameType::Landscape => "landscape",
            FrameType::Portrait => "portrait",
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landscape" => Ok(FrameType::Landscape),
            "portrait" => Ok(FrameType::Portrait),
            other => Err(ModelError::invalid(
                "frameType",
                format!("unknown frame type '{other}' (expected landscape or portrait)"),
            )),
        }
    }
}

/// Persisted capture rules (`photoConfig` in the store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoConfig {
    /// Photos are consumed in pairs.
    pub pairing: bool,

    /// Photos per composed output (2 when pairing, else 1).
    pub photos_per_pair: u32,
}

impl PhotoConfig {
    pub fn for_frame_type(frame_type: FrameType) -> Self {
        let pairing = frame_type.pairing();
        Self {
            pairing,
            photos_per_pair: if pairing { 2 } else { 1 },
        }
    }

    /// The multiple every target photo count must satisfy.
    pub fn required_multiple(&self) -> usize {
        if self.pairing {
            2
        } else {
            1
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self::for_frame_type(FrameType::Portrait)
    }
}

/// Reference to the frame overlay artwork.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameAsset {
    /// Procedurally drawn border, sized to the output canvas.
    #[default]
    Builtin,
    /// Image file on disk.
    File(PathBuf),
    /// Encoded image bytes held in memory.
    Encoded(Arc<[u8]>),
}

impl FrameAsset {
    pub fn describe(&self) -> String {
        match self {
            FrameAsset::Builtin => "built-in border".to_string(),
            FrameAsset::File(path) => path.display().to_string(),
            FrameAsset::Encoded(bytes) => format!("in-memory ({} bytes)", bytes.len()),
        }
    }
}

/// The chosen layout: pairing rules, output size, and frame artwork.
///
/// Pairing and the required photo multiple are derived from the frame type
/// and cannot be configured independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    frame_type: FrameType,
    target_width: u32,
    target_height: u32,
    frame_asset: FrameAsset,
}

impl FrameConfig {
    /// Layout for `frame_type` at its fixed canvas size.
    pub fn new(frame_type: FrameType, frame_asset: FrameAsset) -> Self {
        let (target_width, target_height) = frame_type.canvas_size();
        Self {
            frame_type,
            target_width,
            target_height,
            frame_asset,
        }
    }

    pub fn landscape() -> Self {
        Self::new(FrameType::Landscape, FrameAsset::Builtin)
    }

    pub fn portrait() -> Self {
        Self::new(FrameType::Portrait, FrameAsset::Builtin)
    }

    /// Override the output canvas size. Composition validates the values.
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_asset(mut self, frame_asset: FrameAsset) -> Self {
        self.frame_asset = frame_asset;
        self
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn pairing(&self) -> bool {
        self.frame_type.pairing()
    }

    pub fn required_multiple(&self) -> usize {
        self.photo_config().required_multiple()
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn target_height(&self) -> u32 {
        self.target_height
    }

    pub fn frame_asset(&self) -> &FrameAsset {
        &self.frame_asset
    }

    pub fn photo_config(&self) -> PhotoConfig {
        PhotoConfig::for_frame_type(self.frame_type)
    }
}
