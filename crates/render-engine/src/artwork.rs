//! Frame artwork loading.
//!
//! Artwork is always returned at the exact target size so the compositor
//! can layer it at the origin without further scaling.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use photobooth_common::error::{PhotoboothError, PhotoboothResult};
use photobooth_frame_model::{FrameAsset, FrameConfig, FrameType};

/// Outer border colour of the built-in frame.
pub const BORDER_COLOR: Rgba<u8> = Rgba([250, 245, 235, 255]);
/// Accent line drawn just inside the border.
pub const ACCENT_COLOR: Rgba<u8> = Rgba([200, 160, 90, 255]);

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Load the artwork referenced by `frame`, sized to its target canvas.
pub fn load_artwork(frame: &FrameConfig) -> PhotoboothResult<RgbaImage> {
    let (width, height) = (frame.target_width(), frame.target_height());
    if width == 0 || height == 0 {
        return Err(PhotoboothError::Dimension { width, height });
    }

    let decoded = match frame.frame_asset() {
        FrameAsset::Builtin => return Ok(builtin_frame(frame.frame_type(), width, height)),
        FrameAsset::File(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                PhotoboothError::image_load(format!(
                    "failed to read frame artwork {}: {e}",
                    path.display()
                ))
            })?;
            decode_rgba(&bytes, "frame artwork")?
        }
        FrameAsset::Encoded(bytes) => decode_rgba(bytes, "frame artwork")?,
    };

    if decoded.dimensions() == (width, height) {
        return Ok(decoded);
    }
    tracing::debug!(
        from_width = decoded.width(),
        from_height = decoded.height(),
        width,
        height,
        "Resizing frame artwork to target"
    );
    Ok(imageops::resize(&decoded, width, height, FilterType::Triangle))
}

/// Draw the procedural border frame.
///
/// The interior is fully transparent. Landscape frames also get a centre
/// divider between the two halves of a pair.
pub fn builtin_frame(frame_type: FrameType, width: u32, height: u32) -> RgbaImage {
    let thickness = (width.min(height) / 24).max(1);
    let accent = (thickness / 4).max(1);

    RgbaImage::from_fn(width, height, |x, y| {
        let edge = x.min(y).min(width - 1 - x).min(height - 1 - y);
        if edge < thickness {
            return BORDER_COLOR;
        }
        if edge < thickness + accent {
            return ACCENT_COLOR;
        }
        if frame_type == FrameType::Landscape {
            let half = thickness / 2;
            let centre = width / 2;
            if x + half >= centre && x < centre + half.max(1) {
                return BORDER_COLOR;
            }
        }
        TRANSPARENT
    })
}

pub(crate) fn decode_rgba(bytes: &[u8], what: &str) -> PhotoboothResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| PhotoboothError::image_load(format!("failed to decode {what}: {e}")))
}
