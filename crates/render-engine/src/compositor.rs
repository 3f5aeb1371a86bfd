//! Photo compositor: layers captured photos under frame artwork.
//!
//! Two layouts exist. A single photo is cover-fit onto the full canvas. A
//! pair is split into halves, each photo stretched to fill its half. The
//! frame artwork is always drawn last, at full canvas size, so its opaque
//! pixels sit on top of the photos.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use photobooth_common::error::{PhotoboothError, PhotoboothResult};
use photobooth_frame_model::{FrameConfig, RawPhoto};

use crate::artwork::{decode_rgba, load_artwork};

const CANVAS_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Geometry of a cover-fit crop.
///
/// The source is scaled uniformly until it covers the target on both axes,
/// then centred; whatever overhangs the target is clipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub scaled_width: f64,
    pub scaled_height: f64,
    pub crop_x: f64,
    pub crop_y: f64,
}

impl CoverFit {
    pub fn compute(
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Self {
        let (sw, sh) = (source_width as f64, source_height as f64);
        let (tw, th) = (target_width as f64, target_height as f64);
        let scale = (tw / sw).max(th / sh);
        let scaled_width = sw * scale;
        let scaled_height = sh * scale;
        Self {
            scale,
            scaled_width,
            scaled_height,
            crop_x: (scaled_width - tw) / 2.0,
            crop_y: (scaled_height - th) / 2.0,
        }
    }

    /// Region of the source that ends up visible, in source pixels:
    /// `(x, y, width, height)`.
    ///
    /// Cropping before scaling keeps the working image bounded by the
    /// target size no matter how extreme the source aspect ratio is.
    pub fn source_rect(&self, source_width: u32, source_height: u32) -> (u32, u32, u32, u32) {
        let visible_w = self.scaled_visible(source_width, self.scaled_width, self.crop_x);
        let visible_h = self.scaled_visible(source_height, self.scaled_height, self.crop_y);
        (
            (source_width - visible_w) / 2,
            (source_height - visible_h) / 2,
            visible_w,
            visible_h,
        )
    }

    fn scaled_visible(&self, source: u32, scaled: f64, crop: f64) -> u32 {
        let visible = (scaled - 2.0 * crop) / self.scale;
        (visible.round() as u32).clamp(1, source)
    }
}

/// A finished composite at the frame's target size.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    image: RgbaImage,
}

impl Composite {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode as PNG, the delivery format.
    pub fn encode_png(&self) -> PhotoboothResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| PhotoboothError::encode(format!("failed to encode composite: {e}")))?;
        Ok(buf)
    }
}

/// Composites photos against one frame.
///
/// Holds the decoded artwork so a batch export decodes it once.
#[derive(Debug, Clone)]
pub struct Compositor {
    width: u32,
    height: u32,
    artwork: RgbaImage,
}

impl Compositor {
    /// Validate the target size and load the frame artwork.
    pub fn new(frame: &FrameConfig) -> PhotoboothResult<Self> {
        let artwork = load_artwork(frame)?;
        Ok(Self {
            width: frame.target_width(),
            height: frame.target_height(),
            artwork,
        })
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Cover-fit one photo onto the canvas and draw the frame over it.
    pub fn single(&self, photo: &RawPhoto) -> PhotoboothResult<Composite> {
        let source = decode_rgba(photo.bytes(), "photo")?;
        let (sw, sh) = source.dimensions();
        let fit = CoverFit::compute(sw, sh, self.width, self.height);
        let (crop_x, crop_y, crop_w, crop_h) = fit.source_rect(sw, sh);

        tracing::debug!(
            source_width = sw,
            source_height = sh,
            scale = fit.scale,
            crop_x,
            crop_y,
            crop_w,
            crop_h,
            "Cover-fit single photo"
        );

        let visible = imageops::crop_imm(&source, crop_x, crop_y, crop_w, crop_h).to_image();
        let cropped = imageops::resize(&visible, self.width, self.height, FilterType::Triangle);

        let mut canvas = RgbaImage::from_pixel(self.width, self.height, CANVAS_BACKGROUND);
        imageops::overlay(&mut canvas, &cropped, 0, 0);
        imageops::overlay(&mut canvas, &self.artwork, 0, 0);
        Ok(Composite { image: canvas })
    }

    /// Stretch `left` and `right` into the canvas halves and draw the frame
    /// over both. Aspect ratio is not preserved.
    ///
    /// A one pixel wide canvas has an empty left half; only the right photo
    /// shows, though both must still decode.
    pub fn pair(&self, left: &RawPhoto, right: &RawPhoto) -> PhotoboothResult<Composite> {
        let left = decode_rgba(left.bytes(), "left photo")?;
        let right = decode_rgba(right.bytes(), "right photo")?;

        let left_width = self.width / 2;
        let right_width = self.width - left_width;

        let mut canvas = RgbaImage::from_pixel(self.width, self.height, CANVAS_BACKGROUND);
        if left_width > 0 {
            let left = imageops::resize(&left, left_width, self.height, FilterType::Triangle);
            imageops::overlay(&mut canvas, &left, 0, 0);
        }
        let right = imageops::resize(&right, right_width, self.height, FilterType::Triangle);
        imageops::overlay(&mut canvas, &right, i64::from(left_width), 0);
        imageops::overlay(&mut canvas, &self.artwork, 0, 0);
        Ok(Composite { image: canvas })
    }
}

/// Compose a single framed photo.
pub fn compose_single(photo: &RawPhoto, frame: &FrameConfig) -> PhotoboothResult<Composite> {
    Compositor::new(frame)?.single(photo)
}

/// Compose a side-by-side pair under one frame.
pub fn compose_pair(
    left: &RawPhoto,
    right: &RawPhoto,
    frame: &FrameConfig,
) -> PhotoboothResult<Composite> {
    Compositor::new(frame)?.pair(left, right)
}
