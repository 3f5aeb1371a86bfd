//! Camera providers.
//!
//! The session treats the camera as an opaque source of encoded stills.
//! A provider hands out at most one stream at a time; the session owns that
//! stream and must give it back on every exit path.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photobooth_common::error::{PhotoboothError, PhotoboothResult};
use photobooth_frame_model::RawPhoto;

/// Fallback still size when a device reports no dimensions.
pub const DEFAULT_STILL_WIDTH: u32 = 640;
pub const DEFAULT_STILL_HEIGHT: u32 = 480;

/// An acquired camera stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    /// Provider-assigned stream id.
    pub id: u64,
    /// Still width in pixels.
    pub width: u32,
    /// Still height in pixels.
    pub height: u32,
}

/// Abstract interface for a still-image camera.
#[async_trait::async_trait]
pub trait CameraProvider: Send {
    /// Engage the device and start streaming.
    async fn acquire_stream(&mut self) -> PhotoboothResult<StreamHandle>;

    /// Stop streaming and give up the device. Never fails.
    fn release_stream(&mut self, handle: StreamHandle);

    /// Grab a single still from an acquired stream.
    async fn capture_still(&mut self, handle: &StreamHandle) -> PhotoboothResult<RawPhoto>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Shared counters describing how a provider has been used.
#[derive(Debug, Default)]
pub struct CameraStats {
    acquired: AtomicUsize,
    released: AtomicUsize,
    captured: AtomicUsize,
}

impl CameraStats {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn captured(&self) -> usize {
        self.captured.load(Ordering::SeqCst)
    }

    /// Streams acquired and not yet released.
    pub fn open_streams(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }
}

/// Tracks the single stream a provider may have open.
#[derive(Debug, Default)]
struct StreamSlot {
    next_id: u64,
    open: Option<u64>,
}

impl StreamSlot {
    fn open(&mut self, provider: &str) -> PhotoboothResult<u64> {
        if self.open.is_some() {
            return Err(PhotoboothError::camera_access(format!(
                "{provider} is already streaming"
            )));
        }
        self.next_id += 1;
        self.open = Some(self.next_id);
        Ok(self.next_id)
    }

    fn check(&self, provider: &str, handle: &StreamHandle) -> PhotoboothResult<()> {
        match self.open {
            Some(id) if id == handle.id => Ok(()),
            _ => Err(PhotoboothError::camera_access(format!(
                "{provider} stream {} is not open",
                handle.id
            ))),
        }
    }

    fn close(&mut self, handle: &StreamHandle) -> bool {
        if self.open == Some(handle.id) {
            self.open = None;
            true
        } else {
            false
        }
    }
}

/// Generates deterministic test-pattern stills.
///
/// Each still is a colour gradient shifted by the shot number, so
/// consecutive captures differ while identical runs produce identical bytes.
#[derive(Debug)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    available: bool,
    shots: u32,
    slot: StreamSlot,
    stats: Arc<CameraStats>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_STILL_WIDTH, DEFAULT_STILL_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            available: true,
            shots: 0,
            slot: StreamSlot::default(),
            stats: Arc::new(CameraStats::default()),
        }
    }

    /// A camera whose device access is always refused.
    pub fn denied() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        self.stats.clone()
    }

    fn render_still(&self, shot: u32) -> PhotoboothResult<Vec<u8>> {
        let span_x = (self.width - 1).max(1);
        let span_y = (self.height - 1).max(1);
        let shift = shot.wrapping_mul(37) % 256;
        let img = RgbImage::from_fn(self.width, self.height, |x, y| {
            let r = (x * 255 / span_x + shift) % 256;
            let g = (y * 255 / span_y + shift / 2) % 256;
            let b = (shift + 128) % 256;
            Rgb([r as u8, g as u8, b as u8])
        });
        encode_png(&DynamicImage::ImageRgb8(img))
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CameraProvider for SyntheticCamera {
    async fn acquire_stream(&mut self) -> PhotoboothResult<StreamHandle> {
        if !self.available {
            return Err(PhotoboothError::camera_access(
                "permission to use the camera was denied",
            ));
        }
        let id = self.slot.open("synthetic camera")?;
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(StreamHandle {
            id,
            width: self.width,
            height: self.height,
        })
    }

    fn release_stream(&mut self, handle: StreamHandle) {
        if self.slot.close(&handle) {
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn capture_still(&mut self, handle: &StreamHandle) -> PhotoboothResult<RawPhoto> {
        self.slot.check("synthetic camera", handle)?;
        let bytes = self.render_still(self.shots)?;
        self.shots += 1;
        self.stats.captured.fetch_add(1, Ordering::SeqCst);
        Ok(RawPhoto::captured_now(bytes))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Replays image files from a directory as camera stills.
///
/// Files are taken in name order and wrap around once exhausted.
#[derive(Debug)]
pub struct DirectoryCamera {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    cursor: usize,
    slot: StreamSlot,
    stats: Arc<CameraStats>,
}

const STILL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames: Vec::new(),
            cursor: 0,
            slot: StreamSlot::default(),
            stats: Arc::new(CameraStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        self.stats.clone()
    }

    async fn scan(dir: &Path) -> PhotoboothResult<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            PhotoboothError::camera_access(format!("cannot open {}: {e}", dir.display()))
        })?;
        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_still = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| STILL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_still {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames)
    }
}

#[async_trait::async_trait]
impl CameraProvider for DirectoryCamera {
    async fn acquire_stream(&mut self) -> PhotoboothResult<StreamHandle> {
        let frames = Self::scan(&self.dir).await?;
        if frames.is_empty() {
            return Err(PhotoboothError::camera_access(format!(
                "no still images found in {}",
                self.dir.display()
            )));
        }
        let (width, height) = image::image_dimensions(&frames[0])
            .unwrap_or((DEFAULT_STILL_WIDTH, DEFAULT_STILL_HEIGHT));
        let id = self.slot.open("directory camera")?;
        tracing::debug!(dir = %self.dir.display(), frames = frames.len(), "Directory camera ready");
        self.frames = frames;
        self.stats.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(StreamHandle { id, width, height })
    }

    fn release_stream(&mut self, handle: StreamHandle) {
        if self.slot.close(&handle) {
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn capture_still(&mut self, handle: &StreamHandle) -> PhotoboothResult<RawPhoto> {
        self.slot.check("directory camera", handle)?;
        let path = &self.frames[self.cursor % self.frames.len()];
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PhotoboothError::camera_access(format!("failed to read {}: {e}", path.display()))
        })?;
        let still = image::load_from_memory(&bytes).map_err(|e| {
            PhotoboothError::image_load(format!("failed to decode {}: {e}", path.display()))
        })?;
        let png = encode_png(&still)?;
        self.cursor += 1;
        self.stats.captured.fetch_add(1, Ordering::SeqCst);
        Ok(RawPhoto::captured_now(png))
    }

    fn name(&self) -> &str {
        "directory"
    }
}

/// Stills always leave a provider as PNG, whatever the source format.
fn encode_png(img: &DynamicImage) -> PhotoboothResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PhotoboothError::encode(format!("failed to encode still: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_synthetic_stills_are_png_and_distinct() {
        let mut camera = SyntheticCamera::with_size(16, 12);
        let handle = camera.acquire_stream().await.unwrap();

        let first = camera.capture_still(&handle).await.unwrap();
        let second = camera.capture_still(&handle).await.unwrap();
        assert_eq!(first.mime_type(), "image/png");
        assert_ne!(first.bytes(), second.bytes());

        let decoded = image::load_from_memory(first.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
    }

    #[tokio::test]
    async fn test_synthetic_is_deterministic_across_instances() {
        let mut a = SyntheticCamera::with_size(8, 8);
        let mut b = SyntheticCamera::with_size(8, 8);
        let ha = a.acquire_stream().await.unwrap();
        let hb = b.acquire_stream().await.unwrap();
        assert_eq!(
            a.capture_still(&ha).await.unwrap().bytes(),
            b.capture_still(&hb).await.unwrap().bytes()
        );
    }

    #[tokio::test]
    async fn test_single_stream_ownership() {
        let mut camera = SyntheticCamera::with_size(4, 4);
        let stats = camera.stats();
        let handle = camera.acquire_stream().await.unwrap();
        assert!(camera.acquire_stream().await.is_err());

        camera.release_stream(handle.clone());
        assert_eq!(stats.open_streams(), 0);
        assert!(camera.capture_still(&handle).await.is_err());

        // Releasing twice is harmless.
        camera.release_stream(handle);
        assert_eq!(stats.released(), 1);
    }

    #[tokio::test]
    async fn test_denied_camera() {
        let mut camera = SyntheticCamera::denied();
        let err = camera.acquire_stream().await.unwrap_err();
        assert!(matches!(err, PhotoboothError::CameraAccess { .. }));
    }

    #[tokio::test]
    async fn test_directory_camera_replays_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for (name, shade) in [("b.png", 200u8), ("a.png", 10u8)] {
            RgbImage::from_pixel(3, 2, Rgb([shade, shade, shade]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut camera = DirectoryCamera::new(dir.path());
        let handle = camera.acquire_stream().await.unwrap();
        assert_eq!((handle.width, handle.height), (3, 2));

        let shades: Vec<u8> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                let photo = camera.capture_still(&handle).await.unwrap();
                out.push(image::load_from_memory(photo.bytes()).unwrap().to_rgb8()[(0, 0)][0]);
            }
            out
        };
        assert_eq!(shades, vec![10, 200, 10]);
    }

    #[tokio::test]
    async fn test_directory_camera_converts_jpeg_to_png() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 6, Rgb([120, 60, 30]))
            .save(dir.path().join("a.jpg"))
            .unwrap();

        let mut camera = DirectoryCamera::new(dir.path());
        let handle = camera.acquire_stream().await.unwrap();
        let photo = camera.capture_still(&handle).await.unwrap();

        assert_eq!(photo.mime_type(), "image/png");
        let decoded = image::load_from_memory(photo.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[tokio::test]
    async fn test_directory_camera_rejects_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();

        let mut camera = DirectoryCamera::new(dir.path());
        let handle = camera.acquire_stream().await.unwrap();
        let err = camera.capture_still(&handle).await.unwrap_err();
        assert!(matches!(err, PhotoboothError::ImageLoad { .. }));
        assert_eq!(camera.stats().captured(), 0);
    }

    #[tokio::test]
    async fn test_directory_camera_without_images_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = DirectoryCamera::new(dir.path());
        let err = camera.acquire_stream().await.unwrap_err();
        assert!(matches!(err, PhotoboothError::CameraAccess { .. }));
        assert_eq!(camera.stats().acquired(), 0);
    }
}
