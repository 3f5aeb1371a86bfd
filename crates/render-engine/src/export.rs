//! Export planning and delivery.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use photobooth_common::error::{PhotoboothError, PhotoboothResult};
use photobooth_frame_model::{FrameConfig, RawPhoto};

use crate::compositor::{Composite, Compositor};

/// Default pause between consecutive deliveries.
pub const DEFAULT_EXPORT_DELAY: Duration = Duration::from_millis(100);

/// Destination for finished images.
pub trait DeliverySink: Send {
    /// Hand over one encoded image under its suggested filename.
    fn deliver(&mut self, bytes: &[u8], filename: &str) -> PhotoboothResult<()>;

    /// Sink name for logs.
    fn name(&self) -> &str;
}

/// Writes deliveries as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DeliverySink for DirectorySink {
    fn deliver(&mut self, bytes: &[u8], filename: &str) -> PhotoboothResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            PhotoboothError::delivery(format!("cannot create {}: {e}", self.dir.display()))
        })?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(|e| {
            PhotoboothError::delivery(format!("failed to write {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote export");
        Ok(())
    }

    fn name(&self) -> &str {
        "directory"
    }
}

/// One delivery captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps deliveries in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    deliveries: Vec<Delivered>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> &[Delivered] {
        &self.deliveries
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.deliveries.iter().map(|d| d.filename.as_str()).collect()
    }
}

impl DeliverySink for MemorySink {
    fn deliver(&mut self, bytes: &[u8], filename: &str) -> PhotoboothResult<()> {
        self.deliveries.push(Delivered {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// A unit of export work. Indices are 0-based positions in the photo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportItem {
    /// One photo composed onto the frame.
    Framed { index: usize },
    /// Two consecutive photos composed side by side.
    Pair {
        pair_index: usize,
        left: usize,
        right: usize,
    },
    /// A trailing unpaired photo, delivered as captured.
    Original { index: usize },
}

impl ExportItem {
    pub fn filename(&self) -> String {
        match self {
            ExportItem::Framed { index } => format!("photo-framed-{}.png", index + 1),
            ExportItem::Pair { pair_index, .. } => {
                format!("photo-landscape-pair-{}.png", pair_index + 1)
            }
            ExportItem::Original { index } => format!("photo-original-{}.png", index + 1),
        }
    }

    /// Photo indices this item covers.
    pub fn indices(&self) -> Vec<usize> {
        match *self {
            ExportItem::Framed { index } | ExportItem::Original { index } => vec![index],
            ExportItem::Pair { left, right, .. } => vec![left, right],
        }
    }

    pub fn is_composed(&self) -> bool {
        !matches!(self, ExportItem::Original { .. })
    }
}

impl fmt::Display for ExportItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportItem::Framed { index } => write!(f, "Photo {}", index + 1),
            ExportItem::Pair {
                pair_index,
                left,
                right,
            } => write!(
                f,
                "Pair {} (photos {} & {})",
                pair_index + 1,
                left + 1,
                right + 1
            ),
            ExportItem::Original { index } => write!(f, "Photo {} (unpaired)", index + 1),
        }
    }
}

/// Group `count` photos into export items, in index order.
pub fn plan_export(count: usize, pairing: bool) -> Vec<ExportItem> {
    if !pairing {
        return (0..count).map(|index| ExportItem::Framed { index }).collect();
    }
    (0..count)
        .step_by(2)
        .map(|left| {
            if left + 1 < count {
                ExportItem::Pair {
                    pair_index: left / 2,
                    left,
                    right: left + 1,
                }
            } else {
                ExportItem::Original { index: left }
            }
        })
        .collect()
}

/// The export item covering photo `index`.
pub fn item_for_photo(index: usize, count: usize, pairing: bool) -> PhotoboothResult<ExportItem> {
    if index >= count {
        return Err(PhotoboothError::IndexOutOfRange { index, len: count });
    }
    if !pairing {
        return Ok(ExportItem::Framed { index });
    }
    let left = index - index % 2;
    Ok(if left + 1 < count {
        ExportItem::Pair {
            pair_index: left / 2,
            left,
            right: left + 1,
        }
    } else {
        ExportItem::Original { index: left }
    })
}

/// An item that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub filename: String,
    pub message: String,
}

/// Outcome of a batch export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Filenames delivered, in order.
    pub delivered: Vec<String>,
    pub failed: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A composed preview for the review listing.
#[derive(Debug)]
pub struct PreviewItem {
    pub item: ExportItem,
    pub result: PhotoboothResult<Composite>,
}

/// Sequences composition and delivery across a set of photos.
#[derive(Debug, Clone)]
pub struct ExportCoordinator {
    delay: Duration,
}

impl Default for ExportCoordinator {
    fn default() -> Self {
        Self {
            delay: DEFAULT_EXPORT_DELAY,
        }
    }
}

impl ExportCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between consecutive deliveries.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Export every photo, one item at a time.
    ///
    /// A failing item is logged and recorded in the report; the rest still
    /// go out.
    pub async fn export_all(
        &self,
        photos: &[RawPhoto],
        frame: &FrameConfig,
        sink: &mut dyn DeliverySink,
    ) -> ExportReport {
        let items = plan_export(photos.len(), frame.pairing());
        tracing::info!(
            photos = photos.len(),
            items = items.len(),
            frame = %frame.frame_type(),
            sink = sink.name(),
            "Starting export"
        );

        let mut report = ExportReport::default();
        if items.is_empty() {
            return report;
        }

        let compositor = Compositor::new(frame).map_err(|e| e.to_string());
        if let Err(message) = &compositor {
            tracing::warn!(error = %message, "Frame unavailable; composed items will fail");
        }

        for (n, item) in items.iter().enumerate() {
            if n > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let filename = item.filename();
            let outcome = match &compositor {
                Ok(compositor) => render_item(compositor, photos, item),
                Err(message) if item.is_composed() => {
                    Err(PhotoboothError::image_load(message.clone()))
                }
                Err(_) => original_bytes(photos, item),
            }
            .and_then(|bytes| sink.deliver(&bytes, &filename));

            match outcome {
                Ok(()) => {
                    tracing::info!(file = %filename, "Delivered");
                    report.delivered.push(filename);
                }
                Err(e) => {
                    tracing::warn!(file = %filename, error = %e, "Export item failed");
                    report.failed.push(ExportFailure {
                        filename,
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Export finished"
        );
        report
    }

    /// Export the item covering photo `index`: the photo itself, or its pair.
    ///
    /// Returns the delivered filename. Failures go to the caller.
    pub async fn export_one(
        &self,
        photos: &[RawPhoto],
        index: usize,
        frame: &FrameConfig,
        sink: &mut dyn DeliverySink,
    ) -> PhotoboothResult<String> {
        let item = item_for_photo(index, photos.len(), frame.pairing())?;
        let bytes = if item.is_composed() {
            render_item(&Compositor::new(frame)?, photos, &item)?
        } else {
            original_bytes(photos, &item)?
        };
        let filename = item.filename();
        sink.deliver(&bytes, &filename)?;
        tracing::info!(file = %filename, index, "Delivered");
        Ok(filename)
    }

    /// Compose every item without delivering anything.
    ///
    /// Trailing unpaired photos have nothing to compose and are skipped.
    pub fn preview(&self, photos: &[RawPhoto], frame: &FrameConfig) -> Vec<PreviewItem> {
        let items = plan_export(photos.len(), frame.pairing());
        let compositor = Compositor::new(frame).map_err(|e| e.to_string());

        items
            .into_iter()
            .filter(ExportItem::is_composed)
            .map(|item| {
                let result = match &compositor {
                    Ok(compositor) => compose_item(compositor, photos, &item),
                    Err(message) => Err(PhotoboothError::image_load(message.clone())),
                };
                PreviewItem { item, result }
            })
            .collect()
    }
}

fn compose_item(
    compositor: &Compositor,
    photos: &[RawPhoto],
    item: &ExportItem,
) -> PhotoboothResult<Composite> {
    match *item {
        ExportItem::Framed { index } => compositor.single(photo_at(photos, index)?),
        ExportItem::Pair { left, right, .. } => {
            compositor.pair(photo_at(photos, left)?, photo_at(photos, right)?)
        }
        ExportItem::Original { index } => Err(PhotoboothError::IndexOutOfRange {
            index,
            len: photos.len(),
        }),
    }
}

fn render_item(
    compositor: &Compositor,
    photos: &[RawPhoto],
    item: &ExportItem,
) -> PhotoboothResult<Vec<u8>> {
    if !item.is_composed() {
        return original_bytes(photos, item);
    }
    compose_item(compositor, photos, item)?.encode_png()
}

fn original_bytes(photos: &[RawPhoto], item: &ExportItem) -> PhotoboothResult<Vec<u8>> {
    let index = item.indices()[0];
    Ok(photo_at(photos, index)?.bytes().to_vec())
}

fn photo_at(photos: &[RawPhoto], index: usize) -> PhotoboothResult<&RawPhoto> {
    photos.get(index).ok_or(PhotoboothError::IndexOutOfRange {
        index,
        len: photos.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::artwork::BORDER_COLOR;

    fn solid_photo(shade: u8) -> RawPhoto {
        let img = RgbImage::from_pixel(16, 12, Rgb([shade, shade, shade]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        RawPhoto::from_bytes(buf)
    }

    fn photos(n: usize) -> Vec<RawPhoto> {
        (0..n).map(|i| solid_photo(20 * i as u8 + 10)).collect()
    }

    fn coordinator() -> ExportCoordinator {
        ExportCoordinator::new().with_delay(Duration::ZERO)
    }

    /// Rejects one filename, accepts everything else.
    struct FlakySink {
        reject: String,
        inner: MemorySink,
    }

    impl DeliverySink for FlakySink {
        fn deliver(&mut self, bytes: &[u8], filename: &str) -> PhotoboothResult<()> {
            if filename == self.reject {
                return Err(PhotoboothError::delivery("disk full"));
            }
            self.inner.deliver(bytes, filename)
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_plan_pairs_with_trailing_original() {
        let plan = plan_export(5, true);
        assert_eq!(
            plan,
            vec![
                ExportItem::Pair {
                    pair_index: 0,
                    left: 0,
                    right: 1
                },
                ExportItem::Pair {
                    pair_index: 1,
                    left: 2,
                    right: 3
                },
                ExportItem::Original { index: 4 },
            ]
        );
        assert_eq!(plan_export(3, false).len(), 3);
        assert!(plan_export(0, true).is_empty());
    }

    #[test]
    fn test_filenames_are_one_based() {
        assert_eq!(
            ExportItem::Framed { index: 0 }.filename(),
            "photo-framed-1.png"
        );
        assert_eq!(
            ExportItem::Pair {
                pair_index: 1,
                left: 2,
                right: 3
            }
            .filename(),
            "photo-landscape-pair-2.png"
        );
        assert_eq!(
            ExportItem::Original { index: 4 }.filename(),
            "photo-original-5.png"
        );
    }

    #[test]
    fn test_item_for_photo() {
        assert_eq!(
            item_for_photo(3, 4, true).unwrap(),
            ExportItem::Pair {
                pair_index: 1,
                left: 2,
                right: 3
            }
        );
        assert_eq!(
            item_for_photo(4, 5, true).unwrap(),
            ExportItem::Original { index: 4 }
        );
        assert_eq!(
            item_for_photo(1, 3, false).unwrap(),
            ExportItem::Framed { index: 1 }
        );
        assert!(matches!(
            item_for_photo(3, 3, false),
            Err(PhotoboothError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[tokio::test]
    async fn test_export_all_pairs_five_photos() {
        let frame = FrameConfig::landscape().with_target_size(64, 36);
        let photos = photos(5);
        let mut sink = MemorySink::new();

        let report = coordinator().export_all(&photos, &frame, &mut sink).await;
        assert!(report.is_complete());
        assert_eq!(
            sink.filenames(),
            vec![
                "photo-landscape-pair-1.png",
                "photo-landscape-pair-2.png",
                "photo-original-5.png"
            ]
        );
        assert_eq!(sink.deliveries()[2].bytes, photos[4].bytes());

        let pair = image::load_from_memory(&sink.deliveries()[0].bytes).unwrap();
        assert_eq!((pair.width(), pair.height()), (64, 36));
    }

    #[tokio::test]
    async fn test_export_all_frames_each_portrait_photo() {
        let frame = FrameConfig::portrait().with_target_size(48, 60);
        let mut sink = MemorySink::new();

        let report = coordinator().export_all(&photos(3), &frame, &mut sink).await;
        assert_eq!(report.delivered.len(), 3);
        assert_eq!(
            sink.filenames(),
            vec!["photo-framed-1.png", "photo-framed-2.png", "photo-framed-3.png"]
        );
        for delivered in sink.deliveries() {
            let img = image::load_from_memory(&delivered.bytes).unwrap().to_rgba8();
            assert_eq!(*img.get_pixel(0, 0), BORDER_COLOR);
        }
    }

    #[tokio::test]
    async fn test_failed_item_does_not_stop_export() {
        let frame = FrameConfig::portrait().with_target_size(24, 30);
        let mut photos = photos(3);
        photos[1] = RawPhoto::from_bytes(vec![9u8, 9, 9]);
        let mut sink = FlakySink {
            reject: "photo-framed-3.png".to_string(),
            inner: MemorySink::new(),
        };

        let report = coordinator().export_all(&photos, &frame, &mut sink).await;
        assert_eq!(report.delivered, vec!["photo-framed-1.png"]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].filename, "photo-framed-2.png");
        assert!(report.failed[1].message.contains("disk full"));
        assert_eq!(sink.inner.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn test_broken_frame_still_delivers_originals() {
        let frame = FrameConfig::landscape()
            .with_asset(photobooth_frame_model::FrameAsset::Encoded(vec![0u8; 4].into()));
        let mut sink = MemorySink::new();

        let report = coordinator().export_all(&photos(3), &frame, &mut sink).await;
        assert_eq!(report.delivered, vec!["photo-original-3.png"]);
        assert_eq!(report.failed.len(), 1);
    }

    #[tokio::test]
    async fn test_export_one_delivers_containing_pair() {
        let frame = FrameConfig::landscape().with_target_size(32, 18);
        let photos = photos(4);
        let mut sink = MemorySink::new();

        let name = coordinator()
            .export_one(&photos, 2, &frame, &mut sink)
            .await
            .unwrap();
        assert_eq!(name, "photo-landscape-pair-2.png");

        let err = coordinator()
            .export_one(&photos, 4, &frame, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoboothError::IndexOutOfRange { .. }));
        assert_eq!(sink.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn test_export_one_delivers_trailing_unpaired_photo_raw() {
        let frame = FrameConfig::landscape().with_target_size(32, 18);
        let photos = photos(3);
        let mut sink = MemorySink::new();

        let name = coordinator()
            .export_one(&photos, 2, &frame, &mut sink)
            .await
            .unwrap();
        assert_eq!(name, "photo-original-3.png");
        assert_eq!(sink.deliveries().len(), 1);
        assert_eq!(sink.deliveries()[0].bytes, photos[2].bytes());
    }

    #[tokio::test]
    async fn test_delay_spaces_out_deliveries() {
        let frame = FrameConfig::portrait().with_target_size(8, 10);
        let delay = Duration::from_millis(15);
        let mut sink = MemorySink::new();

        let started = std::time::Instant::now();
        ExportCoordinator::new()
            .with_delay(delay)
            .export_all(&photos(3), &frame, &mut sink)
            .await;
        assert!(started.elapsed() >= delay * 2);
        assert_eq!(sink.deliveries().len(), 3);
    }

    #[test]
    fn test_preview_skips_originals() {
        let frame = FrameConfig::landscape().with_target_size(32, 18);
        let previews = coordinator().preview(&photos(3), &frame);
        assert_eq!(previews.len(), 1);
        assert!(previews[0].result.is_ok());
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        sink.deliver(b"png", "photo-framed-1.png").unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("out").join("photo-framed-1.png")).unwrap(),
            b"png"
        );
    }
}
