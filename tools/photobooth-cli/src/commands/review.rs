//! Review captured photos before export.

use photobooth_capture_engine::{CaptureSession, SyntheticCamera};
use photobooth_common::config::AppConfig;
use photobooth_render_engine::{plan_export, ExportCoordinator, ExportItem};

use super::state::{load_frame_and_photos, open_store};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let (frame, photos) = load_frame_and_photos(config, &store)?;

    let mut session = CaptureSession::new(frame.photo_config(), Box::new(SyntheticCamera::new()));
    session.restore(photos.clone())?;
    session.ready_for_review()?;

    println!(
        "{} photo(s), {} frame {}x{}",
        photos.len(),
        frame.frame_type(),
        frame.target_width(),
        frame.target_height()
    );
    for (i, photo) in photos.iter().enumerate() {
        println!("  Photo {}: {} KB", i + 1, photo.size_kb());
    }
    println!();

    let previews = ExportCoordinator::new().preview(&photos, &frame);
    let mut previews = previews.iter();
    for item in plan_export(photos.len(), frame.pairing()) {
        if let ExportItem::Original { .. } = item {
            println!("  {item}: exported as captured");
            continue;
        }
        match previews.next().map(|p| &p.result) {
            Some(Ok(composite)) => println!(
                "  {item}: ok ({}x{}) -> {}",
                composite.width(),
                composite.height(),
                item.filename()
            ),
            Some(Err(e)) => println!("  {item}: failed ({e})"),
            None => println!("  {item}: not composed"),
        }
    }

    Ok(())
}
