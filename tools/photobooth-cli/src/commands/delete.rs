//! Delete one captured photo.

use photobooth_capture_engine::{CaptureSession, SyntheticCamera};
use photobooth_common::config::AppConfig;
use photobooth_frame_model::save_captured_photos;

use super::state::{load_frame_and_photos, open_store};

pub fn run(config: &AppConfig, number: usize) -> anyhow::Result<()> {
    if number == 0 {
        return Err(anyhow::anyhow!("Photo numbers start at 1"));
    }

    let mut store = open_store(config)?;
    let (frame, photos) = load_frame_and_photos(config, &store)?;

    let mut session = CaptureSession::new(frame.photo_config(), Box::new(SyntheticCamera::new()));
    session.restore(photos)?;
    session.delete_photo(number - 1)?;
    save_captured_photos(&mut store, session.photos())
        .map_err(|e| anyhow::anyhow!("Failed to save photos: {e}"))?;

    println!("Deleted photo {number}; {} left", session.photos().len());
    println!("{}", session.status());
    Ok(())
}
