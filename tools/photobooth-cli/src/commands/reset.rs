//! Delete every captured photo.

use photobooth_common::config::AppConfig;
use photobooth_frame_model::clear_captured_photos;

use super::state::open_store;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    clear_captured_photos(&mut store)
        .map_err(|e| anyhow::anyhow!("Failed to clear photos: {e}"))?;
    tracing::info!("Captured photos cleared");
    println!("All photos deleted");
    Ok(())
}
