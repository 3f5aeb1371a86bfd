//! Show the stored photobooth state.

use photobooth_common::config::AppConfig;
use photobooth_frame_model::load_photo_config;

use super::state::{load_frame_and_photos, open_store};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let (frame, photos) = load_frame_and_photos(config, &store)?;
    let photo_config = load_photo_config(&store)
        .map_err(|e| anyhow::anyhow!("Failed to read photo config: {e}"))?;

    println!("State: {}", store.path().display());
    println!();

    println!("Frame:");
    println!("  Type: {}", frame.frame_type());
    println!(
        "  Canvas: {}x{}",
        frame.target_width(),
        frame.target_height()
    );
    println!("  Artwork: {}", frame.frame_asset().describe());
    println!(
        "  Pairing: {} ({} photo(s) per group)",
        photo_config.pairing, photo_config.photos_per_pair
    );
    println!();

    println!("Photos: {}", photos.len());
    for (i, photo) in photos.iter().enumerate() {
        println!("  {}: {} KB ({})", i + 1, photo.size_kb(), photo.mime_type());
    }
    println!();

    println!("Export:");
    println!("  Output: {}", config.output_dir.display());
    println!("  Delay: {}ms", config.export.delay_ms);

    Ok(())
}
