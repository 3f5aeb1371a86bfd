//! Choose the frame layout.

use std::path::PathBuf;

use photobooth_common::config::AppConfig;
use photobooth_frame_model::{clear_captured_photos, save_frame_selection, FrameType};

use super::state::{frame_for, open_store};

pub fn run(mut config: AppConfig, frame: String, artwork: Option<PathBuf>) -> anyhow::Result<()> {
    let frame_type: FrameType = frame
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}. Use: landscape, portrait"))?;

    if let Some(path) = artwork {
        if !path.is_file() {
            return Err(anyhow::anyhow!("Artwork not found: {}", path.display()));
        }
        match frame_type {
            FrameType::Landscape => config.frames.landscape = Some(path),
            FrameType::Portrait => config.frames.portrait = Some(path),
        }
        config
            .save()
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
    }

    let mut store = open_store(&config)?;
    save_frame_selection(&mut store, frame_type)
        .map_err(|e| anyhow::anyhow!("Failed to save frame choice: {e}"))?;
    clear_captured_photos(&mut store)
        .map_err(|e| anyhow::anyhow!("Failed to clear photos: {e}"))?;

    let frame = frame_for(&config, frame_type);
    tracing::info!(frame = %frame_type, "Frame chosen");

    println!("Frame: {frame_type}");
    println!(
        "  Canvas: {}x{}",
        frame.target_width(),
        frame.target_height()
    );
    println!("  Artwork: {}", frame.frame_asset().describe());
    if frame.pairing() {
        println!("  Photos are taken in pairs");
    }

    Ok(())
}
