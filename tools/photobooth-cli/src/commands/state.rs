//! Shared access to the persisted photobooth state.

use photobooth_common::config::AppConfig;
use photobooth_common::error::PhotoboothError;
use photobooth_frame_model::{
    load_captured_photos, load_frame_type, FrameAsset, FrameConfig, FrameType, JsonFileStore,
    RawPhoto,
};

pub fn open_store(config: &AppConfig) -> anyhow::Result<JsonFileStore> {
    let path = config.state_file();
    let store = JsonFileStore::open(&path).map_err(|e| PhotoboothError::store(e.to_string()))?;
    tracing::debug!(path = %path.display(), "Opened state store");
    Ok(store)
}

/// Frame layout for `frame_type`, with the configured artwork if any.
pub fn frame_for(config: &AppConfig, frame_type: FrameType) -> FrameConfig {
    let artwork = match frame_type {
        FrameType::Landscape => config.frames.landscape.clone(),
        FrameType::Portrait => config.frames.portrait.clone(),
    };
    FrameConfig::new(frame_type, artwork.map(FrameAsset::File).unwrap_or_default())
}

/// The stored frame choice and captured photos.
pub fn load_frame_and_photos(
    config: &AppConfig,
    store: &JsonFileStore,
) -> anyhow::Result<(FrameConfig, Vec<RawPhoto>)> {
    let frame_type =
        load_frame_type(store).map_err(|e| anyhow::anyhow!("Failed to read frame choice: {e}"))?;
    let photos = load_captured_photos(store)
        .map_err(|e| anyhow::anyhow!("Failed to read captured photos: {e}"))?;
    Ok((frame_for(config, frame_type), photos))
}
