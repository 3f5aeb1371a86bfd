//! Run a capture session.

use std::path::PathBuf;

use photobooth_capture_engine::{CameraProvider, CaptureSession, DirectoryCamera, SyntheticCamera};
use photobooth_common::config::AppConfig;
use photobooth_frame_model::{save_captured_photos, JsonFileStore};

use super::state::{load_frame_and_photos, open_store};

pub async fn run(
    config: &AppConfig,
    count: Option<usize>,
    source: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut store = open_store(config)?;
    let (frame, photos) = load_frame_and_photos(config, &store)?;

    let camera: Box<dyn CameraProvider> = match source {
        Some(dir) => Box::new(DirectoryCamera::new(dir)),
        None => Box::new(SyntheticCamera::new()),
    };

    let mut session = CaptureSession::new(frame.photo_config(), camera);
    session.restore(photos)?;
    if let Some(count) = count {
        let target = session.set_target_count(count)?;
        if target != count {
            println!("Rounded up to {target} photos so every photo has a partner");
        }
    }

    if !session.can_start() {
        println!("{}", session.status());
        return Ok(());
    }

    println!(
        "Capturing {} photo(s) for a {} frame",
        session.remaining(),
        frame.frame_type()
    );
    println!("Press Ctrl+C to stop early...");
    println!();

    session.start().await?;

    let interrupted = tokio::select! {
        result = capture_until_done(&mut session, &mut store) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        session.end();
        println!();
    }

    println!("{}", session.status());
    Ok(())
}

async fn capture_until_done(
    session: &mut CaptureSession,
    store: &mut JsonFileStore,
) -> anyhow::Result<()> {
    while session.is_active() {
        let size_kb = session.capture().await?.size_kb();
        let index = session.save()?;
        save_captured_photos(store, session.photos())
            .map_err(|e| anyhow::anyhow!("Failed to save photos: {e}"))?;
        println!(
            "  Saved photo {} of {} ({size_kb} KB)",
            index + 1,
            session.target_count()
        );
    }
    Ok(())
}
