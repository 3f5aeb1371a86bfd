//! Export framed photos.

use std::path::PathBuf;
use std::time::Duration;

use photobooth_common::config::AppConfig;
use photobooth_render_engine::{DirectorySink, ExportCoordinator};

use super::state::{load_frame_and_photos, open_store};

pub async fn run(
    config: &AppConfig,
    only: Option<usize>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let (frame, photos) = load_frame_and_photos(config, &store)?;
    if photos.is_empty() {
        return Err(anyhow::anyhow!("No photos to export; run `photobooth capture` first"));
    }

    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
    let mut sink = DirectorySink::new(&output_dir);
    let coordinator =
        ExportCoordinator::new().with_delay(Duration::from_millis(config.export.delay_ms));

    println!("Exporting to: {}", output_dir.display());

    if let Some(number) = only {
        if number == 0 {
            return Err(anyhow::anyhow!("Photo numbers start at 1"));
        }
        let filename = coordinator
            .export_one(&photos, number - 1, &frame, &mut sink)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to export photo {number}: {e}"))?;
        println!("  {filename}");
        return Ok(());
    }

    let report = coordinator.export_all(&photos, &frame, &mut sink).await;
    for filename in &report.delivered {
        println!("  {filename}");
    }
    for failure in &report.failed {
        println!("  {} FAILED: {}", failure.filename, failure.message);
    }

    if !report.is_complete() {
        return Err(anyhow::anyhow!(
            "{} of {} item(s) failed to export",
            report.failed.len(),
            report.failed.len() + report.delivered.len()
        ));
    }
    println!("Export complete: {} file(s)", report.delivered.len());
    Ok(())
}
