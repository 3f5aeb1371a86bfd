//! Photobooth CLI: choose a frame, capture photos, review, and export.
//!
//! Usage:
//!   photobooth choose <FRAME>     Pick landscape or portrait
//!   photobooth capture [OPTIONS]  Take photos until the target is reached
//!   photobooth delete <N>         Delete photo N
//!   photobooth reset              Delete every captured photo
//!   photobooth review             Check the photos and preview composites
//!   photobooth export [OPTIONS]   Write framed photos to disk
//!   photobooth info               Show the stored state

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use photobooth_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "photobooth",
    about = "Capture photos and frame them for download",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Choose the frame layout (clears captured photos)
    Choose {
        /// landscape or portrait
        frame: String,

        /// Frame artwork image to use for this layout
        #[arg(long)]
        artwork: Option<PathBuf>,
    },

    /// Capture photos until the target count is reached
    Capture {
        /// How many photos to take (rounded up for landscape pairs)
        #[arg(short, long)]
        count: Option<usize>,

        /// Replay stills from this directory instead of the test-pattern camera
        #[arg(short, long)]
        source: Option<PathBuf>,
    },

    /// Delete a captured photo (numbered from 1)
    Delete {
        /// Photo number
        number: usize,
    },

    /// Delete every captured photo
    Reset,

    /// Check the captured photos and preview each composite
    Review,

    /// Export framed photos
    Export {
        /// Export only the item containing this photo number
        #[arg(long)]
        only: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the stored frame choice and photos
    Info,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    photobooth_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Choose { frame, artwork } => commands::choose::run(config, frame, artwork),
        Commands::Capture { count, source } => commands::capture::run(&config, count, source).await,
        Commands::Delete { number } => commands::delete::run(&config, number),
        Commands::Reset => commands::reset::run(&config),
        Commands::Review => commands::review::run(&config),
        Commands::Export { only, output } => commands::export::run(&config, only, output).await,
        Commands::Info => commands::info::run(&config),
    }
}
