//! Photobooth Render Engine
//!
//! Turns captured photos into framed output images and hands them to a
//! delivery sink.
//!
//! # Pipeline Architecture
//!
//! ```text
//! photos[] ──┬── plan_export ── Framed / Pair / Original
//!            │                        │
//! frame ─────┴── load_artwork ──┐     │
//!                               ▼     ▼
//!                          Compositor (cover-fit | stretched pair)
//!                                     │
//!                                     ├── PNG encode
//!                                     ▼
//!                               DeliverySink
//! ```

pub mod artwork;
pub mod compositor;
pub mod export;

pub use compositor::*;
pub use export::*;
