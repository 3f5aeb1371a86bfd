//! Photobooth Capture Engine
//!
//! Drives a camera through a capture session: engage the stream, take a
//! still, keep or retake it, and stop once the target count is reached.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              CaptureSession              │
//! │  target ── photos[] ── pending photo     │
//! │        │                    ▲            │
//! │        ▼                    │            │
//! │  ┌──────────────────────────┴─────────┐  │
//! │  │  CameraProvider (one open stream)  │  │
//! │  │  Synthetic │ Directory │ ...       │  │
//! │  └────────────────────────────────────┘  │
//! └──────────────────────────────────────────┘
//! ```

pub mod camera;
pub mod session;

pub use camera::*;
pub use session::*;
