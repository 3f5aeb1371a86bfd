//! Error types shared across Photobooth crates.

/// Top-level error type for Photobooth operations.
///
/// Session-state violations (`InvalidCount` through `NotReadyForReview`)
/// are always recoverable: the session is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum PhotoboothError {
    #[error("Invalid photo count {requested}: {message}")]
    InvalidCount { requested: usize, message: String },

    #[error("Photo target already reached ({captured} of {target}); delete a photo to take more")]
    AlreadySatisfied { captured: usize, target: usize },

    #[error("No active capture session")]
    NotActive,

    #[error("No pending photo to save or retake")]
    NoPendingPhoto,

    #[error("Photo index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Operation not allowed while a capture session is active")]
    SessionActive,

    #[error("A captured photo is waiting to be saved or retaken")]
    PendingPhotoExists,

    #[error("Not ready for review: {message}")]
    NotReadyForReview { message: String },

    #[error("Camera access error: {message}")]
    CameraAccess { message: String },

    #[error("Image load error: {message}")]
    ImageLoad { message: String },

    #[error("Invalid dimensions {width}x{height}")]
    Dimension { width: u32, height: u32 },

    #[error("Image encode error: {message}")]
    Encode { message: String },

    #[error("Delivery error: {message}")]
    Delivery { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PhotoboothError.
pub type PhotoboothResult<T> = Result<T, PhotoboothError>;

impl PhotoboothError {
    pub fn invalid_count(requested: usize, msg: impl Into<String>) -> Self {
        Self::InvalidCount {
            requested,
            message: msg.into(),
        }
    }

    pub fn camera_access(msg: impl Into<String>) -> Self {
        Self::CameraAccess {
            message: msg.into(),
        }
    }

    pub fn image_load(msg: impl Into<String>) -> Self {
        Self::ImageLoad {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    /// Whether this error is a session-state violation the user can fix by
    /// taking a different action (as opposed to an I/O or decode failure).
    pub fn is_session_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidCount { .. }
                | Self::AlreadySatisfied { .. }
                | Self::NotActive
                | Self::NoPendingPhoto
                | Self::IndexOutOfRange { .. }
                | Self::SessionActive
                | Self::PendingPhotoExists
                | Self::NotReadyForReview { .. }
        )
    }
}
