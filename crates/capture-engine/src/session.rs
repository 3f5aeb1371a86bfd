//! Capture session management.
//!
//! Every action a user can take while shooting is an explicit operation
//! with preconditions. A rejected operation returns an error and leaves
//! the session exactly as it was.

use std::fmt;

use photobooth_common::error::{PhotoboothError, PhotoboothResult};
use photobooth_frame_model::{PhotoConfig, RawPhoto};

use crate::camera::{CameraProvider, StreamHandle};

/// Why the session is currently idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdleReason {
    NotStarted,
    Ended,
    PhotoDeleted,
}

/// User-facing summary of where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing has happened yet.
    NotStarted,
    /// Camera engaged, waiting for photo `next` of `target`.
    Capturing { next: usize, target: usize },
    /// Target reached; camera released.
    AllTaken { target: usize },
    /// Session ended by the user before reaching the target.
    Ended { remaining: usize },
    /// A photo was deleted and a new session can fill the gap.
    CanResume { remaining: usize },
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::NotStarted => write!(f, "Not started"),
            SessionStatus::Capturing { next, target } => {
                write!(f, "Taking photo {next} of {target}")
            }
            SessionStatus::AllTaken { .. } => write!(f, "All photos taken"),
            SessionStatus::Ended { .. } => write!(f, "Session ended"),
            SessionStatus::CanResume { remaining } => write!(
                f,
                "Start a new session to take the remaining {remaining} photo(s)"
            ),
        }
    }
}

/// A photo capture session.
///
/// Owns the camera stream while active. The stream is released on
/// [`end`](Self::end), when [`save`](Self::save) reaches the target, on
/// [`reset`](Self::reset), and when the session is dropped.
pub struct CaptureSession {
    photo_config: PhotoConfig,
    target_count: usize,
    photos: Vec<RawPhoto>,
    pending: Option<RawPhoto>,
    camera: Box<dyn CameraProvider>,
    stream: Option<StreamHandle>,
    idle_reason: IdleReason,
}

impl CaptureSession {
    /// Create an idle session whose target is the smallest valid count.
    pub fn new(photo_config: PhotoConfig, camera: Box<dyn CameraProvider>) -> Self {
        Self {
            target_count: photo_config.required_multiple(),
            photo_config,
            photos: Vec::new(),
            pending: None,
            camera,
            stream: None,
            idle_reason: IdleReason::NotStarted,
        }
    }

    /// Seed the session with photos captured earlier.
    ///
    /// The target is raised when needed so it still covers every photo.
    pub fn restore(&mut self, photos: Vec<RawPhoto>) -> PhotoboothResult<()> {
        if self.is_active() {
            return Err(PhotoboothError::SessionActive);
        }
        let m = self.photo_config.required_multiple();
        self.target_count = self.target_count.max(photos.len().div_ceil(m) * m);
        self.photos = photos;
        self.pending = None;
        tracing::debug!(
            photos = self.photos.len(),
            target = self.target_count,
            "Session restored"
        );
        Ok(())
    }

    pub fn photo_config(&self) -> PhotoConfig {
        self.photo_config
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn photos(&self) -> &[RawPhoto] {
        &self.photos
    }

    pub fn pending(&self) -> Option<&RawPhoto> {
        self.pending.as_ref()
    }

    /// Whether the camera is engaged and captures are allowed.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether [`start`](Self::start) would be accepted.
    pub fn can_start(&self) -> bool {
        !self.is_active() && self.photos.len() < self.target_count
    }

    /// Photos still needed to reach the target.
    pub fn remaining(&self) -> usize {
        self.target_count.saturating_sub(self.photos.len())
    }

    pub fn status(&self) -> SessionStatus {
        if self.is_active() {
            return SessionStatus::Capturing {
                next: self.photos.len() + 1,
                target: self.target_count,
            };
        }
        if self.photos.len() >= self.target_count {
            return SessionStatus::AllTaken {
                target: self.target_count,
            };
        }
        let remaining = self.remaining();
        match self.idle_reason {
            IdleReason::NotStarted => SessionStatus::NotStarted,
            IdleReason::Ended => SessionStatus::Ended { remaining },
            IdleReason::PhotoDeleted => SessionStatus::CanResume { remaining },
        }
    }

    /// Set how many photos to take, rounded up to the pairing multiple.
    ///
    /// Returns the stored target.
    pub fn set_target_count(&mut self, requested: usize) -> PhotoboothResult<usize> {
        if self.is_active() {
            return Err(PhotoboothError::SessionActive);
        }
        let m = self.photo_config.required_multiple();
        if requested < m {
            return Err(PhotoboothError::invalid_count(
                requested,
                format!("at least {m} photo(s) required"),
            ));
        }
        let rounded = requested.div_ceil(m) * m;
        if rounded < self.photos.len() {
            return Err(PhotoboothError::invalid_count(
                requested,
                format!(
                    "{} photo(s) already captured; delete some first",
                    self.photos.len()
                ),
            ));
        }
        if rounded != requested {
            tracing::debug!(requested, rounded, "Rounded target up to pairing multiple");
        }
        self.target_count = rounded;
        Ok(rounded)
    }

    /// Engage the camera so photos can be taken.
    pub async fn start(&mut self) -> PhotoboothResult<()> {
        if self.is_active() {
            tracing::debug!("Session already active");
            return Ok(());
        }
        if self.photos.len() >= self.target_count {
            return Err(PhotoboothError::AlreadySatisfied {
                captured: self.photos.len(),
                target: self.target_count,
            });
        }

        let handle = match self.camera.acquire_stream().await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(camera = self.camera.name(), error = %e, "Camera unavailable");
                return Err(e);
            }
        };

        tracing::info!(
            camera = self.camera.name(),
            width = handle.width,
            height = handle.height,
            captured = self.photos.len(),
            target = self.target_count,
            "Capture session started"
        );
        self.stream = Some(handle);
        Ok(())
    }

    /// Stop the session, discarding any unsaved photo. Idempotent.
    pub fn end(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("Discarded pending photo");
        }
        if self.release_camera() {
            tracing::info!(captured = self.photos.len(), "Capture session ended");
        }
        self.idle_reason = IdleReason::Ended;
    }

    /// Take a still and hold it for a save/retake decision.
    pub async fn capture(&mut self) -> PhotoboothResult<&RawPhoto> {
        let Some(handle) = self.stream.clone() else {
            return Err(PhotoboothError::NotActive);
        };
        if self.pending.is_some() {
            return Err(PhotoboothError::PendingPhotoExists);
        }
        if self.photos.len() >= self.target_count {
            return Err(PhotoboothError::AlreadySatisfied {
                captured: self.photos.len(),
                target: self.target_count,
            });
        }

        let photo = self.camera.capture_still(&handle).await?;
        tracing::debug!(size_bytes = photo.size_bytes(), "Captured still");
        Ok(&*self.pending.insert(photo))
    }

    /// Keep the pending photo. Returns its index in the captured list.
    ///
    /// Reaching the target ends the session and releases the camera.
    pub fn save(&mut self) -> PhotoboothResult<usize> {
        let photo = self.pending.take().ok_or(PhotoboothError::NoPendingPhoto)?;
        self.photos.push(photo);
        let index = self.photos.len() - 1;

        tracing::info!(
            photo = index + 1,
            target = self.target_count,
            "Photo saved"
        );

        if self.photos.len() >= self.target_count {
            self.release_camera();
            tracing::info!(target = self.target_count, "All photos taken");
        }
        Ok(index)
    }

    /// Throw away the pending photo.
    pub fn retake(&mut self) -> PhotoboothResult<()> {
        self.pending
            .take()
            .map(|_| ())
            .ok_or(PhotoboothError::NoPendingPhoto)
    }

    /// Remove the photo at `index`; later photos shift down by one.
    pub fn delete_photo(&mut self, index: usize) -> PhotoboothResult<RawPhoto> {
        if index >= self.photos.len() {
            return Err(PhotoboothError::IndexOutOfRange {
                index,
                len: self.photos.len(),
            });
        }
        let removed = self.photos.remove(index);
        if !self.is_active() && self.photos.len() < self.target_count {
            self.idle_reason = IdleReason::PhotoDeleted;
        }
        tracing::info!(index, remaining = self.photos.len(), "Photo deleted");
        Ok(removed)
    }

    /// Drop every photo and stop the camera.
    pub fn reset(&mut self) {
        self.release_camera();
        self.photos.clear();
        self.pending = None;
        self.idle_reason = IdleReason::NotStarted;
        tracing::info!("Session reset");
    }

    /// Check the captured photos can move on to review and export.
    pub fn ready_for_review(&self) -> PhotoboothResult<()> {
        if self.photos.is_empty() {
            return Err(PhotoboothError::NotReadyForReview {
                message: "no photos captured yet".to_string(),
            });
        }
        if self.photo_config.pairing && self.photos.len() % 2 != 0 {
            return Err(PhotoboothError::NotReadyForReview {
                message: "landscape frames need an even number of photos".to_string(),
            });
        }
        Ok(())
    }

    /// Hand the captured photos over, ending the session.
    pub fn into_photos(mut self) -> Vec<RawPhoto> {
        self.release_camera();
        std::mem::take(&mut self.photos)
    }

    fn release_camera(&mut self) -> bool {
        match self.stream.take() {
            Some(handle) => {
                self.camera.release_stream(handle);
                true
            }
            None => false,
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.release_camera() {
            tracing::debug!("Camera released on teardown");
        }
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("camera", &self.camera.name())
            .field("target_count", &self.target_count)
            .field("photos", &self.photos.len())
            .field("pending", &self.pending.is_some())
            .field("active", &self.is_active())
            .finish()
    }
}
