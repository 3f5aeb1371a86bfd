//! Persisted photobooth state.
//!
//! Choosing a frame, capturing, and reviewing are separate steps; the state
//! handed between them lives in a [`ConfigStore`]. The store is injected, so
//! the core never reaches for a process-wide singleton.
//!
//! Keys and their value shapes:
//!
//! | Key | Value |
//! |---|---|
//! | `frameType` | `"landscape"` or `"portrait"` |
//! | `photoConfig` | `{"pairing": bool, "photosPerPair": int}` |
//! | `capturedPhotos` | array of base64 `data:` URLs, in capture order |

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ModelError;
use crate::frame::{FrameType, PhotoConfig};
use crate::photo::RawPhoto;

pub const KEY_FRAME_TYPE: &str = "frameType";
pub const KEY_PHOTO_CONFIG: &str = "photoConfig";
pub const KEY_CAPTURED_PHOTOS: &str = "capturedPhotos";

/// Key-value store that survives between photobooth steps.
pub trait ConfigStore {
    /// Read a value, `None` when the key was never set.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: Value) -> Result<(), ModelError>;

    /// Delete a key. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), ModelError>;
}

/// In-memory store, used by tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ModelError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file. Every write is flushed to disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ModelError::IoError {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&content).map_err(|e| ModelError::ParseError {
                path: path.clone(),
                source: e,
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), ModelError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json =
            serde_json::to_string_pretty(&self.values).map_err(|e| ModelError::ParseError {
                path: self.path.clone(),
                source: e,
            })?;
        std::fs::write(&self.path, json).map_err(|e| ModelError::IoError {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), ModelError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), ModelError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Stored frame type, portrait when never chosen.
pub fn load_frame_type(store: &dyn ConfigStore) -> Result<FrameType, ModelError> {
    match store.get(KEY_FRAME_TYPE) {
        None => Ok(FrameType::default()),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(ModelError::invalid(
            KEY_FRAME_TYPE,
            format!("expected a string, found {other}"),
        )),
    }
}

/// Stored photo config, portrait rules when never chosen.
pub fn load_photo_config(store: &dyn ConfigStore) -> Result<PhotoConfig, ModelError> {
    match store.get(KEY_PHOTO_CONFIG) {
        None => Ok(PhotoConfig::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| ModelError::invalid(KEY_PHOTO_CONFIG, e.to_string())),
    }
}

pub fn save_photo_config(
    store: &mut dyn ConfigStore,
    config: &PhotoConfig,
) -> Result<(), ModelError> {
    let value = serde_json::to_value(config)
        .map_err(|e| ModelError::invalid(KEY_PHOTO_CONFIG, e.to_string()))?;
    store.set(KEY_PHOTO_CONFIG, value)
}

/// Record a frame choice: the frame type plus the photo rules it implies.
pub fn save_frame_selection(
    store: &mut dyn ConfigStore,
    frame_type: FrameType,
) -> Result<(), ModelError> {
    store.set(KEY_FRAME_TYPE, Value::String(frame_type.as_str().to_string()))?;
    save_photo_config(store, &PhotoConfig::for_frame_type(frame_type))
}

/// Captured photos in order; empty when none were saved.
pub fn load_captured_photos(store: &dyn ConfigStore) -> Result<Vec<RawPhoto>, ModelError> {
    let Some(value) = store.get(KEY_CAPTURED_PHOTOS) else {
        return Ok(Vec::new());
    };
    let urls: Vec<String> = serde_json::from_value(value)
        .map_err(|e| ModelError::invalid(KEY_CAPTURED_PHOTOS, e.to_string()))?;
    urls.iter().map(|url| RawPhoto::from_data_url(url)).collect()
}

pub fn save_captured_photos(
    store: &mut dyn ConfigStore,
    photos: &[RawPhoto],
) -> Result<(), ModelError> {
    let urls = photos
        .iter()
        .map(|p| Value::String(p.to_data_url()))
        .collect();
    store.set(KEY_CAPTURED_PHOTOS, Value::Array(urls))
}

pub fn clear_captured_photos(store: &mut dyn ConfigStore) -> Result<(), ModelError> {
    store.remove(KEY_CAPTURED_PHOTOS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_photos() -> Vec<RawPhoto> {
        vec![
            RawPhoto::from_bytes(vec![1u8, 2, 3]),
            RawPhoto::from_bytes(vec![4u8, 5, 6, 7]),
        ]
    }

    #[test]
    fn test_defaults_when_empty() {
        let store = MemoryStore::new();
        assert_eq!(load_frame_type(&store).unwrap(), FrameType::Portrait);
        assert_eq!(load_photo_config(&store).unwrap(), PhotoConfig::default());
        assert!(load_captured_photos(&store).unwrap().is_empty());
    }

    #[test]
    fn test_frame_selection_writes_both_keys() {
        let mut store = MemoryStore::new();
        save_frame_selection(&mut store, FrameType::Landscape).unwrap();

        assert_eq!(
            store.get(KEY_FRAME_TYPE),
            Some(Value::String("landscape".to_string()))
        );
        let config = load_photo_config(&store).unwrap();
        assert!(config.pairing);
        assert_eq!(config.photos_per_pair, 2);
    }

    #[test]
    fn test_captured_photos_keep_order() {
        let mut store = MemoryStore::new();
        save_captured_photos(&mut store, &sample_photos()).unwrap();

        let loaded = load_captured_photos(&store).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].bytes(), &[1, 2, 3]);
        assert_eq!(loaded[1].bytes(), &[4, 5, 6, 7]);

        clear_captured_photos(&mut store).unwrap();
        assert!(load_captured_photos(&store).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_value_shapes_are_rejected() {
        let mut store = MemoryStore::new();
        store.set(KEY_FRAME_TYPE, Value::Bool(true)).unwrap();
        assert!(load_frame_type(&store).is_err());

        store
            .set(KEY_PHOTO_CONFIG, Value::String("pairs".into()))
            .unwrap();
        assert!(load_photo_config(&store).is_err());

        store
            .set(KEY_CAPTURED_PHOTOS, serde_json::json!(["not-a-data-url"]))
            .unwrap();
        assert!(load_captured_photos(&store).is_err());
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("state.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            save_frame_selection(&mut store, FrameType::Landscape).unwrap();
            save_captured_photos(&mut store, &sample_photos()).unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(load_frame_type(&reopened).unwrap(), FrameType::Landscape);
        assert_eq!(load_captured_photos(&reopened).unwrap().len(), 2);
    }

    #[test]
    fn test_json_file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, ModelError::ParseError { .. }));
    }
}
