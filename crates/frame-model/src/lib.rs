//! Photobooth Frame Model
//!
//! Defines the core data contracts shared by capture and rendering:
//! - **Frame:** Orientation, pairing rules, output canvas size, and artwork
//! - **Photo:** Raw captured stills, addressed by their position in a list
//! - **Store:** The key-value state that survives between photobooth steps
//!
//! This crate does no image decoding; photos are carried as encoded bytes.

pub mod error;
pub mod frame;
pub mod photo;
pub mod store;

pub use error::*;
pub use frame::*;
pub use photo::*;
pub use store::*;
