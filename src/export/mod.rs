//! Saving composited drawings.
//!
//! The engine hands out a Cairo surface from
//! [`crate::input::OverlayState::export_image`]; this module turns it into PNG
//! bytes and writes them where the user configured.

pub mod file;
pub mod png;

pub use file::{FileSaveConfig, expand_tilde, save_png, write_png};
pub use png::{decode_png, encode_png};
