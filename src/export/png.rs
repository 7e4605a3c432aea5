//! PNG encoding and decoding through Cairo.

use crate::error::OverlayError;
use cairo::ImageSurface;
use std::io::Cursor;

/// Encodes a surface as PNG bytes.
pub fn encode_png(surface: &ImageSurface) -> Result<Vec<u8>, OverlayError> {
    let mut buffer = Vec::new();
    surface
        .write_to_png(&mut buffer)
        .map_err(|err| OverlayError::Png(err.to_string()))?;
    log::debug!(
        "Encoded {}x{} surface as {} PNG bytes",
        surface.width(),
        surface.height(),
        buffer.len()
    );
    Ok(buffer)
}

/// Decodes PNG bytes into a surface.
pub fn decode_png(bytes: &[u8]) -> Result<ImageSurface, OverlayError> {
    let mut reader = Cursor::new(bytes);
    ImageSurface::create_from_png(&mut reader).map_err(|err| OverlayError::Png(err.to_string()))
}
