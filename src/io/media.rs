// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background image loading.
//!
//! Images are decoded to RGBA8 for display and kept as a `data:` URL so the
//! project document can embed them.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

/// A decoded background image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row major.
    pub pixels: Vec<u8>,
    /// The original encoded bytes as a `data:<mime>;base64,` URL.
    pub data_url: String,
}

/// Load an image file from disk.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let bytes = std::fs::read(path)?;
    let image = decode_bytes(&bytes)?;
    log::info!("Decoded {} ({}x{})", path.display(), image.width, image.height);
    Ok(image)
}

/// Decode encoded image bytes of any supported format.
pub fn decode_bytes(bytes: &[u8]) -> Result<LoadedImage> {
    let format = image::guess_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: rgba.into_raw(),
        data_url: encode_data_url(format.to_mime_type(), bytes),
    })
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its mime type and payload.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidDataUrl("missing payload separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| Error::InvalidDataUrl(format!("not base64 encoded: {}", header)))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::InvalidDataUrl(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}

/// Decode an embedded background image.
pub fn decode_data_url(url: &str) -> Result<LoadedImage> {
    let (mime, bytes) = parse_data_url(url)?;
    let image = decode_bytes(&bytes)?;
    log::debug!("Decoded embedded {} ({}x{})", mime, image.width, image.height);
    // keep the caller's url verbatim so export reproduces it
    Ok(LoadedImage {
        data_url: url.to_string(),
        ..image
    })
}
