// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the annotation engine.
//!
//! Placement rejections are not errors; see [`crate::models::Placement`].

/// Errors surfaced by document import, image decoding and settings loading.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed project document: {0}")]
    ImportMalformed(String),
    #[error("failed to decode image: {0}")]
    ImageDecodeFailed(#[from] image::ImageError),
    #[error("invalid image data url: {0}")]
    InvalidDataUrl(String),
    #[error("unsupported file extension: {0:?}")]
    UnsupportedFormat(Option<String>),
    #[error("invalid settings file: {0}")]
    Settings(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ImportMalformed(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ImportMalformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
