//! Photo payload decoding
//!
//! Photos arrive either as an encoded blob (typically from a
//! `data:<mime>;base64,<payload>` URL produced by a browser camera capture)
//! or as a file persisted earlier.

use crate::error::{ComposeError, Result};
use base64::{engine::general_purpose, Engine};
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::PathBuf;

/// A photo to be placed on a badge
///
/// Construction never fails; malformed payloads surface from [`decode`].
///
/// [`decode`]: PhotoInput::decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoInput {
    /// Encoded image bytes with an optional format tag
    Encoded {
        bytes: Vec<u8>,
        format: Option<ImageFormat>,
    },
    /// A `data:<mime>;base64,<payload>` URL
    DataUrl(String),
    /// Path to an encoded image on disk
    File(PathBuf),
}

impl PhotoInput {
    pub fn from_bytes(bytes: Vec<u8>, format: Option<ImageFormat>) -> Self {
        PhotoInput::Encoded { bytes, format }
    }

    pub fn from_data_url(url: impl Into<String>) -> Self {
        PhotoInput::DataUrl(url.into())
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        PhotoInput::File(path.into())
    }

    /// Decode into an RGB raster
    pub fn decode(&self) -> Result<RgbImage> {
        let image = match self {
            PhotoInput::Encoded { bytes, format } => decode_bytes(bytes, *format)?,
            PhotoInput::DataUrl(url) => {
                let (bytes, format) = parse_data_url(url)?;
                decode_bytes(&bytes, format)?
            }
            PhotoInput::File(path) => ImageReader::open(path)?
                .with_guessed_format()?
                .decode()
                .map_err(ComposeError::Decode)?,
        };

        Ok(image.to_rgb8())
    }
}

/// Split a `data:<mime>;base64,<payload>` URL into bytes and format tag
///
/// An unrecognized mime type yields no format tag, leaving the format to be
/// sniffed from the bytes.
pub fn parse_data_url(url: &str) -> Result<(Vec<u8>, Option<ImageFormat>)> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| ComposeError::InvalidDataUrl("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ComposeError::InvalidDataUrl("missing payload separator".to_string()))?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim();
    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(ComposeError::InvalidDataUrl(
            "only base64 payloads are supported".to_string(),
        ));
    }

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ComposeError::InvalidDataUrl(format!("bad base64 payload: {}", e)))?;

    Ok((bytes, ImageFormat::from_mime_type(mime)))
}

fn decode_bytes(bytes: &[u8], format: Option<ImageFormat>) -> Result<DynamicImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    match format {
        Some(format) => reader.set_format(format),
        None => reader = reader.with_guessed_format()?,
    }
    reader.decode().map_err(ComposeError::Decode)
}
