use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Invalid photo data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Failed to decode photo: {0}")]
    Decode(#[source] image::ImageError),

    #[error("QR encoding error: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    #[error("Failed to encode badge: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComposeError {
    /// Whether the photo payload itself was unusable
    pub fn is_decode_error(&self) -> bool {
        matches!(self, ComposeError::InvalidDataUrl(_) | ComposeError::Decode(_))
    }
}

pub type Result<T> = std::result::Result<T, ComposeError>;
