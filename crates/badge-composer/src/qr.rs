//! QR code rendering

use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use qrcode::QrCode;

/// Encode `payload` and render it as a `size`×`size` grayscale image
///
/// The symbol is rendered one pixel per module with its quiet zone, then
/// scaled with nearest-neighbour sampling so it stays strictly black and
/// white.
pub fn render_qr(payload: &str, size: u32) -> Result<GrayImage> {
    let code = QrCode::new(payload.as_bytes())?;
    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(1, 1)
        .build();

    let size = size.max(1);
    Ok(imageops::resize(&symbol, size, size, FilterType::Nearest))
}
