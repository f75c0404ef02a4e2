//! Fixed badge geometry

use image::Rgba;

pub const CANVAS_WIDTH: u32 = 860;
pub const CANVAS_HEIGHT: u32 = 540;

/// Near-white canvas color (#F9F9F9)
pub const BACKGROUND: Rgba<u8> = Rgba([0xF9, 0xF9, 0xF9, 0xFF]);

pub const PHOTO_WIDTH: u32 = 300;
pub const PHOTO_HEIGHT: u32 = 375;
pub const PHOTO_OFFSET: (i64, i64) = (40, 80);

pub const QR_SIZE: u32 = 140;
pub const QR_MARGIN: u32 = 40;

/// Top-left corner of the QR code, anchored to the bottom-right of the canvas
pub const QR_OFFSET: (i64, i64) = (
    (CANVAS_WIDTH - QR_MARGIN - QR_SIZE) as i64,
    (CANVAS_HEIGHT - QR_MARGIN - QR_SIZE) as i64,
);

/// Placement and style of one line of badge text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSlot {
    pub x: i32,
    pub y: i32,
    pub size: f32,
    pub color: Rgba<u8>,
}

pub const NAME_SLOT: TextSlot = TextSlot {
    x: 370,
    y: 120,
    size: 42.0,
    color: Rgba([0x0E, 0x2A, 0x30, 0xFF]),
};

pub const TITLE_SLOT: TextSlot = TextSlot {
    x: 370,
    y: 180,
    size: 28.0,
    color: Rgba([0x02, 0x0F, 0x13, 0xFF]),
};

pub const EMPLOYEE_SLOT: TextSlot = TextSlot {
    x: 370,
    y: 220,
    size: 24.0,
    color: TITLE_SLOT.color,
};

/// Source region kept from a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Center crop of a `width`×`height` photo to the 4:5 portrait ratio
///
/// Photos wider than 4:5 lose equal left/right margins, taller photos lose
/// equal top/bottom margins. An exact 4:5 photo is returned whole.
pub fn portrait_crop(width: u32, height: u32) -> CropRect {
    let (w, h) = (u64::from(width), u64::from(height));

    if w * 5 > h * 4 {
        let new_w = ((h * 4) / 5).max(1) as u32;
        CropRect {
            x: (width - new_w) / 2,
            y: 0,
            width: new_w,
            height,
        }
    } else {
        let new_h = ((w * 5) / 4).clamp(1, h.max(1)) as u32;
        CropRect {
            x: 0,
            y: (height - new_h) / 2,
            width,
            height: new_h,
        }
    }
}
