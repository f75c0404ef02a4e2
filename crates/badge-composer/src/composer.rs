//! Badge composition

use crate::error::{ComposeError, Result};
use crate::layout::{
    portrait_crop, BACKGROUND, CANVAS_HEIGHT, CANVAS_WIDTH, EMPLOYEE_SLOT, NAME_SLOT,
    PHOTO_HEIGHT, PHOTO_OFFSET, PHOTO_WIDTH, QR_OFFSET, QR_SIZE, TITLE_SLOT,
};
use crate::photo::PhotoInput;
use crate::qr::render_qr;
use crate::text::TextRenderer;
use badgematic_common::IdentityRecord;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Organization written into the vCard when none is configured
pub const DEFAULT_ORGANIZATION: &str = "YourOrg";

/// Composer configuration
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Directory receiving badge PNGs (created on demand)
    pub output_dir: PathBuf,

    /// Optional background template, stretched to the canvas
    pub template_path: Option<PathBuf>,

    /// Optional TrueType/OpenType font for badge text
    pub font_path: Option<PathBuf>,

    /// vCard `ORG` value
    pub organization: String,
}

impl ComposerConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            template_path: None,
            font_path: None,
            organization: DEFAULT_ORGANIZATION.to_string(),
        }
    }

    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }
}

/// A finished badge on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeArtifact {
    /// Absolute path of the PNG
    pub path: PathBuf,

    /// vCard text encoded in the QR code
    pub qr_payload: String,
}

/// Turns identity fields and a photo into a badge PNG
pub struct Composer {
    config: ComposerConfig,
    text: TextRenderer,
}

impl Composer {
    pub fn new(config: ComposerConfig) -> Self {
        let text = TextRenderer::load(config.font_path.as_deref());
        Self { config, text }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Decode a photo and fit it to the badge portrait frame
    pub fn prepare_portrait(&self, photo: &PhotoInput) -> Result<RgbImage> {
        let decoded = photo.decode()?;
        debug!(
            "Decoded photo {}x{}",
            decoded.width(),
            decoded.height()
        );
        Ok(fit_portrait(&decoded))
    }

    /// Compose and persist a badge
    ///
    /// The photo is decoded before anything touches the file system, so an
    /// undecodable photo never leaves an artifact behind.
    pub fn compose(&self, identity: &IdentityRecord, photo: &PhotoInput) -> Result<BadgeArtifact> {
        let portrait = self.prepare_portrait(photo)?;
        self.compose_portrait(identity, &portrait)
    }

    /// Compose and persist a badge from an already prepared portrait
    pub fn compose_portrait(
        &self,
        identity: &IdentityRecord,
        portrait: &RgbImage,
    ) -> Result<BadgeArtifact> {
        let mut canvas = self.base_canvas();

        let portrait = if portrait.dimensions() == (PHOTO_WIDTH, PHOTO_HEIGHT) {
            DynamicImage::ImageRgb8(portrait.clone()).to_rgba8()
        } else {
            DynamicImage::ImageRgb8(fit_portrait(portrait)).to_rgba8()
        };
        imageops::overlay(&mut canvas, &portrait, PHOTO_OFFSET.0, PHOTO_OFFSET.1);

        let qr_payload = identity.vcard(&self.config.organization);
        let qr = DynamicImage::ImageLuma8(render_qr(&qr_payload, QR_SIZE)?).to_rgba8();
        imageops::overlay(&mut canvas, &qr, QR_OFFSET.0, QR_OFFSET.1);

        let employee_label = identity.employee_label();
        for (text, slot) in [
            (identity.name.as_str(), NAME_SLOT),
            (identity.title.as_str(), TITLE_SLOT),
            (employee_label.as_str(), EMPLOYEE_SLOT),
        ] {
            self.text
                .draw(&mut canvas, text, slot.x, slot.y, slot.size, slot.color);
        }

        let path = self.persist(canvas, &identity.artifact_file_name())?;
        info!("Badge written to {}", path.display());

        Ok(BadgeArtifact { path, qr_payload })
    }

    fn base_canvas(&self) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);

        if let Some(template) = self.config.template_path.as_deref().and_then(load_template) {
            imageops::overlay(&mut canvas, &template, 0, 0);
        }

        canvas
    }

    fn persist(&self, canvas: RgbaImage, file_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join(file_name);
        DynamicImage::ImageRgba8(canvas)
            .to_rgb8()
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| match e {
                ImageError::IoError(io) => ComposeError::Io(io),
                other => ComposeError::Encode(other),
            })?;

        Ok(std::fs::canonicalize(&path)?)
    }
}

/// Center-crop to 4:5 and resize to the portrait frame
pub fn fit_portrait(photo: &RgbImage) -> RgbImage {
    let crop = portrait_crop(photo.width(), photo.height());
    let cropped = imageops::crop_imm(photo, crop.x, crop.y, crop.width, crop.height).to_image();
    imageops::resize(&cropped, PHOTO_WIDTH, PHOTO_HEIGHT, FilterType::CatmullRom)
}

fn load_template(path: &Path) -> Option<RgbaImage> {
    if !path.is_file() {
        debug!("Badge template not found at {}, using plain background", path.display());
        return None;
    }

    match image::open(path) {
        Ok(template) => Some(imageops::resize(
            &template.to_rgba8(),
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            FilterType::Triangle,
        )),
        Err(e) => {
            warn!(
                "Failed to read badge template {}, using plain background: {}",
                path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};
    use std::io::Cursor;

    fn ada() -> IdentityRecord {
        IdentityRecord {
            name: "Ada Lovelace".to_string(),
            employee_number: "1001".to_string(),
            title: "Engineer".to_string(),
            phone: "555-0100".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn encoded_photo(width: u32, height: u32, format: ImageFormat) -> PhotoInput {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        PhotoInput::from_bytes(bytes, Some(format))
    }

    fn solid_png(width: u32, height: u32, color: Rgb<u8>) -> PhotoInput {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        PhotoInput::from_bytes(bytes, Some(ImageFormat::Png))
    }

    fn png_files(dir: &Path) -> Vec<PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[test]
    fn test_compose_example_badge() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path().join("out")));

        let artifact = composer
            .compose(&ada(), &encoded_photo(640, 480, ImageFormat::Jpeg))
            .unwrap();

        assert!(artifact.path.is_absolute());
        assert!(artifact.path.exists());
        assert_eq!(artifact.path.file_name().unwrap(), "1001_badge.png");
        assert!(artifact.qr_payload.starts_with("BEGIN:VCARD"));
        assert!(artifact.qr_payload.contains("N:Ada Lovelace"));

        let badge = image::open(&artifact.path).unwrap();
        assert_eq!((badge.width(), badge.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert!(!badge.color().has_alpha());
    }

    #[test]
    fn test_qr_region_decodes_to_vcard() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path()));

        let artifact = composer
            .compose(&ada(), &encoded_photo(640, 480, ImageFormat::Jpeg))
            .unwrap();

        let badge = image::open(&artifact.path).unwrap().to_luma8();
        let region = imageops::crop_imm(
            &badge,
            QR_OFFSET.0 as u32,
            QR_OFFSET.1 as u32,
            QR_SIZE,
            QR_SIZE,
        )
        .to_image();
        let upscaled = imageops::resize(&region, QR_SIZE * 4, QR_SIZE * 4, FilterType::Nearest);

        let mut prepared = rqrr::PreparedImage::prepare(upscaled);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        let (_, text) = grids[0].decode().unwrap();

        assert!(text.starts_with("BEGIN:VCARD"));
        assert!(text.contains("N:Ada Lovelace"));
        assert_eq!(text, artifact.qr_payload);
    }

    #[test]
    fn test_photo_and_background_placement() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path()));

        let artifact = composer
            .compose(&ada(), &solid_png(500, 500, Rgb([200, 30, 40])))
            .unwrap();
        let badge = image::open(&artifact.path).unwrap().to_rgb8();

        assert_eq!(badge.get_pixel(5, 5), &Rgb([0xF9, 0xF9, 0xF9]));
        assert_eq!(badge.get_pixel(40 + 150, 80 + 187), &Rgb([200, 30, 40]));
        assert_eq!(badge.get_pixel(39, 80 + 187), &Rgb([0xF9, 0xF9, 0xF9]));
        assert_eq!(badge.get_pixel(40 + 300, 80 + 187), &Rgb([0xF9, 0xF9, 0xF9]));
    }

    #[test]
    fn test_name_text_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path()));

        let artifact = composer
            .compose(&ada(), &solid_png(40, 50, Rgb([0, 0, 0])))
            .unwrap();
        let badge = image::open(&artifact.path).unwrap().to_rgb8();

        let name_ink = Rgb([0x0E, 0x2A, 0x30]);
        let inked = (370..850)
            .flat_map(|x| (120..170).map(move |y| (x, y)))
            .filter(|(x, y)| badge.get_pixel(*x, *y) == &name_ink)
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn test_empty_employee_number_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path()));
        let identity = IdentityRecord {
            employee_number: String::new(),
            ..ada()
        };

        let artifact = composer
            .compose(&identity, &encoded_photo(100, 100, ImageFormat::Png))
            .unwrap();
        assert_eq!(artifact.path.file_name().unwrap(), "badge_badge.png");
    }

    #[test]
    fn test_same_employee_number_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path()));

        let first = composer
            .compose(&ada(), &solid_png(80, 100, Rgb([255, 0, 0])))
            .unwrap();
        let second = composer
            .compose(&ada(), &solid_png(80, 100, Rgb([0, 0, 255])))
            .unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(png_files(dir.path()).len(), 1);

        let badge = image::open(&second.path).unwrap().to_rgb8();
        assert_eq!(badge.get_pixel(190, 267), &Rgb([0, 0, 255]));
    }

    #[test]
    fn test_distinct_employee_numbers_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let composer = Composer::new(ComposerConfig::new(dir.path()));
        let grace = IdentityRecord {
            name: "Grace Hopper".to_string(),
            employee_number: "1002".to_string(),
            ..ada()
        };

        let a = composer.compose(&ada(), &encoded_photo(50, 50, ImageFormat::Png)).unwrap();
        let b = composer.compose(&grace, &encoded_photo(50, 50, ImageFormat::Png)).unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(png_files(dir.path()).len(), 2);
    }

    #[test]
    fn test_undecodable_photo_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let composer = Composer::new(ComposerConfig::new(&out));

        let photo = PhotoInput::from_bytes(b"garbage".to_vec(), Some(ImageFormat::Jpeg));
        let err = composer.compose(&ada(), &photo).unwrap_err();

        assert!(err.is_decode_error());
        assert!(png_files(&out).is_empty());
    }

    #[test]
    fn test_missing_template_uses_background() {
        let dir = tempfile::tempdir().unwrap();
        let config = ComposerConfig::new(dir.path()).with_template(dir.path().join("missing.png"));
        let composer = Composer::new(config);

        let artifact = composer
            .compose(&ada(), &encoded_photo(64, 80, ImageFormat::Png))
            .unwrap();
        let badge = image::open(&artifact.path).unwrap().to_rgb8();
        assert_eq!(badge.get_pixel(5, 5), &Rgb([0xF9, 0xF9, 0xF9]));
    }

    #[test]
    fn test_template_is_stretched_over_background() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.png");
        RgbaImage::from_pixel(43, 27, Rgba([20, 90, 160, 255]))
            .save(&template_path)
            .unwrap();

        let config = ComposerConfig::new(dir.path().join("out")).with_template(&template_path);
        let artifact = Composer::new(config)
            .compose(&ada(), &encoded_photo(64, 80, ImageFormat::Png))
            .unwrap();

        let badge = image::open(&artifact.path).unwrap().to_rgb8();
        assert_eq!(badge.get_pixel(5, 5), &Rgb([20, 90, 160]));
        assert_eq!(badge.get_pixel(855, 535), &Rgb([20, 90, 160]));
    }

    #[test]
    fn test_corrupt_template_uses_background() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.png");
        std::fs::write(&template_path, b"not a png").unwrap();

        let config = ComposerConfig::new(dir.path().join("out")).with_template(&template_path);
        let artifact = Composer::new(config)
            .compose(&ada(), &encoded_photo(64, 80, ImageFormat::Png))
            .unwrap();

        let badge = image::open(&artifact.path).unwrap().to_rgb8();
        assert_eq!(badge.get_pixel(5, 5), &Rgb([0xF9, 0xF9, 0xF9]));
    }

    #[test]
    fn test_custom_organization() {
        let dir = tempfile::tempdir().unwrap();
        let config = ComposerConfig::new(dir.path()).with_organization("Analytical Engines");

        let artifact = Composer::new(config)
            .compose(&ada(), &encoded_photo(64, 80, ImageFormat::Png))
            .unwrap();
        assert!(artifact.qr_payload.contains("\nORG:Analytical Engines\n"));
    }

    #[test]
    fn test_fit_portrait_dimensions() {
        let wide = RgbImage::new(1920, 1080);
        let tall = RgbImage::new(300, 900);

        assert_eq!(fit_portrait(&wide).dimensions(), (PHOTO_WIDTH, PHOTO_HEIGHT));
        assert_eq!(fit_portrait(&tall).dimensions(), (PHOTO_WIDTH, PHOTO_HEIGHT));
    }
}
