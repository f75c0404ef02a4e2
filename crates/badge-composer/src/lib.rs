//! Badge Composer
//!
//! Renders a printable 860×540 identity badge from an [`IdentityRecord`]
//! and a photo: the photo is center-cropped to a 4:5 portrait, a vCard QR
//! code is anchored bottom-right and the name, title and employee number are
//! drawn beside the portrait. The result is written as
//! `<employee_number>_badge.png` in the configured output directory.
//!
//! [`IdentityRecord`]: badgematic_common::IdentityRecord

pub mod composer;
pub mod error;
pub mod layout;
pub mod photo;
pub mod qr;
pub mod text;

pub use composer::{fit_portrait, BadgeArtifact, Composer, ComposerConfig, DEFAULT_ORGANIZATION};
pub use error::{ComposeError, Result};
pub use photo::PhotoInput;
