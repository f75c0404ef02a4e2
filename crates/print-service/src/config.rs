//! Configuration management for Print Service
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::worker::StageDelays;
use anyhow::{Context, Result};
use badge_composer::{ComposerConfig, DEFAULT_ORGANIZATION};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub api_host: String,

    /// API server port
    pub api_port: u16,

    /// Directory where finished badges are written
    pub output_dir: PathBuf,

    /// Optional badge background template
    pub template_path: Option<PathBuf>,

    /// Optional TrueType/OpenType font for badge text
    pub font_path: Option<PathBuf>,

    /// Base directory for file photo references
    pub photo_dir: PathBuf,

    /// Organization written into the vCard
    pub organization: String,

    /// Pacing delays between pipeline stages
    pub stage_delays: StageDelays,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let config = Config {
            api_host: env::var("BADGE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            api_port: env::var("BADGE_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Invalid BADGE_PORT")?,

            output_dir: env::var("BADGE_OUTPUT_DIR")
                .unwrap_or_else(|_| "./badge_outputs".to_string())
                .into(),

            template_path: optional_path(
                env::var("BADGE_TEMPLATE_PATH")
                    .unwrap_or_else(|_| "./static/img/badge_template.png".to_string()),
            ),

            font_path: env::var("BADGE_FONT_PATH").ok().and_then(optional_path),

            photo_dir: env::var("BADGE_PHOTO_DIR")
                .unwrap_or_else(|_| "./photos".to_string())
                .into(),

            organization: env::var("BADGE_ORGANIZATION")
                .unwrap_or_else(|_| DEFAULT_ORGANIZATION.to_string()),

            stage_delays: match env::var("BADGE_STAGE_DELAYS_MS") {
                Ok(value) => parse_stage_delays(&value).context("Invalid BADGE_STAGE_DELAYS_MS")?,
                Err(_) => StageDelays::default(),
            },
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            anyhow::bail!("BADGE_PORT must be greater than 0");
        }

        if self.organization.trim().is_empty() {
            anyhow::bail!("BADGE_ORGANIZATION must not be empty");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Composer settings derived from this configuration
    pub fn composer_config(&self) -> ComposerConfig {
        let mut composer = ComposerConfig::new(&self.output_dir)
            .with_organization(self.organization.clone());
        if let Some(template) = &self.template_path {
            composer = composer.with_template(template);
        }
        if let Some(font) = &self.font_path {
            composer = composer.with_font(font);
        }
        composer
    }

    /// Ensure output directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create badge output directory: {}",
                self.output_dir.display()
            )
        })?;

        // Badges still render on the plain background
        if let Some(template) = &self.template_path {
            if !template.exists() {
                tracing::warn!("Badge template does not exist: {}", template.display());
            }
        }

        if !self.photo_dir.exists() {
            tracing::warn!(
                "Photo directory does not exist: {}",
                self.photo_dir.display()
            );
        }

        Ok(())
    }
}

fn optional_path(value: String) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Parse `image_processing,composing,printing` delays in milliseconds
pub fn parse_stage_delays(value: &str) -> Result<StageDelays> {
    let millis = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u64>()
                .with_context(|| format!("not a millisecond count: {:?}", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    let [image_processing, composing, printing] = millis[..] else {
        anyhow::bail!("expected 3 comma-separated delays, got {}", millis.len());
    };

    Ok(StageDelays {
        image_processing: Duration::from_millis(image_processing),
        composing: Duration::from_millis(composing),
        printing: Duration::from_millis(printing),
    })
}
