//! Printer integration point

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// Sends a finished badge to a printer
#[async_trait]
pub trait Printer: Send + Sync {
    async fn print(&self, badge_path: &Path) -> anyhow::Result<()>;
}

/// Printer that only logs the badge it was handed
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPrinter;

#[async_trait]
impl Printer for NoopPrinter {
    async fn print(&self, badge_path: &Path) -> anyhow::Result<()> {
        info!("Print requested for {} (no printer attached)", badge_path.display());
        Ok(())
    }
}
