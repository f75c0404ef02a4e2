//! Print pipeline - composes and prints badges in the background

use crate::printer::Printer;
use crate::registry::JobRegistry;
use badge_composer::{ComposeError, Composer, PhotoInput};
use badgematic_common::{IdentityRecord, JobStep};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Pacing delays applied after each pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDelays {
    pub image_processing: Duration,
    pub composing: Duration,
    pub printing: Duration,
}

impl StageDelays {
    /// No pacing at all
    pub const fn none() -> Self {
        Self {
            image_processing: Duration::ZERO,
            composing: Duration::ZERO,
            printing: Duration::ZERO,
        }
    }
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            image_processing: Duration::from_millis(300),
            composing: Duration::from_millis(300),
            printing: Duration::from_millis(800),
        }
    }
}

/// Failure inside the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Tracker(#[from] badgematic_common::Error),

    #[error("Printer error: {0}")]
    Print(String),

    #[error("Pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Final result of a print job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { badge_path: PathBuf },
    Failed { error: String },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}

/// A job handed to the background pipeline
pub struct StartedJob {
    pub job_id: String,
    pub handle: JoinHandle<JobOutcome>,
}

/// Runs print jobs: image processing, badge composition, printing
#[derive(Clone)]
pub struct PrintPipeline {
    registry: Arc<JobRegistry>,
    composer: Arc<Composer>,
    printer: Arc<dyn Printer>,
    delays: StageDelays,
}

impl PrintPipeline {
    pub fn new(
        registry: Arc<JobRegistry>,
        composer: Arc<Composer>,
        printer: Arc<dyn Printer>,
    ) -> Self {
        Self {
            registry,
            composer,
            printer,
            delays: StageDelays::default(),
        }
    }

    pub fn with_delays(mut self, delays: StageDelays) -> Self {
        self.delays = delays;
        self
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn composer(&self) -> &Arc<Composer> {
        &self.composer
    }

    /// Register a queued job and spawn its pipeline
    ///
    /// The job is visible to pollers before this returns. Dropping the
    /// returned handle detaches the task; it still runs to completion.
    pub fn start_job(
        &self,
        identity: IdentityRecord,
        photo: PhotoInput,
    ) -> badgematic_common::Result<StartedJob> {
        let job_id = Uuid::new_v4().to_string();
        self.registry.create(job_id.clone())?;

        let pipeline = self.clone();
        let handle = tokio::spawn(pipeline.run(job_id.clone(), identity, photo));

        Ok(StartedJob { job_id, handle })
    }

    /// Drive one job to a terminal state
    ///
    /// Every failure is recorded on the job; nothing propagates to the caller.
    pub async fn run(self, job_id: String, identity: IdentityRecord, photo: PhotoInput) -> JobOutcome {
        info!("Processing print job: {}", job_id);

        let result = match self.execute(&job_id, identity, photo).await {
            Ok(badge_path) => self
                .registry
                .complete(&job_id, badge_path.to_string_lossy().to_string())
                .map(|()| badge_path)
                .map_err(PipelineError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(badge_path) => JobOutcome::Completed { badge_path },
            Err(e) => {
                let message = e.to_string();
                error!("Print job failed: {} - {}", job_id, message);
                if let Err(e) = self.registry.fail(&job_id, message.clone()) {
                    warn!("Failed to record failure for job {}: {}", job_id, e);
                }
                JobOutcome::Failed { error: message }
            }
        }
    }

    async fn execute(
        &self,
        job_id: &str,
        identity: IdentityRecord,
        photo: PhotoInput,
    ) -> Result<PathBuf, PipelineError> {
        self.registry.advance(job_id, JobStep::ImageProcessing)?;
        tokio::time::sleep(self.delays.image_processing).await;

        let composer = Arc::clone(&self.composer);
        let portrait =
            tokio::task::spawn_blocking(move || composer.prepare_portrait(&photo)).await??;

        self.registry.advance(job_id, JobStep::ComposingBadge)?;
        let composer = Arc::clone(&self.composer);
        let artifact =
            tokio::task::spawn_blocking(move || composer.compose_portrait(&identity, &portrait))
                .await??;
        tokio::time::sleep(self.delays.composing).await;

        self.registry.advance(job_id, JobStep::Printing)?;
        self.printer
            .print(&artifact.path)
            .await
            .map_err(|e| PipelineError::Print(format!("{:#}", e)))?;
        tokio::time::sleep(self.delays.printing).await;

        Ok(artifact.path)
    }
}
