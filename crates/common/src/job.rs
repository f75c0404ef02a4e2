//! Print job state machine
//!
//! A job starts as `processing`/`queued`, walks forward through the
//! pipeline steps and ends either `success`/`done` or `error`/`failed`.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// No job is known for the requested identifier
    Idle,
    /// Job is queued or running
    Processing,
    /// Badge composed and printed
    Success,
    /// Pipeline failed
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Processing => "processing",
            JobStatus::Success => "success",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline step marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStep {
    Idle,
    Queued,
    ImageProcessing,
    ComposingBadge,
    Printing,
    Done,
    Failed,
}

impl JobStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStep::Idle => "idle",
            JobStep::Queued => "queued",
            JobStep::ImageProcessing => "image_processing",
            JobStep::ComposingBadge => "composing_badge",
            JobStep::Printing => "printing",
            JobStep::Done => "done",
            JobStep::Failed => "failed",
        }
    }

    /// Whether the step ends the pipeline
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStep::Done | JobStep::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStep::Idle => 0,
            JobStep::Queued => 1,
            JobStep::ImageProcessing => 2,
            JobStep::ComposingBadge => 3,
            JobStep::Printing => 4,
            JobStep::Done | JobStep::Failed => 5,
        }
    }
}

impl fmt::Display for JobStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked badge print job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique job identifier
    pub job_id: String,

    /// Current status
    pub status: JobStatus,

    /// Current pipeline step
    pub step: JobStep,

    /// Absolute path of the finished badge (success only)
    pub badge_path: Option<String>,

    /// Error message (error only)
    pub error: Option<String>,

    /// When the job was created
    pub created_at: DateTime<Utc>,

    /// When the job last changed
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a queued job
    pub fn new(job_id: String) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            status: JobStatus::Processing,
            step: JobStep::Queued,
            badge_path: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to a later, non-terminal step
    pub fn advance(&mut self, step: JobStep) -> Result<()> {
        self.ensure_processing()?;

        if step.is_terminal() || step.rank() <= self.step.rank() {
            return Err(Error::InvalidTransition {
                from: self.step,
                to: step,
            });
        }

        self.step = step;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Finish successfully; only valid once the printing step was reached
    pub fn complete(&mut self, badge_path: String) -> Result<()> {
        self.ensure_processing()?;

        if self.step != JobStep::Printing {
            return Err(Error::InvalidTransition {
                from: self.step,
                to: JobStep::Done,
            });
        }

        self.status = JobStatus::Success;
        self.step = JobStep::Done;
        self.badge_path = Some(badge_path);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Finish with an error from whatever step is current
    pub fn fail(&mut self, error: String) -> Result<()> {
        self.ensure_processing()?;

        self.status = JobStatus::Error;
        self.step = JobStep::Failed;
        self.error = Some(error);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.status != JobStatus::Processing
    }

    fn ensure_processing(&self) -> Result<()> {
        if self.is_finished() {
            return Err(Error::AlreadyFinalized(self.status));
        }
        Ok(())
    }
}

/// Point-in-time view of a job as returned to pollers
///
/// The shape is the same for every state; absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub step: JobStep,
    pub badge_path: Option<String>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    /// Snapshot reported for unknown or absent job identifiers
    pub fn idle() -> Self {
        Self {
            job_id: None,
            status: JobStatus::Idle,
            step: JobStep::Idle,
            badge_path: None,
            error: None,
            updated_at: None,
        }
    }
}

impl From<&JobRecord> for JobSnapshot {
    fn from(record: &JobRecord) -> Self {
        Self {
            job_id: Some(record.job_id.clone()),
            status: record.status,
            step: record.step,
            badge_path: record.badge_path.clone(),
            error: record.error.clone(),
            updated_at: Some(record.updated_at),
        }
    }
}
