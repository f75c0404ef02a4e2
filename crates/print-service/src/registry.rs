//! In-memory job registry
//!
//! Holds every print job for the lifetime of the process. Each mutation
//! takes the write lock once and applies a complete transition, so readers
//! never observe a half-updated record. The lock is never held across an
//! await point.

use badgematic_common::{Error, JobRecord, JobSnapshot, JobStatus, JobStep, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Registry of print jobs keyed by job id
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobRecord>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a queued job; visible to `lookup` as soon as this returns
    pub fn create(&self, job_id: String) -> Result<()> {
        let mut jobs = self.write();
        if jobs.contains_key(&job_id) {
            return Err(Error::DuplicateJob(job_id));
        }

        info!("Queued print job: {}", job_id);
        jobs.insert(job_id.clone(), JobRecord::new(job_id));
        Ok(())
    }

    /// Move a job to a later pipeline step
    pub fn advance(&self, job_id: &str, step: JobStep) -> Result<()> {
        self.update(job_id, |job| job.advance(step))?;
        debug!("Job {} -> {}", job_id, step);
        Ok(())
    }

    /// Finalize a job as successful
    pub fn complete(&self, job_id: &str, badge_path: String) -> Result<()> {
        self.update(job_id, |job| job.complete(badge_path))?;
        info!("Print job completed: {}", job_id);
        Ok(())
    }

    /// Finalize a job as failed
    pub fn fail(&self, job_id: &str, error: String) -> Result<()> {
        self.update(job_id, |job| job.fail(error))?;
        info!("Print job failed: {}", job_id);
        Ok(())
    }

    /// Current snapshot of a job, or the idle snapshot when unknown
    pub fn lookup(&self, job_id: Option<&str>) -> JobSnapshot {
        job_id
            .and_then(|id| self.read().get(id).map(JobSnapshot::from))
            .unwrap_or_else(JobSnapshot::idle)
    }

    /// Job counts per status
    pub fn stats(&self) -> JobStats {
        let jobs = self.read();
        let mut stats = JobStats {
            total: jobs.len(),
            ..Default::default()
        };

        for job in jobs.values() {
            match job.status {
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Success => stats.success += 1,
                JobStatus::Error => stats.error += 1,
                JobStatus::Idle => {}
            }
        }

        stats
    }

    fn update<F>(&self, job_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut JobRecord) -> Result<()>,
    {
        let mut jobs = self.write();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| Error::JobNotFound(job_id.to_string()))?;
        apply(job)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, JobRecord>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, JobRecord>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Job statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total: usize,
    pub processing: usize,
    pub success: usize,
    pub error: usize,
}
