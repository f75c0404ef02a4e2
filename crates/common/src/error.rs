use crate::job::{JobStatus, JobStep};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job already exists: {0}")]
    DuplicateJob(String),

    #[error("Invalid step transition: {from} -> {to}")]
    InvalidTransition { from: JobStep, to: JobStep },

    #[error("Job already finalized with status: {0}")]
    AlreadyFinalized(JobStatus),
}

pub type Result<T> = std::result::Result<T, Error>;
