pub mod error;
pub mod identity;
pub mod job;

pub use error::{Error, Result};
pub use identity::{IdentityRecord, FALLBACK_FILE_TOKEN};
pub use job::{JobRecord, JobSnapshot, JobStatus, JobStep};
