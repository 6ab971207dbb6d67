pub mod registry;
pub mod service;
pub mod types;

pub use registry::{CancellationToken, JobRegistry};
pub use service::{JobHandle, JobRequest, JobService};
pub use types::{Job, JobMetadata, JobStage, JobStatus, JobStatusView, JobUpdate};
