pub mod dto;
pub mod models;

// Re-export commonly used types
pub use models::{Frequency, Job, JobPage, JobStats, JobStatus, JobType, ScheduleType, StatusEvent};
