pub mod job_list;
pub mod stats;

pub use job_list::{FetchSpec, JobListState};
pub use stats::{StatsState, StatsView};
