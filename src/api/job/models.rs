use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job status enum representing the state of a job
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Query-string value for the list endpoint filter
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Human-readable label for table cells
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }
}

/// Kind of work a job performs
///
/// The service may grow new types; `Unknown` keeps older clients decoding.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    SendEmail,
    FileUpload,
    #[serde(other)]
    Unknown,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::SendEmail => "send_email",
            JobType::FileUpload => "file_upload",
            JobType::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobType::SendEmail => "Send Email",
            JobType::FileUpload => "File Upload",
            JobType::Unknown => "Unknown",
        }
    }
}

/// When/how often a job runs
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Immediate,
    Scheduled,
    Interval,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Immediate => "immediate",
            ScheduleType::Scheduled => "scheduled",
            ScheduleType::Interval => "interval",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScheduleType::Immediate => "Immediate",
            ScheduleType::Scheduled => "Scheduled",
            ScheduleType::Interval => "Interval",
        }
    }

    /// A scheduled_time is required for anything that is not immediate
    pub fn requires_time(&self) -> bool {
        !matches!(self, ScheduleType::Immediate)
    }
}

/// Recurrence for interval jobs; meaningful only when schedule_type = interval
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Hourly => "Hourly",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

/// A job as the service reports it
///
/// The client never invents one of these: instances come from a fetch or a
/// push-event merge into a fetched copy. Fields the service omits for some
/// job types default to `None`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Job {
    pub id: i64,
    pub job_type: JobType,
    pub status: JobStatus,
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub retries: i32,
    #[serde(default)]
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Whether the client may offer editing for this job
    ///
    /// Editable while pending, or while scheduled/interval and not yet
    /// completed. The server enforces the same rule on PATCH.
    pub fn is_editable(&self) -> bool {
        let schedule_ok = matches!(
            self.schedule_type,
            ScheduleType::Scheduled | ScheduleType::Interval
        );
        (self.status == JobStatus::Pending || schedule_ok)
            && self.status != JobStatus::Completed
    }

    /// Retry is only offered for failed jobs
    pub fn is_retryable(&self) -> bool {
        self.status == JobStatus::Failed
    }

    /// Whether the job has a produced artifact to download
    pub fn has_artifact(&self) -> bool {
        self.file_url.is_some()
    }

    /// File name recorded in the upload parameters, if any
    pub fn file_name(&self) -> Option<&str> {
        self.parameters
            .as_ref()
            .and_then(|p| p.get("file_name"))
            .and_then(|v| v.as_str())
    }
}

/// One fetched slice of the job list, bound to a filter and page number
///
/// `next`/`previous` are opaque cursor links; only their presence matters
/// to the client.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct JobPage {
    #[serde(default)]
    pub results: Vec<Job>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// Aggregate job counts from the stats endpoint
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub total: u64,
}

/// A status-push notification for a single job
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatusEvent {
    pub id: i64,
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus, schedule_type: ScheduleType) -> Job {
        Job {
            id: 1,
            job_type: JobType::SendEmail,
            status,
            schedule_type,
            scheduled_time: None,
            frequency: None,
            parameters: None,
            result: None,
            file_url: None,
            retries: 0,
            max_retries: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&JobType::SendEmail).unwrap(),
            "\"send_email\""
        );
        assert_eq!(
            serde_json::from_str::<JobStatus>("\"running\"").unwrap(),
            JobStatus::Running
        );
        assert_eq!(
            serde_json::from_str::<ScheduleType>("\"interval\"").unwrap(),
            ScheduleType::Interval
        );
    }

    #[test]
    fn unknown_job_type_still_decodes() {
        let parsed: JobType = serde_json::from_str("\"generate_report\"").unwrap();
        assert_eq!(parsed, JobType::Unknown);
    }

    #[test]
    fn sparse_job_payload_decodes_with_defaults() {
        let raw = r#"{
            "id": 7,
            "job_type": "file_upload",
            "status": "pending",
            "schedule_type": "immediate",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.id, 7);
        assert!(job.scheduled_time.is_none());
        assert!(job.result.is_none());
        assert_eq!(job.retries, 0);
    }

    #[test]
    fn pending_jobs_are_editable() {
        assert!(job(JobStatus::Pending, ScheduleType::Immediate).is_editable());
        assert!(job(JobStatus::Pending, ScheduleType::Scheduled).is_editable());
    }

    #[test]
    fn scheduled_running_job_is_editable_but_completed_is_not() {
        assert!(job(JobStatus::Running, ScheduleType::Interval).is_editable());
        assert!(!job(JobStatus::Completed, ScheduleType::Interval).is_editable());
    }

    #[test]
    fn immediate_non_pending_job_is_not_editable() {
        assert!(!job(JobStatus::Running, ScheduleType::Immediate).is_editable());
        assert!(!job(JobStatus::Failed, ScheduleType::Immediate).is_editable());
    }

    #[test]
    fn only_failed_jobs_are_retryable() {
        assert!(job(JobStatus::Failed, ScheduleType::Immediate).is_retryable());
        assert!(!job(JobStatus::Pending, ScheduleType::Immediate).is_retryable());
        assert!(!job(JobStatus::Completed, ScheduleType::Immediate).is_retryable());
    }

    #[test]
    fn status_event_decodes_without_result() {
        let ev: StatusEvent = serde_json::from_str(r#"{"id": 3, "status": "completed"}"#).unwrap();
        assert_eq!(ev.id, 3);
        assert_eq!(ev.status, JobStatus::Completed);
        assert!(ev.result.is_none());
    }
}
