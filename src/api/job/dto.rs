use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use super::models::{Frequency, JobType, ScheduleType};

/// Parameters for a send_email job
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct EmailParameters {
    #[validate(email(message = "Recipient must be a valid email address"))]
    pub recipient: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
}

/// Payload for POST /jobs/ (single email job)
#[derive(Debug, Serialize, Clone, Validate)]
pub struct CreateJobRequest {
    pub job_type: JobType,
    #[validate(nested)]
    pub parameters: EmailParameters,
    pub schedule_type: ScheduleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

/// One fully-rendered message inside a bulk submission
///
/// Template substitution happens before this is built; the server receives
/// one finished message per recipient.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct EmailMessage {
    #[validate(email(message = "Recipient must be a valid email address"))]
    pub recipient: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    pub body: String,
}

/// Payload for POST /jobs/send-email/ (bulk email job)
#[derive(Debug, Serialize, Clone, Validate)]
pub struct BulkEmailRequest {
    #[validate(length(min = 1, message = "At least one recipient is required"))]
    #[validate(nested)]
    pub emails: Vec<EmailMessage>,
    pub schedule_type: ScheduleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

/// Payload for PATCH /jobs/{id}/ (reschedule an editable job)
#[derive(Debug, Serialize, Clone)]
pub struct UpdateJobRequest {
    pub schedule_type: ScheduleType,
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

/// Inputs for POST /jobs/upload-file/; sent as a multipart form, not JSON
#[derive(Debug, Clone)]
pub struct UploadJobRequest {
    pub path: PathBuf,
    pub schedule_type: ScheduleType,
    pub scheduled_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_omits_absent_schedule_fields() {
        let req = CreateJobRequest {
            job_type: JobType::SendEmail,
            parameters: EmailParameters {
                recipient: "a@b.test".into(),
                subject: "hi".into(),
                body: "hello".into(),
            },
            schedule_type: ScheduleType::Immediate,
            scheduled_time: None,
            frequency: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("scheduled_time").is_none());
        assert!(json.get("frequency").is_none());
        assert_eq!(json["job_type"], "send_email");
    }

    #[test]
    fn invalid_recipient_fails_validation() {
        let params = EmailParameters {
            recipient: "not-an-address".into(),
            subject: "hi".into(),
            body: "hello".into(),
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn empty_bulk_request_fails_validation() {
        let req = BulkEmailRequest {
            emails: vec![],
            schedule_type: ScheduleType::Immediate,
            scheduled_time: None,
            frequency: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_serializes_null_time_for_immediate() {
        // PATCH must send scheduled_time explicitly (null clears it).
        let req = UpdateJobRequest {
            schedule_type: ScheduleType::Immediate,
            scheduled_time: None,
            frequency: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["scheduled_time"].is_null());
        assert!(json.get("frequency").is_none());
    }
}
