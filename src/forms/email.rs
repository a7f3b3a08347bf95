//! Single email-job create form.

use validator::Validate;

use super::schedule::ScheduleInput;
use super::{first_message, FormError};
use crate::api::job::dto::{CreateJobRequest, EmailParameters};
use crate::api::job::models::JobType;

/// Raw fields of the send-email form
#[derive(Debug, Clone, Default)]
pub struct EmailJobInput {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub schedule: ScheduleInput,
}

impl EmailJobInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and build the create payload
    pub fn build(&self) -> Result<CreateJobRequest, FormError> {
        let parameters = EmailParameters {
            recipient: self.recipient.trim().to_string(),
            subject: self.subject.trim().to_string(),
            body: self.body.clone(),
        };
        parameters.validate().map_err(|e| first_message(&e))?;

        let schedule = self.schedule.resolve()?;
        Ok(CreateJobRequest {
            job_type: JobType::SendEmail,
            parameters,
            schedule_type: schedule.schedule_type,
            scheduled_time: schedule.scheduled_time,
            frequency: schedule.frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::{Frequency, ScheduleType};

    fn filled() -> EmailJobInput {
        EmailJobInput {
            recipient: "ana@example.com".to_string(),
            subject: "Hello".to_string(),
            body: "Hi there".to_string(),
            schedule: ScheduleInput::new(),
        }
    }

    #[test]
    fn builds_an_immediate_send_email_job() {
        let req = filled().build().unwrap();
        assert_eq!(req.job_type, JobType::SendEmail);
        assert_eq!(req.schedule_type, ScheduleType::Immediate);
        assert_eq!(req.parameters.recipient, "ana@example.com");
        assert!(req.scheduled_time.is_none());
    }

    #[test]
    fn rejects_a_malformed_recipient() {
        let mut input = filled();
        input.recipient = "nope".to_string();
        assert!(matches!(input.build(), Err(FormError::Invalid(_))));
    }

    #[test]
    fn rejects_an_empty_subject() {
        let mut input = filled();
        input.subject = "  ".to_string();
        assert!(input.build().is_err());
    }

    #[test]
    fn interval_schedule_carries_time_and_frequency() {
        let mut input = filled();
        input.schedule = ScheduleInput {
            schedule_type: ScheduleType::Interval,
            scheduled_time: "2025-06-15T10:30".to_string(),
            frequency: Some(Frequency::Daily),
        };
        let req = input.build().unwrap();
        assert!(req.scheduled_time.is_some());
        assert_eq!(req.frequency, Some(Frequency::Daily));
    }
}
