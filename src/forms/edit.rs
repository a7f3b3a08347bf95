//! Edit (reschedule) form for an existing job.
//!
//! Prefilled from a fetched job; only schedule fields are editable. The
//! UI gates submission on [`Job::is_editable`], and the server enforces
//! the same rule again on PATCH.

use super::schedule::{utc_to_local_input, ScheduleInput};
use super::FormError;
use crate::api::job::dto::UpdateJobRequest;
use crate::api::job::models::Job;

/// Raw fields of the edit form
#[derive(Debug, Clone)]
pub struct EditJobInput {
    pub schedule: ScheduleInput,
}

impl EditJobInput {
    /// Prefill from the job's current schedule
    ///
    /// The stored UTC time is sliced back to the local input shape, the
    /// inverse of the conversion done on submit.
    pub fn from_job(job: &Job) -> Self {
        Self {
            schedule: ScheduleInput {
                schedule_type: job.schedule_type,
                scheduled_time: job
                    .scheduled_time
                    .as_ref()
                    .map(utc_to_local_input)
                    .unwrap_or_default(),
                frequency: job.frequency,
            },
        }
    }

    /// Validate and build the PATCH payload
    ///
    /// scheduled_time is always serialized, as null when switching to
    /// immediate, so the server clears a previously set time.
    pub fn build(&self) -> Result<UpdateJobRequest, FormError> {
        let schedule = self.schedule.resolve()?;
        Ok(UpdateJobRequest {
            schedule_type: schedule.schedule_type,
            scheduled_time: schedule.scheduled_time,
            frequency: schedule.frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::{Frequency, JobStatus, JobType, ScheduleType};
    use crate::forms::schedule::local_input_to_utc;
    use chrono::Utc;

    fn scheduled_job() -> Job {
        Job {
            id: 9,
            job_type: JobType::SendEmail,
            status: JobStatus::Pending,
            schedule_type: ScheduleType::Interval,
            scheduled_time: Some(local_input_to_utc("2025-06-15T10:30").unwrap()),
            frequency: Some(Frequency::Weekly),
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
    fn prefills_local_time_and_frequency_from_the_job() {
        let input = EditJobInput::from_job(&scheduled_job());
        assert_eq!(input.schedule.schedule_type, ScheduleType::Interval);
        assert_eq!(input.schedule.scheduled_time, "2025-06-15T10:30");
        assert_eq!(input.schedule.frequency, Some(Frequency::Weekly));
    }

    #[test]
    fn prefill_and_build_round_trip_the_same_instant() {
        let job = scheduled_job();
        let req = EditJobInput::from_job(&job).build().unwrap();
        assert_eq!(req.scheduled_time, job.scheduled_time);
        assert_eq!(req.frequency, Some(Frequency::Weekly));
    }

    #[test]
    fn switching_to_immediate_clears_time_and_frequency() {
        let mut input = EditJobInput::from_job(&scheduled_job());
        input.schedule.schedule_type = ScheduleType::Immediate;
        let req = input.build().unwrap();
        assert!(req.scheduled_time.is_none());
        assert!(req.frequency.is_none());
    }

    #[test]
    fn interval_without_frequency_is_rejected() {
        let mut input = EditJobInput::from_job(&scheduled_job());
        input.schedule.frequency = None;
        assert_eq!(input.build().unwrap_err(), FormError::MissingFrequency);
    }
}
