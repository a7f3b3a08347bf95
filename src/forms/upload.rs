//! File-upload job create form.
//!
//! The upload form only offers immediate or scheduled runs; recurring
//! uploads are not a thing the service supports.

use std::path::PathBuf;

use super::schedule::local_input_to_utc;
use super::FormError;
use crate::api::job::dto::UploadJobRequest;
use crate::api::job::models::ScheduleType;

/// Raw fields of the upload form
#[derive(Debug, Clone, Default)]
pub struct UploadInput {
    pub path: String,
    pub scheduled: bool,
    pub scheduled_time: String,
}

impl UploadInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_scheduled(&mut self) {
        self.scheduled = !self.scheduled;
    }

    /// Validate and build the multipart request inputs
    pub fn build(&self) -> Result<UploadJobRequest, FormError> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(FormError::MissingFile);
        }

        let (schedule_type, scheduled_time) = if self.scheduled {
            if self.scheduled_time.trim().is_empty() {
                return Err(FormError::MissingTime);
            }
            (
                ScheduleType::Scheduled,
                Some(local_input_to_utc(&self.scheduled_time)?),
            )
        } else {
            (ScheduleType::Immediate, None)
        };

        Ok(UploadJobRequest {
            path: PathBuf::from(path),
            schedule_type,
            scheduled_time,
        })
    }
}
