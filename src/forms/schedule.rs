//! Shared schedule handling for every form.
//!
//! Times are captured in the user's local time as `%Y-%m-%dT%H:%M` (the
//! same shape a datetime-local input produces) and converted to an absolute
//! UTC instant before transmission. The server only ever sees UTC.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use super::FormError;
use crate::api::job::models::{Frequency, ScheduleType};

/// Input format for schedule times, in the user's local timezone
pub const TIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parse a local-time input string into a UTC instant
pub fn local_input_to_utc(input: &str) -> Result<DateTime<Utc>, FormError> {
    let naive = NaiveDateTime::parse_from_str(input.trim(), TIME_INPUT_FORMAT)
        .map_err(|_| FormError::BadTime(input.trim().to_string()))?;
    // Reject times that don't exist locally (DST gap) or are ambiguous.
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| FormError::BadTime(input.trim().to_string()))
}

/// Format a UTC instant back into the local-time input shape
///
/// Used to prefill the edit form from a fetched job.
pub fn utc_to_local_input(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIME_INPUT_FORMAT).to_string()
}

/// Resolved schedule ready to be put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub schedule_type: ScheduleType,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub frequency: Option<Frequency>,
}

/// Raw schedule fields as the user typed/selected them
#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub schedule_type: ScheduleType,
    pub scheduled_time: String,
    pub frequency: Option<Frequency>,
}

impl ScheduleInput {
    pub fn new() -> Self {
        Self {
            schedule_type: ScheduleType::Immediate,
            scheduled_time: String::new(),
            frequency: None,
        }
    }

    /// Cycle to the next schedule type; frequency resets like the original form
    pub fn cycle_type(&mut self) {
        self.schedule_type = match self.schedule_type {
            ScheduleType::Immediate => ScheduleType::Scheduled,
            ScheduleType::Scheduled => ScheduleType::Interval,
            ScheduleType::Interval => ScheduleType::Immediate,
        };
        self.frequency = None;
    }

    /// Cycle the frequency selection for interval jobs
    pub fn cycle_frequency(&mut self) {
        self.frequency = match self.frequency {
            None => Some(Frequency::Hourly),
            Some(Frequency::Hourly) => Some(Frequency::Daily),
            Some(Frequency::Daily) => Some(Frequency::Weekly),
            Some(Frequency::Weekly) => Some(Frequency::Monthly),
            Some(Frequency::Monthly) => Some(Frequency::Hourly),
        };
    }

    /// Enforce the requiredness rules and convert to UTC
    ///
    /// scheduled_time is required for scheduled/interval; frequency only
    /// for interval. Fields irrelevant to the selected type are dropped.
    pub fn resolve(&self) -> Result<Schedule, FormError> {
        let scheduled_time = if self.schedule_type.requires_time() {
            if self.scheduled_time.trim().is_empty() {
                return Err(FormError::MissingTime);
            }
            Some(local_input_to_utc(&self.scheduled_time)?)
        } else {
            None
        };

        let frequency = match self.schedule_type {
            ScheduleType::Interval => Some(self.frequency.ok_or(FormError::MissingFrequency)?),
            _ => None,
        };

        Ok(Schedule {
            schedule_type: self.schedule_type,
            scheduled_time,
            frequency,
        })
    }
}

impl Default for ScheduleInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_needs_no_time_or_frequency() {
        let input = ScheduleInput::new();
        let schedule = input.resolve().unwrap();
        assert_eq!(schedule.schedule_type, ScheduleType::Immediate);
        assert!(schedule.scheduled_time.is_none());
        assert!(schedule.frequency.is_none());
    }

    #[test]
    fn scheduled_requires_a_time() {
        let input = ScheduleInput {
            schedule_type: ScheduleType::Scheduled,
            scheduled_time: String::new(),
            frequency: None,
        };
        assert_eq!(input.resolve(), Err(FormError::MissingTime));
    }

    #[test]
    fn interval_requires_a_frequency() {
        let input = ScheduleInput {
            schedule_type: ScheduleType::Interval,
            scheduled_time: "2025-06-15T10:30".to_string(),
            frequency: None,
        };
        assert_eq!(input.resolve(), Err(FormError::MissingFrequency));
    }

    #[test]
    fn frequency_is_dropped_unless_interval() {
        let input = ScheduleInput {
            schedule_type: ScheduleType::Scheduled,
            scheduled_time: "2025-06-15T10:30".to_string(),
            frequency: Some(Frequency::Daily),
        };
        let schedule = input.resolve().unwrap();
        assert!(schedule.frequency.is_none());
        assert!(schedule.scheduled_time.is_some());
    }

    #[test]
    fn garbage_time_is_rejected() {
        let input = ScheduleInput {
            schedule_type: ScheduleType::Scheduled,
            scheduled_time: "next tuesday".to_string(),
            frequency: None,
        };
        assert!(matches!(input.resolve(), Err(FormError::BadTime(_))));
    }

    #[test]
    fn local_time_round_trips_through_utc() {
        let input = "2025-06-15T10:30";
        let utc = local_input_to_utc(input).unwrap();
        assert_eq!(utc_to_local_input(&utc), input);
    }

    #[test]
    fn cycling_schedule_type_resets_frequency() {
        let mut input = ScheduleInput {
            schedule_type: ScheduleType::Interval,
            scheduled_time: String::new(),
            frequency: Some(Frequency::Weekly),
        };
        input.cycle_type();
        assert!(input.frequency.is_none());
    }
}
