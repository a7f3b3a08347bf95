//! Bulk email-job create form with per-recipient template substitution.

use validator::Validate;

use super::schedule::ScheduleInput;
use super::{first_message, FormError};
use crate::api::job::dto::{BulkEmailRequest, EmailMessage};

/// Placeholder token the body template may contain
pub const NAME_TOKEN: &str = "{{name}}";

/// Replace every placeholder in the body with this recipient's name
///
/// Runs entirely client-side; the server receives one fully-rendered
/// message per recipient. An empty name substitutes an empty string.
pub fn render_body(template: &str, name: &str) -> String {
    template.replace(NAME_TOKEN, name)
}

/// One recipient row in the bulk form
#[derive(Debug, Clone, Default)]
pub struct RecipientInput {
    pub recipient: String,
    pub name: String,
}

/// Raw fields of the bulk send-email form
#[derive(Debug, Clone)]
pub struct BulkEmailInput {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<RecipientInput>,
    pub schedule: ScheduleInput,
}

impl BulkEmailInput {
    pub fn new() -> Self {
        Self {
            subject: String::new(),
            body: String::new(),
            recipients: vec![RecipientInput::default()],
            schedule: ScheduleInput::new(),
        }
    }

    pub fn add_recipient(&mut self) {
        self.recipients.push(RecipientInput::default());
    }

    /// Remove the last recipient row; at least one row always remains
    pub fn remove_recipient(&mut self) {
        if self.recipients.len() > 1 {
            self.recipients.pop();
        }
    }

    /// Validate, render each body, and build the bulk payload
    pub fn build(&self) -> Result<BulkEmailRequest, FormError> {
        let emails: Vec<EmailMessage> = self
            .recipients
            .iter()
            .map(|r| EmailMessage {
                recipient: r.recipient.trim().to_string(),
                subject: self.subject.trim().to_string(),
                body: render_body(&self.body, r.name.trim()),
            })
            .collect();

        for email in &emails {
            email.validate().map_err(|e| first_message(&e))?;
        }
        if self.body.trim().is_empty() {
            return Err(FormError::Invalid("Body is required".to_string()));
        }

        let schedule = self.schedule.resolve()?;
        let request = BulkEmailRequest {
            emails,
            schedule_type: schedule.schedule_type,
            scheduled_time: schedule.scheduled_time,
            frequency: schedule.frequency,
        };
        request.validate().map_err(|e| first_message(&e))?;
        Ok(request)
    }
}

impl Default for BulkEmailInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> BulkEmailInput {
        BulkEmailInput {
            subject: "News".to_string(),
            body: "Hi {{name}}".to_string(),
            recipients: vec![
                RecipientInput {
                    recipient: "ana@example.com".to_string(),
                    name: "Ana".to_string(),
                },
                RecipientInput {
                    recipient: "bo@example.com".to_string(),
                    name: String::new(),
                },
            ],
            schedule: ScheduleInput::new(),
        }
    }

    #[test]
    fn substitutes_each_recipient_name_independently() {
        let req = filled().build().unwrap();
        assert_eq!(req.emails[0].body, "Hi Ana");
        assert_eq!(req.emails[1].body, "Hi ");
    }

    #[test]
    fn substitutes_every_occurrence_of_the_token() {
        assert_eq!(render_body("{{name}} and {{name}}", "Ana"), "Ana and Ana");
        assert_eq!(render_body("no token", "Ana"), "no token");
    }

    #[test]
    fn rejects_any_invalid_recipient() {
        let mut input = filled();
        input.recipients[1].recipient = "broken".to_string();
        assert!(input.build().is_err());
    }

    #[test]
    fn keeps_at_least_one_recipient_row() {
        let mut input = BulkEmailInput::new();
        input.remove_recipient();
        assert_eq!(input.recipients.len(), 1);
        input.add_recipient();
        input.remove_recipient();
        assert_eq!(input.recipients.len(), 1);
    }

    #[test]
    fn every_message_shares_the_subject() {
        let req = filled().build().unwrap();
        assert!(req.emails.iter().all(|e| e.subject == "News"));
    }
}
