//! The four form views: create email, bulk create, upload, edit.
//!
//! Each form is field-at-a-time editing over the raw inputs defined in
//! [`crate::forms`]; payload building and validation live there, this
//! module only moves focus, edits strings, and cycles selections.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::{App, Payload, Route};
use crate::api::error::ApiError;
use crate::api::job::models::Job;
use crate::forms::bulk::BulkEmailInput;
use crate::forms::edit::EditJobInput;
use crate::forms::email::EmailJobInput;
use crate::forms::upload::UploadInput;

/// What a handled key asks the shell to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Cancel,
}

/// Focus, inline error, and submit latch shared by every form
#[derive(Default)]
pub struct FormShell {
    pub focus: usize,
    pub error: Option<String>,
    pub submitting: bool,
}

pub enum ActiveForm {
    Email {
        input: EmailJobInput,
        shell: FormShell,
    },
    Bulk {
        input: BulkEmailInput,
        shell: FormShell,
    },
    Upload {
        input: UploadInput,
        shell: FormShell,
    },
    Edit {
        id: i64,
        input: Option<EditJobInput>,
        editable: bool,
        shell: FormShell,
    },
}

impl ActiveForm {
    pub fn email() -> Self {
        ActiveForm::Email {
            input: EmailJobInput::new(),
            shell: FormShell::default(),
        }
    }

    pub fn bulk() -> Self {
        ActiveForm::Bulk {
            input: BulkEmailInput::new(),
            shell: FormShell::default(),
        }
    }

    pub fn upload() -> Self {
        ActiveForm::Upload {
            input: UploadInput::new(),
            shell: FormShell::default(),
        }
    }

    /// Edit form before its job has been fetched
    pub fn edit_loading(id: i64) -> Self {
        ActiveForm::Edit {
            id,
            input: None,
            editable: false,
            shell: FormShell::default(),
        }
    }

    /// Fill the edit form once its job arrives
    pub fn prefill_edit(&mut self, result: Result<Job, ApiError>) {
        if let ActiveForm::Edit {
            input,
            editable,
            shell,
            ..
        } = self
        {
            match result {
                Ok(job) => {
                    *editable = job.is_editable();
                    *input = Some(EditJobInput::from_job(&job));
                }
                Err(e) => shell.error = Some(e.to_string()),
            }
        }
    }

    /// Latch the submitting flag so a double Enter can't double-submit
    pub fn submitting(&mut self) {
        let shell = self.shell_mut();
        shell.submitting = true;
        shell.error = None;
    }

    /// Surface a failed submission inline; form state stays intact
    pub fn submit_failed(&mut self, message: String) {
        let shell = self.shell_mut();
        shell.submitting = false;
        shell.error = Some(message);
    }

    /// Build this form's payload
    ///
    /// `Err(None)` means the form is not submittable right now (still
    /// loading or already submitting); `Err(Some(msg))` is a validation
    /// failure to show inline.
    pub fn build_payload(&self) -> Result<Payload, Option<String>> {
        if self.shell().submitting {
            return Err(None);
        }
        match self {
            ActiveForm::Email { input, .. } => input
                .build()
                .map(Payload::Create)
                .map_err(|e| Some(e.to_string())),
            ActiveForm::Bulk { input, .. } => input
                .build()
                .map(Payload::Bulk)
                .map_err(|e| Some(e.to_string())),
            ActiveForm::Upload { input, .. } => input
                .build()
                .map(Payload::Upload)
                .map_err(|e| Some(e.to_string())),
            ActiveForm::Edit {
                id,
                input,
                editable,
                ..
            } => match input {
                None => Err(None),
                Some(_) if !editable => Err(Some("This job cannot be edited.".to_string())),
                Some(edit) => edit
                    .build()
                    .map(|request| Payload::Update {
                        id: *id,
                        request,
                    })
                    .map_err(|e| Some(e.to_string())),
            },
        }
    }

    fn shell(&self) -> &FormShell {
        match self {
            ActiveForm::Email { shell, .. }
            | ActiveForm::Bulk { shell, .. }
            | ActiveForm::Upload { shell, .. }
            | ActiveForm::Edit { shell, .. } => shell,
        }
    }

    fn shell_mut(&mut self) -> &mut FormShell {
        match self {
            ActiveForm::Email { shell, .. }
            | ActiveForm::Bulk { shell, .. }
            | ActiveForm::Upload { shell, .. }
            | ActiveForm::Edit { shell, .. } => shell,
        }
    }

    fn field_count(&self) -> usize {
        match self {
            ActiveForm::Email { .. } => 6,
            ActiveForm::Bulk { input, .. } => 5 + input.recipients.len() * 2,
            ActiveForm::Upload { .. } => 3,
            ActiveForm::Edit { .. } => 3,
        }
    }
}

/// Route a key press into the active form
pub fn handle_key(form: &mut ActiveForm, key: KeyEvent) -> Option<FormAction> {
    match key.code {
        KeyCode::Esc => return Some(FormAction::Cancel),
        KeyCode::Enter => return Some(FormAction::Submit),
        KeyCode::Tab | KeyCode::Down => {
            let count = form.field_count();
            let shell = form.shell_mut();
            shell.focus = (shell.focus + 1) % count.max(1);
            return None;
        }
        KeyCode::BackTab | KeyCode::Up => {
            let count = form.field_count().max(1);
            let shell = form.shell_mut();
            shell.focus = (shell.focus + count - 1) % count;
            return None;
        }
        _ => {}
    }

    // Bulk recipient rows are added/removed with Ctrl+N / Ctrl+R.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let ActiveForm::Bulk { input, shell } = form {
            match key.code {
                KeyCode::Char('n') => input.add_recipient(),
                KeyCode::Char('r') => {
                    input.remove_recipient();
                    shell.focus = shell.focus.min(5 + input.recipients.len() * 2 - 1);
                }
                _ => {}
            }
        }
        return None;
    }

    edit_focused_field(form, key.code);
    None
}

/// Apply a plain key to whichever field has focus
fn edit_focused_field(form: &mut ActiveForm, code: KeyCode) {
    match form {
        ActiveForm::Email { input, shell } => match shell.focus {
            0 => edit_text(&mut input.recipient, code),
            1 => edit_text(&mut input.subject, code),
            2 => edit_text(&mut input.body, code),
            3 => {
                if is_cycle_key(code) {
                    input.schedule.cycle_type();
                }
            }
            4 => edit_text(&mut input.schedule.scheduled_time, code),
            _ => {
                if is_cycle_key(code) {
                    input.schedule.cycle_frequency();
                }
            }
        },
        ActiveForm::Bulk { input, shell } => match shell.focus {
            0 => edit_text(&mut input.subject, code),
            1 => edit_text(&mut input.body, code),
            2 => {
                if is_cycle_key(code) {
                    input.schedule.cycle_type();
                }
            }
            3 => edit_text(&mut input.schedule.scheduled_time, code),
            4 => {
                if is_cycle_key(code) {
                    input.schedule.cycle_frequency();
                }
            }
            focus => {
                let slot = focus - 5;
                if let Some(recipient) = input.recipients.get_mut(slot / 2) {
                    if slot % 2 == 0 {
                        edit_text(&mut recipient.recipient, code);
                    } else {
                        edit_text(&mut recipient.name, code);
                    }
                }
            }
        },
        ActiveForm::Upload { input, shell } => match shell.focus {
            0 => edit_text(&mut input.path, code),
            1 => {
                if is_cycle_key(code) {
                    input.toggle_scheduled();
                }
            }
            _ => edit_text(&mut input.scheduled_time, code),
        },
        ActiveForm::Edit { input, shell, .. } => {
            if let Some(edit) = input {
                match shell.focus {
                    0 => {
                        if is_cycle_key(code) {
                            edit.schedule.cycle_type();
                        }
                    }
                    1 => edit_text(&mut edit.schedule.scheduled_time, code),
                    _ => {
                        if is_cycle_key(code) {
                            edit.schedule.cycle_frequency();
                        }
                    }
                }
            }
        }
    }
}

fn edit_text(target: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => target.push(c),
        KeyCode::Backspace => {
            target.pop();
        }
        _ => {}
    }
}

fn is_cycle_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
    )
}

// ── Rendering ───────────────────────────────────────────────────────────

struct FieldLine {
    label: String,
    value: String,
    select: bool,
}

pub fn render(frame: &mut Frame, app: &App) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let (title, fields) = describe(form, app.route);
    let shell = form.shell();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let mut lines: Vec<Line> = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let focused = index == shell.focus;
        let marker = if focused { "> " } else { "  " };
        let value = if field.select {
            format!("< {} >", field.value)
        } else {
            field.value.clone()
        };
        let style = if focused {
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}: ", field.label), style),
            Span::styled(value, style),
        ]));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(body, chunks[0]);

    let status = if shell.submitting {
        Line::from(Span::styled("Submitting...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = &shell.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), chunks[1]);

    let hints = match form {
        ActiveForm::Bulk { .. } => {
            "Tab next field · ←/→ change selection · Ctrl+N add recipient · Ctrl+R remove · Enter submit · Esc cancel"
        }
        _ => "Tab next field · ←/→ change selection · Enter submit · Esc cancel",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints,
            Style::default().fg(Color::DarkGray),
        ))),
        chunks[2],
    );
}

fn describe(form: &ActiveForm, route: Route) -> (String, Vec<FieldLine>) {
    match form {
        ActiveForm::Email { input, .. } => {
            let mut fields = vec![
                text("Recipient Email", &input.recipient),
                text("Subject", &input.subject),
                text("Body", &input.body),
                select("Schedule", input.schedule.schedule_type.label()),
                text(
                    "Scheduled Time (local, YYYY-MM-DDTHH:MM)",
                    &input.schedule.scheduled_time,
                ),
                select(
                    "Frequency (interval only)",
                    input
                        .schedule
                        .frequency
                        .map(|f| f.label())
                        .unwrap_or("Select Frequency"),
                ),
            ];
            annotate_schedule(&mut fields, 4);
            ("Send Email Job".to_string(), fields)
        }
        ActiveForm::Bulk { input, .. } => {
            let mut fields = vec![
                text("Subject", &input.subject),
                text("Body ({{name}} is replaced per recipient)", &input.body),
                select("Schedule", input.schedule.schedule_type.label()),
                text(
                    "Start Time (local, YYYY-MM-DDTHH:MM)",
                    &input.schedule.scheduled_time,
                ),
                select(
                    "Frequency (interval only)",
                    input
                        .schedule
                        .frequency
                        .map(|f| f.label())
                        .unwrap_or("Select Frequency"),
                ),
            ];
            annotate_schedule(&mut fields, 3);
            for (index, recipient) in input.recipients.iter().enumerate() {
                fields.push(text(
                    &format!("Recipient {} Email", index + 1),
                    &recipient.recipient,
                ));
                fields.push(text(
                    &format!("Recipient {} Name", index + 1),
                    &recipient.name,
                ));
            }
            ("Bulk Send Email Job".to_string(), fields)
        }
        ActiveForm::Upload { input, .. } => {
            let fields = vec![
                text("File Path", &input.path),
                select(
                    "Schedule",
                    if input.scheduled { "Scheduled" } else { "Immediate" },
                ),
                text(
                    "Scheduled Time (local, YYYY-MM-DDTHH:MM)",
                    &input.scheduled_time,
                ),
            ];
            ("Upload File Job".to_string(), fields)
        }
        ActiveForm::Edit {
            id,
            input,
            editable,
            ..
        } => {
            let title = match route {
                Route::EditJob(route_id) => format!("Edit Job #{}", route_id),
                _ => format!("Edit Job #{}", id),
            };
            let fields = match input {
                None => vec![text("Loading job", "...")],
                Some(edit) => {
                    let mut fields = vec![
                        select("Schedule Type", edit.schedule.schedule_type.label()),
                        text(
                            "Scheduled Time (local, YYYY-MM-DDTHH:MM)",
                            &edit.schedule.scheduled_time,
                        ),
                        select(
                            "Frequency (interval only)",
                            edit.schedule
                                .frequency
                                .map(|f| f.label())
                                .unwrap_or("Select Frequency"),
                        ),
                    ];
                    if !editable {
                        fields.push(text("Warning", "This job cannot be edited."));
                    }
                    fields
                }
            };
            (title, fields)
        }
    }
}

fn text(label: &str, value: &str) -> FieldLine {
    FieldLine {
        label: label.to_string(),
        value: value.to_string(),
        select: false,
    }
}

fn select(label: &str, value: &str) -> FieldLine {
    FieldLine {
        label: label.to_string(),
        value: value.to_string(),
        select: true,
    }
}

/// Mark the time field required/ignored depending on the schedule type
fn annotate_schedule(fields: &mut [FieldLine], time_index: usize) {
    let schedule = &fields[time_index - 1];
    let required = schedule.value != "Immediate";
    if !required {
        fields[time_index].label.push_str(" (ignored for Immediate)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn typing_fills_the_focused_field() {
        let mut form = ActiveForm::email();
        for c in "a@b.io".chars() {
            handle_key(&mut form, key(KeyCode::Char(c)));
        }
        match &form {
            ActiveForm::Email { input, .. } => assert_eq!(input.recipient, "a@b.io"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn tab_wraps_focus_and_backtab_goes_back() {
        let mut form = ActiveForm::email();
        for _ in 0..6 {
            handle_key(&mut form, key(KeyCode::Tab));
        }
        assert_eq!(form.shell().focus, 0);
        handle_key(&mut form, key(KeyCode::BackTab));
        assert_eq!(form.shell().focus, 5);
    }

    #[test]
    fn escape_cancels_and_enter_submits() {
        let mut form = ActiveForm::email();
        assert_eq!(handle_key(&mut form, key(KeyCode::Esc)), Some(FormAction::Cancel));
        assert_eq!(
            handle_key(&mut form, key(KeyCode::Enter)),
            Some(FormAction::Submit)
        );
    }

    #[test]
    fn bulk_recipient_rows_grow_the_field_list() {
        let mut form = ActiveForm::bulk();
        let before = form.field_count();
        handle_key(
            &mut form,
            KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
        );
        assert_eq!(form.field_count(), before + 2);
        handle_key(
            &mut form,
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        );
        assert_eq!(form.field_count(), before);
    }

    #[test]
    fn unfilled_email_form_is_not_submittable() {
        let form = ActiveForm::email();
        assert!(matches!(form.build_payload(), Err(Some(_))));
    }

    #[test]
    fn edit_form_blocks_submission_until_loaded() {
        let form = ActiveForm::edit_loading(4);
        assert!(matches!(form.build_payload(), Err(None)));
    }

    #[test]
    fn submitting_latch_blocks_double_submit() {
        let mut form = ActiveForm::upload();
        if let ActiveForm::Upload { input, .. } = &mut form {
            input.path = "/tmp/x.bin".to_string();
        }
        assert!(form.build_payload().is_ok());
        form.submitting();
        assert!(matches!(form.build_payload(), Err(None)));
    }
}
