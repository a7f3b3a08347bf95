//! Read-only details view for a single job.

use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::{status_color, App, DetailView, Route};
use crate::api::job::models::Job;

pub fn render(frame: &mut Frame, app: &App) {
    let id = match app.route {
        Route::JobDetails(id) => id,
        _ => return,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let lines: Vec<Line> = match &app.detail {
        DetailView::Loading => vec![Line::from("Loading job...")],
        DetailView::Error(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        DetailView::Loaded(job) => describe(job),
    };

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Job #{}", id)),
        );
    frame.render_widget(body, chunks[0]);

    if let Some(flash) = &app.flash {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                flash.clone(),
                Style::default().fg(Color::Yellow),
            ))),
            chunks[1],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Esc back · d delete · g download URL · q quit",
            Style::default().fg(Color::DarkGray),
        ))),
        chunks[2],
    );

    if app.confirm.is_some() {
        render_confirm(frame);
    }
}

fn describe(job: &Job) -> Vec<Line<'static>> {
    let mut lines = vec![
        row("Type", job.job_type.label().to_string()),
        Line::from(vec![
            Span::raw(format!("{:<16}", "Status:")),
            Span::styled(
                job.status.label().to_string(),
                Style::default().fg(status_color(job.status)),
            ),
        ]),
        row("Schedule Type", job.schedule_type.label().to_string()),
    ];
    if let Some(time) = &job.scheduled_time {
        lines.push(row("Scheduled Time", local_display(time)));
    }
    if let Some(frequency) = job.frequency {
        lines.push(row("Frequency", frequency.label().to_string()));
    }
    lines.push(row(
        "Retries",
        format!("{} of {}", job.retries, job.max_retries),
    ));
    lines.push(row("Created", local_display(&job.created_at)));
    lines.push(row("Updated", local_display(&job.updated_at)));
    if job.has_artifact() {
        let name = job.file_name().unwrap_or("file").to_string();
        lines.push(row("File", name));
    }
    if let Some(result) = &job.result {
        lines.push(row("Result", result.to_string()));
    }
    lines
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{:<16}", format!("{}:", label))),
        Span::raw(value),
    ])
}

/// Times are stored in UTC and shown in the viewer's local zone
fn local_display(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn render_confirm(frame: &mut Frame) {
    let area = frame.area();
    let width = area.width.min(52);
    let popup = ratatui::layout::Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + area.height / 2,
        width,
        height: 3,
    };
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new("Are you sure you want to delete this job? (y/n)")
            .block(Block::default().borders(Borders::ALL).title("Confirm")),
        popup,
    );
}
