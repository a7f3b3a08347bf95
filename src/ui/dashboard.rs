//! Dashboard view: filter bar, job table, stats panel, pagination footer.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use ratatui::Frame;

use super::{status_color, stats, App};

pub fn render(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(Paragraph::new(filter_line(app)), outer[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(24)])
        .split(outer[1]);

    render_table(frame, app, middle[0]);
    stats::render(frame, app, middle[1]);

    frame.render_widget(Paragraph::new(pagination_line(app)), outer[2]);

    if let Some(flash) = &app.flash {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                flash.clone(),
                Style::default().fg(Color::Yellow),
            ))),
            outer[3],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "1 email · 2 bulk · 3 upload · t/s filters · n/p page · e edit · y retry · d delete · g download · r refresh · q quit",
            Style::default().fg(Color::DarkGray),
        ))),
        outer[4],
    );

    if app.confirm.is_some() {
        render_confirm(frame);
    }
}

fn filter_line(app: &App) -> Line<'static> {
    let type_label = app
        .jobs
        .job_type_filter()
        .map(|t| t.label())
        .unwrap_or("All");
    let status_label = app
        .jobs
        .status_filter()
        .map(|s| s.label())
        .unwrap_or("All");
    Line::from(vec![
        Span::styled("Type: ", Style::default().fg(Color::DarkGray)),
        Span::raw(type_label),
        Span::styled("   Status: ", Style::default().fg(Color::DarkGray)),
        Span::raw(status_label),
        Span::styled(
            format!("   {} job(s)", app.jobs.count()),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_table(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let block = Block::default().borders(Borders::ALL).title("Jobs");

    if app.jobs.loading() && app.jobs.jobs().is_empty() {
        frame.render_widget(Paragraph::new("Loading jobs...").block(block), area);
        return;
    }
    if let Some(error) = app.jobs.error() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            ))
            .block(block),
            area,
        );
        return;
    }
    if app.jobs.jobs().is_empty() {
        frame.render_widget(Paragraph::new("No jobs found.").block(block), area);
        return;
    }

    let header = Row::new(vec!["SNO", "Type", "Status", "Schedule", "Retries"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .jobs
        .jobs()
        .iter()
        .enumerate()
        .map(|(index, job)| {
            let row = Row::new(vec![
                Cell::from(app.jobs.serial(index).to_string()),
                Cell::from(job.job_type.label()),
                Cell::from(Span::styled(
                    job.status.label(),
                    Style::default().fg(status_color(job.status)),
                )),
                Cell::from(job.schedule_type.label()),
                Cell::from(format!("{}/{}", job.retries, job.max_retries)),
            ]);
            if index == app.selected {
                row.style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn pagination_line(app: &App) -> Line<'static> {
    let prev = if app.jobs.has_previous() { "‹ p" } else { "   " };
    let next = if app.jobs.has_next() { "n ›" } else { "   " };
    Line::from(vec![
        Span::styled(prev.to_string(), Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            "  Page {} of {}  ",
            app.jobs.page(),
            app.jobs.total_pages()
        )),
        Span::styled(next.to_string(), Style::default().fg(Color::DarkGray)),
    ])
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
