//! Aggregate stats panel rendered beside the job table.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::App;
use crate::state::StatsView;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.stats.view() {
        StatsView::Loading => vec![Line::from("Loading stats...")],
        StatsView::Error(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        StatsView::Loaded(stats) => vec![
            count_line("Pending", stats.pending, Color::Blue),
            count_line("Running", stats.running, Color::Yellow),
            count_line("Completed", stats.completed, Color::Green),
            count_line("Failed", stats.failed, Color::Red),
            Line::from(Span::styled(
                format!("Total     {:>6}", stats.total),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ],
    };

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Job Stats"));
    frame.render_widget(panel, area);
}

fn count_line(label: &str, value: u64, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<9}", label), Style::default().fg(color)),
        Span::raw(format!("{:>7}", value)),
    ])
}
