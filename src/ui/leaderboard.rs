use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use time_humanize::HumanTime;

use crate::{
    app::App,
    clock::Clock,
    store::{LeaderboardEntry, Repository, SortBy},
    ui::format_duration,
};

/// "5 minutes ago" style age of an entry
pub fn humanize_age(completed_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - completed_at).num_seconds().max(0);
    HumanTime::from_seconds(-secs).to_string()
}

/// One leaderboard row; `rank` is 1-based.
pub fn present_row(rank: usize, entry: &LeaderboardEntry, now: DateTime<Utc>) -> Row<'static> {
    let rank_style = match rank {
        1 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        2 | 3 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };

    let accuracy_color = if entry.accuracy >= 98.0 {
        Color::Green
    } else if entry.accuracy >= 90.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(format!("#{rank}")).style(rank_style),
        Cell::from(entry.username.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}", entry.wpm)),
        Cell::from(format!("{}%", entry.accuracy)).style(Style::default().fg(accuracy_color)),
        Cell::from(format_duration(entry.duration_seconds)),
        Cell::from(humanize_age(entry.completed_at, now)),
    ])
}

/// Render the leaderboard screen
pub fn render_leaderboard<R: Repository, C: Clock>(app: &App<R, C>, f: &mut Frame) {
    let area = f.area();
    let view = &app.leaderboard;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Entries
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let scope = if view.current_content_only {
        format!("\"{}\" by wpm", app.session.reference().title())
    } else {
        format!("all passages by {}", view.sort_by)
    };
    let title = Paragraph::new(format!("Top {} ({scope})", view.limit))
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    if let Some(error) = &view.error {
        let failed = Paragraph::new(format!("Could not load the leaderboard: {error}"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));
        f.render_widget(failed, chunks[1]);
    } else if view.entries.is_empty() {
        let no_data = Paragraph::new("No scores yet. Finish a passage to get on the board.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let offset = view.visible_offset();

        let sorted_on = |col: SortBy| {
            if !view.current_content_only && view.sort_by == col {
                " ↓"
            } else {
                ""
            }
        };
        let header = Row::new(vec![
            Cell::from("Rank"),
            Cell::from("Name"),
            Cell::from(format!("WPM{}", sorted_on(SortBy::Wpm))),
            Cell::from(format!("Accuracy{}", sorted_on(SortBy::Accuracy))),
            Cell::from("Time"),
            Cell::from("When"),
        ])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let now = Utc::now();
        let rows: Vec<Row> = view
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(table_height)
            .map(|(idx, entry)| present_row(idx + 1, entry, now))
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(11),
            Constraint::Length(7),
            Constraint::Length(18),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Scores"))
            .column_spacing(2);
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new(
        "(↑/↓) scroll  (1/2/s) sort  (m) limit  (c) this passage  (b) back  (n) new  (r) retry",
    )
    .alignment(Alignment::Center)
    .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
