pub mod charting;
pub mod leaderboard;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState, SubmissionState},
    clock::Clock,
    session::{Phase, SessionResult},
    store::Repository,
    track::CharStatus,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Draw whichever screen the app is on.
pub fn draw<R: Repository, C: Clock>(app: &App<R, C>, f: &mut Frame) {
    match app.state {
        AppState::Typing | AppState::Results => f.render_widget(app, f.area()),
        AppState::Leaderboard => leaderboard::render_leaderboard(app, f),
    }
}

/// `m:ss`
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl<R: Repository, C: Clock> Widget for &App<R, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match (self.state, self.session.result()) {
            (AppState::Results, Some(result)) => render_results(self, result, area, buf),
            _ => render_typing(self, area, buf),
        }
    }
}

fn render_typing<R: Repository, C: Clock>(app: &App<R, C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let reference = app.session.reference();
    let track = app.session.track();
    let prompt = reference.as_string();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_occupied_lines = if prompt.width() <= max_chars_per_line as usize {
        1
    } else {
        ((prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(padding),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
            Constraint::Length(1), // live metrics
            Constraint::Length(1), // legend
        ])
        .split(area);

    let title = if reference.title().is_empty() {
        "untitled".to_string()
    } else {
        reference.title().to_string()
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(title, bold_style),
        Span::raw("   "),
        Span::styled(
            format_duration(app.live.elapsed_secs.floor() as u64),
            dim_bold_style,
        ),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let mut spans = track
        .cells()
        .iter()
        .take(track.cursor())
        .map(|cell| match cell.status {
            CharStatus::Incorrect => Span::styled(
                match cell.expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            _ => Span::styled(cell.expected.to_string(), green_bold_style),
        })
        .collect::<Vec<Span>>();

    if let Some(next) = reference.char_at(track.cursor()) {
        spans.push(Span::styled(next.to_string(), underlined_dim_bold_style));
        let rest: String = reference.chars().iter().skip(track.cursor() + 1).collect();
        spans.push(Span::styled(rest, dim_bold_style));
    }

    let widget = Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    widget.render(chunks[2], buf);

    let live = if app.session.phase() == Phase::Idle {
        Span::styled("start typing to begin", italic_style.fg(Color::Yellow))
    } else {
        Span::styled(
            format!(
                "{} wpm   {}% acc   {:.0}%",
                app.live.wpm, app.live.accuracy, app.live.progress
            ),
            bold_style,
        )
    };
    Paragraph::new(live)
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let legend = match &app.status {
        Some(status) => Span::styled(status.clone(), italic_style.fg(Color::Red)),
        None => Span::styled("(←) restart / (→) new passage / (esc)ape", italic_style),
    };
    Paragraph::new(legend).render(chunks[5], buf);
}

fn render_results<R: Repository, C: Clock>(
    app: &App<R, C>,
    result: &SessionResult,
    area: Rect,
    buf: &mut Buffer,
) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // characters
            Constraint::Length(1), // submission
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let points = app.timeline.points();
    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(&points, Some(result.duration_seconds as f64));
    let highest_wpm = highest_wpm.max(result.wpm);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {}",
            result.wpm,
            result.accuracy,
            format_duration(result.duration_seconds)
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let chars = Paragraph::new(Span::styled(
        format!(
            "{}/{} correct   {} errors",
            result.correct_chars, result.total_chars, result.error_count
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    chars.render(chunks[2], buf);

    let submission = match &app.submission {
        SubmissionState::Submitted(s) => Span::styled(
            format!("#{} on the leaderboard as {}", s.rank, s.entry.username),
            bold_style.fg(Color::Green),
        ),
        SubmissionState::NeedsUsername => Span::styled(
            format!("your name: {}_   (enter) submit", app.username_input),
            bold_style.fg(Color::Yellow),
        ),
        SubmissionState::Failed(reason) => Span::styled(
            format!("not submitted: {reason}"),
            bold_style.fg(Color::Red),
        ),
        SubmissionState::Skipped => Span::styled("score not submitted", italic_style),
        SubmissionState::Idle => Span::raw(""),
    };
    Paragraph::new(submission)
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let legend = match app.submission {
        SubmissionState::NeedsUsername => "(tab) skip / (←) retry / (→) new / (esc)ape",
        SubmissionState::Failed(_) => {
            "(s)ubmit again / (r)etry / (n)ew / (l)eaderboard / (esc)ape"
        }
        SubmissionState::Skipped => "(s)ubmit / (r)etry / (n)ew / (l)eaderboard / (esc)ape",
        _ => "(r)etry / (n)ew / (l)eaderboard / (esc)ape",
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[5], buf);
}
