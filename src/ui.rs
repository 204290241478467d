pub mod charting;
pub mod format;

use chrono::Local;
use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Widget, Wrap,
    },
};

use crate::app::{App, Screen};
use crate::clock::TimeSource;
use crate::time_series::{trend_series, wpm_series, TimeSeriesPoint};
use charting::{compute_chart_params, format_label};
use format::{format_clock, format_duration};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const PASSAGE_LINES: usize = 4;

impl<T: TimeSource> Widget for &App<T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Typing => render_typing(self, area, buf),
            Screen::Results => render_results(self, area, buf),
            Screen::Reports => render_reports(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

/// Char range of the passage worth drawing: one line of typed context
/// before the cursor, starting on a word boundary.
pub fn passage_window(
    passage: &[char],
    cursor: usize,
    width: usize,
    lines: usize,
) -> (usize, usize) {
    let cursor = cursor.min(passage.len());
    let mut start = cursor.saturating_sub(width);
    if start > 0 {
        if let Some(space) = passage[start..cursor].iter().position(|c| *c == ' ') {
            start += space + 1;
        }
    }
    let end = passage.len().min(start + width * lines);
    (start, end)
}

fn render_typing<T: TimeSource>(app: &App<T>, area: Rect, buf: &mut Buffer) {
    let green_bold = bold().fg(Color::Green);
    let red_bold = bold().fg(Color::Red);
    let current = dim_bold().add_modifier(Modifier::UNDERLINED);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2),
            Constraint::Length(PASSAGE_LINES as u16 + 1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let passage: Vec<char> = app.passage.chars().collect();
    let typed: Vec<char> = app.buffer.chars().collect();
    let width = chunks[2].width.max(1) as usize;
    let (start, end) = passage_window(&passage, typed.len(), width, PASSAGE_LINES);

    let spans = (start..end)
        .map(|i| {
            let expected = passage[i];
            match typed.get(i) {
                Some(c) if *c == expected => Span::styled(expected.to_string(), green_bold),
                Some(_) => {
                    let shown = if expected == ' ' { '·' } else { expected };
                    Span::styled(shown.to_string(), red_bold)
                }
                None if i == typed.len() => Span::styled(expected.to_string(), current),
                None => Span::styled(expected.to_string(), dim_bold()),
            }
        })
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    let header = if app.has_started() {
        format!(
            "{}   {} wpm",
            format_clock(app.remaining_secs()),
            format_label(app.engine.live_wpm())
        )
    } else {
        format!("{}   start typing", format_clock(app.remaining_secs()))
    };
    Paragraph::new(Span::styled(header, dim_bold()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(tab) new passage / (?) history / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}

fn line_chart<'a>(
    points: &'a [(f64, f64)],
    series: &[TimeSeriesPoint],
    fallback_x: f64,
    x_title: &'a str,
) -> Chart<'a> {
    let (max_x, max_y) = compute_chart_params(series, fallback_x);

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(points)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(x_title)
                .bounds([1.0, max_x])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(format_label(max_x), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, max_y])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(format_label(max_y), bold()),
                ]),
        )
}

fn render_results<T: TimeSource>(app: &App<T>, area: Rect, buf: &mut Buffer) {
    let Some(result) = app.last_result.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let series = wpm_series(&result.wpm_data);
    let points: Vec<(f64, f64)> = series.iter().map(|p| (*p).into()).collect();
    line_chart(&points, &series, result.duration as f64, "seconds").render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} consistency",
            result.wpm, result.accuracy, result.consistency
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} characters in {}",
            result.characters_typed,
            format_duration(result.duration)
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (h)istory / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}

fn render_reports<T: TimeSource>(app: &App<T>, area: Rect, buf: &mut Buffer) {
    let reports = &app.reports;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Percentage(40),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let bests_text = if let Some(err) = reports.error.as_ref() {
        format!("History unavailable: {err}")
    } else if reports.bests.is_empty() {
        "No tests recorded yet.".to_string()
    } else {
        let lines = reports
            .bests
            .iter()
            .map(|(duration, best)| {
                format!(
                    "{}: {} wpm, {:.1}% acc",
                    format_duration(*duration),
                    best.best_wpm,
                    best.best_accuracy
                )
            })
            .join(" | ");
        format!("Personal bests: {lines}")
    };
    Paragraph::new(Span::styled(bests_text, bold()))
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);

    let series = trend_series(&reports.history);
    let points: Vec<(f64, f64)> = series.iter().map(|p| (*p).into()).collect();
    line_chart(&points, &series, 1.0, "tests").render(chunks[1], buf);

    let rows = reports.history.iter().map(|r| {
        let date = r
            .date_time()
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| r.date.clone());
        Row::new(vec![
            Cell::from(date),
            Cell::from(format_duration(r.duration)),
            Cell::from(r.wpm.to_string()),
            Cell::from(format!("{}%", r.accuracy)),
            Cell::from(r.consistency.to_string()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(17),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["date", "length", "wpm", "acc", "consistency"])
            .style(bold().fg(Color::Yellow)),
    )
    .block(Block::default().borders(Borders::TOP));
    Widget::render(table, chunks[2], buf);

    Paragraph::new(Span::styled(
        "(b)ack / (n)ew test / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn window_starts_at_passage_start() {
        let passage = chars("the quick brown fox");
        assert_eq!(passage_window(&passage, 0, 10, 2), (0, 19));
        assert_eq!(passage_window(&passage, 5, 10, 1), (0, 10));
    }

    #[test]
    fn window_snaps_to_word_after_scrolling() {
        let passage = chars("the quick brown fox jumps");
        // cursor at 'j' (20), width 8 => raw start 12 ("own fox ")
        let (start, end) = passage_window(&passage, 20, 8, 2);
        assert_eq!(start, 16);
        assert_eq!(passage[start], 'f');
        assert_eq!(end, 25);
    }

    #[test]
    fn window_clamps_cursor_past_end() {
        let passage = chars("abc");
        assert_eq!(passage_window(&passage, 10, 5, 2), (0, 3));
    }
}
