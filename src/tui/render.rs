use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use thiserror::Error;

use super::App;
use crate::model::Row;
use crate::report::format_size;

const KEY_HELP: &str = "j/k move | g/G first/last | Enter/l open | h/Backspace up | x/Del delete | q quit";

#[derive(Debug, Error, Eq, PartialEq)]
#[error("formatting row to a width of {width} with '{left}' and '{right}' is impossible")]
pub struct RowTooWide {
    pub width: usize,
    pub left: String,
    pub right: String,
}

/// Places the row's left text at the far left and its right text at the far
/// right of `width` columns.
///
/// Fails when the two cannot be separated by at least one space.
///
/// ```rust
/// use purge::model::Row;
/// use purge::tui::format_row;
///
/// let row = Row { left: "left".into(), right: "right".into(), highlighted: false, is_directory: false };
/// assert_eq!(format_row(&row, 10).unwrap(), "left right");
/// assert!(format_row(&row, 9).is_err());
/// ```
pub fn format_row(row: &Row, width: usize) -> Result<String, RowTooWide> {
    let left_len = row.left.chars().count();
    let right_len = row.right.chars().count();
    if width <= left_len + right_len {
        return Err(RowTooWide {
            width,
            left: row.left.clone(),
            right: row.right.clone(),
        });
    }
    let left_width = width - right_len;
    Ok(format!("{:<left_width$}{}", row.left, row.right))
}

/// Like [`format_row`], but cuts the left text short instead of failing.
pub fn fit_row(row: &Row, width: usize) -> String {
    if let Ok(text) = format_row(row, width) {
        return text;
    }
    let right_len = row.right.chars().count();
    if width <= right_len + 1 {
        return row.left.chars().take(width).collect();
    }
    let left: String = row.left.chars().take(width - right_len - 1).collect();
    let left_width = width - right_len;
    format!("{left:<left_width$}{}", row.right)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn draw_app(frame: &mut Frame<'_>, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body = chunks[1];
    let max_rows = body.height.saturating_sub(2) as usize;
    let width = body.width.saturating_sub(2) as usize;
    let buffer = app.view(max_rows).clone();

    let navigator = app.navigator();
    let mut summary = format!(
        "Known: {} | Entries: {} | Sort: {}",
        format_size(navigator.known_size()),
        navigator.entries().len(),
        navigator.sort_policy().label()
    );
    if let Some(notice) = app.notice() {
        summary.push_str(" | ");
        summary.push_str(notice);
    }
    // path line, then the disk space line when there is one
    let mut header_lines: Vec<Line> = buffer.status.into_iter().map(Line::from).collect();
    header_lines.push(Line::from(summary));
    let header = Paragraph::new(header_lines).block(
        Block::default()
            .title("purge")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Gray)),
    );
    frame.render_widget(header, chunks[0]);

    let lines: Vec<Line> = buffer
        .rows
        .iter()
        .map(|row| {
            let mut style = Style::default();
            if row.is_directory {
                style = style.fg(Color::Blue);
            }
            if row.highlighted {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(fit_row(row, width)).style(style)
        })
        .collect();
    let list = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(list, body);

    frame.render_widget(
        Paragraph::new(KEY_HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );

    if let Some(name) = app.pending_delete() {
        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Red));
        let area = centered_rect(60, 25, frame.area());
        frame.render_widget(Clear, area);

        let text = vec![
            Line::from("PERMANENTLY DELETE")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from("").alignment(Alignment::Center),
            Line::from(name.to_string()).alignment(Alignment::Center),
            Line::from("").alignment(Alignment::Center),
            Line::from("Press [Y] to CONFIRM")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from("Press [N] or [Esc] to CANCEL").alignment(Alignment::Center),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    if let Some(message) = app.error_popup() {
        let block = Block::default()
            .title("Error")
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Red));
        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);

        let text = vec![
            Line::from(message.to_string()).alignment(Alignment::Center),
            Line::from("").alignment(Alignment::Center),
            Line::from("Press any key to close").alignment(Alignment::Center),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}
