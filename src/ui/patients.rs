//! Patient-selector overlay.
//!
//! A centered modal listing the roster; confirming a row tears down the
//! current stream and opens one for the chosen patient.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Minimum width required for the overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 8;

/// Render the patient selector as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if the terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let rows_needed = app.patients.len().max(1) as u16 + 5;
    let overlay_height = rows_needed.clamp(MIN_OVERLAY_HEIGHT, area.height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Select Patient ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    if app.patients.is_empty() {
        let message = match &app.roster_error {
            Some(err) => format!("Roster unavailable: {}\n\nr: retry  Esc: close", err),
            None => "Roster is empty.\n\nEsc: close".to_string(),
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, overlay_area);
        return;
    }

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("ID"),
        Cell::from("Room"),
        Cell::from("Age"),
        Cell::from("Condition"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = app
        .patients
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let marker = if app.selected_patient == Some(i) {
                "● "
            } else {
                "  "
            };
            Row::new(vec![
                Cell::from(format!("{}{}", marker, p.name)),
                Cell::from(p.patient_id.clone()),
                Cell::from(p.room.clone()),
                Cell::from(p.age.to_string()),
                Cell::from(p.condition.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(4),
        Constraint::Fill(3),
    ];

    let table_height = inner.height.saturating_sub(1);
    let table_area = Rect::new(inner.x, inner.y, inner.width, table_height);

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selector_index.min(app.patients.len() - 1)));
    frame.render_stateful_widget(table, table_area, &mut state);

    let footer_area = Rect::new(inner.x, inner.y + table_height, inner.width, 1);
    let footer = Paragraph::new(Line::from("Enter: monitor  Esc: cancel"))
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, footer_area);
}
