//! Settings view rendering.
//!
//! An editable list of alert thresholds. Changes apply immediately to the
//! running session; `w` persists them to the settings file.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// An editable field in the Settings view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    #[default]
    HeartRateMin,
    HeartRateMax,
    SpO2Min,
    TemperatureMax,
    FallDetection,
}

impl SettingsField {
    const ALL: [SettingsField; 5] = [
        SettingsField::HeartRateMin,
        SettingsField::HeartRateMax,
        SettingsField::SpO2Min,
        SettingsField::TemperatureMax,
        SettingsField::FallDetection,
    ];

    /// Move to the next field, stopping at the last.
    pub fn next(self) -> Self {
        let index = self.index();
        Self::ALL[(index + 1).min(Self::ALL.len() - 1)]
    }

    /// Move to the previous field, stopping at the first.
    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    /// The last field in the list.
    pub fn last() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }

    fn label(self) -> &'static str {
        match self {
            SettingsField::HeartRateMin => "Heart rate minimum",
            SettingsField::HeartRateMax => "Heart rate maximum",
            SettingsField::SpO2Min => "SpO₂ minimum",
            SettingsField::TemperatureMax => "Temperature maximum",
            SettingsField::FallDetection => "Fall detection",
        }
    }
}

/// Render the Settings view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let t = &app.thresholds;

    let values: [(SettingsField, String, &str); 5] = [
        (
            SettingsField::HeartRateMin,
            format!("{:.0} BPM", t.heart_rate_min),
            "Below this, heart rate raises a warning",
        ),
        (
            SettingsField::HeartRateMax,
            format!("{:.0} BPM", t.heart_rate_max),
            "Above this, heart rate raises a warning",
        ),
        (
            SettingsField::SpO2Min,
            format!("{:.1} %", t.spo2_min),
            "Below this, SpO₂ raises a warning",
        ),
        (
            SettingsField::TemperatureMax,
            format!("{:.1} °F", t.temperature_max),
            "Above this, temperature raises a warning",
        ),
        (
            SettingsField::FallDetection,
            if t.fall_detection { "On" } else { "Off" }.to_string(),
            "Evaluate motion status and impact acceleration",
        ),
    ];

    let header = Row::new(vec![
        Cell::from("Setting"),
        Cell::from("Value"),
        Cell::from(""),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = values
        .iter()
        .map(|(field, value, hint)| {
            Row::new(vec![
                Cell::from(field.label()),
                Cell::from(value.clone())
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(*hint).style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(22),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let title = if app.settings_dirty {
        " Alert Settings [modified] "
    } else {
        " Alert Settings "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let table_height = (values.len() as u16 + 1).min(inner.height);
    let table_area = Rect::new(inner.x, inner.y, inner.width, table_height);

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.settings_field.index()));
    frame.render_stateful_widget(table, table_area, &mut state);

    // Footer hints below the table
    if inner.height > table_height + 1 {
        let hint_area = Rect::new(
            inner.x,
            inner.y + table_height + 1,
            inner.width,
            inner.height - table_height - 1,
        );
        let hints = Paragraph::new(vec![
            Line::from("←/→ adjust · Enter toggle · w save · d restore defaults"),
            Line::from("Changes apply to the running session immediately."),
        ])
        .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(hints, hint_area);
    }
}
