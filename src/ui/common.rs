//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::VitalStatus;

/// Render the header bar with the monitored patient and connection state.
///
/// Displays: status indicator, patient identity, risk badge, link state,
/// wall clock.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();

    let Some(patient) = app.selected_patient() else {
        let line = Line::from(vec![
            Span::styled(
                " VITALWATCH ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("│ "),
            Span::raw(if app.patients.is_empty() {
                "No patient selected"
            } else {
                "Press p to select a patient"
            }),
            Span::raw(" │ "),
            render_link_state(app),
            Span::raw(" │ "),
            Span::raw(clock),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    // Overall status dot: worst vital wins, falls are always critical
    let overall = app
        .vitals
        .as_ref()
        .map(|v| v.overall)
        .unwrap_or(VitalStatus::Normal);
    let dot_style = app.theme.status_style(overall);

    let risk = app
        .vitals
        .as_ref()
        .map(|v| v.risk_level)
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(" ● ", dot_style),
        Span::styled("VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            patient.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " ({}) Room {} Age {} │ ",
            patient.patient_id, patient.room, patient.age
        )),
        Span::styled(format!("{} Risk", risk.label()), app.theme.risk_style(risk)),
        Span::raw(" │ "),
        render_link_state(app),
        Span::raw(" │ "),
        Span::raw(clock),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_link_state(app: &App) -> Span<'static> {
    if app.connected() {
        Span::styled(
            "LIVE",
            Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "OFFLINE",
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        )
    }
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Dashboard "),
        Line::from(" 2:History "),
        Line::from(" 3:Settings "),
    ];

    let selected = match app.current_view {
        View::Dashboard => 0,
        View::History => 1,
        View::Settings => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source description, time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    // A failed roster fetch blocks monitoring; show it above everything else
    if let Some(ref err) = app.roster_error {
        let paragraph = Paragraph::new(format!(" Roster error: {} | r:retry q:quit ", err))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref vitals) = app.vitals {
        let elapsed = vitals.last_updated.elapsed();

        let controls = match app.current_view {
            View::Dashboard => "p:patient Tab:switch e:export ?:help q:quit",
            View::History => {
                if app.filter_active {
                    "Type to search | Enter:apply Esc:cancel"
                } else {
                    "/:search s:sort S:reverse p:patient Tab:switch ?:help q:quit"
                }
            }
            View::Settings => "↑↓:field ←/→:adjust Enter:toggle w:save d:defaults q:quit",
        };

        format!(
            " {} | Updated {:.1}s ago | {}",
            app.source_description(),
            elapsed.as_secs_f64(),
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" {} | {} | q:quit ", app.source_description(), err)
    } else {
        format!(
            " {} | Waiting for data... | p:patient ?:help q:quit",
            app.source_description()
        )
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  p           Select patient"),
        Line::from("  Esc         Close overlay"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " History",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Settings",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→       Adjust threshold"),
        Line::from("  Enter     Toggle fall detection"),
        Line::from("  w         Save settings"),
        Line::from("  d         Restore defaults"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Retry roster / reload"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 32u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
