//! Dashboard view rendering.
//!
//! Live vital-sign cards with trend sparklines, the ECG waveform, the
//! motion/fall monitor and the backend's risk assessment.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::VitalStatus;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let app = &*app;
    let Some(ref vitals) = app.vitals else {
        render_placeholder(frame, app, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(5), // Risk assessment
        Constraint::Min(10),   // Charts
        Constraint::Length(3), // Latest values strip
    ])
    .split(area);

    render_risk_panel(frame, app, chunks[0]);

    let columns = Layout::horizontal([
        Constraint::Fill(2), // Vital cards
        Constraint::Fill(3), // ECG waveform
        Constraint::Fill(2), // Motion monitor
    ])
    .split(chunks[1]);

    let cards = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    let key = app.chart_key();

    render_vital_card(
        frame,
        app,
        cards[0],
        " Heart Rate ",
        vitals.heart_rate.map(|v| format!("{:.0} BPM", v)),
        vitals.heart_rate_status,
        &app.history.heart_rate(&key),
        format!(
            "Normal: {:.0}-{:.0} BPM",
            app.thresholds.heart_rate_min, app.thresholds.heart_rate_max
        ),
    );

    render_vital_card(
        frame,
        app,
        cards[1],
        " SpO₂ ",
        vitals.spo2.map(|v| format!("{:.0} %", v)),
        vitals.spo2_status,
        &app.history.spo2(&key),
        format!("Normal: {:.0}-100 %", app.thresholds.spo2_min),
    );

    render_ecg(frame, app, columns[1], &app.history.ecg(&key));
    render_motion(frame, app, columns[2]);
    render_latest_values(frame, app, chunks[2]);
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let hint = if app.patients.is_empty() && app.server_url().is_some() {
        "No roster loaded"
    } else if app.selected_patient().is_none() && app.server_url().is_some() {
        "Press p to select a patient"
    } else {
        "Waiting for vitals..."
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(vec![Line::from(""), Line::from(hint)])
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM))
        .block(block);

    frame.render_widget(paragraph, area);
}

/// The backend's risk assessment: badge, confidence, free-text summary.
fn render_risk_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref vitals) = app.vitals else {
        return;
    };

    let confidence = vitals
        .confidence
        .map(|c| format!("{:.1}% confidence", c * 100.0))
        .unwrap_or_else(|| "confidence n/a".to_string());

    let recommendation = match vitals.risk_level {
        crate::feed::RiskLevel::High => "Immediate attention required. Contact physician.",
        _ => "Continue monitoring.",
    };

    let summary = vitals.summary.as_deref().unwrap_or("No assessment received yet.");

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} Risk ", vitals.risk_level.label()),
                app.theme
                    .risk_style(vitals.risk_level)
                    .add_modifier(Modifier::REVERSED),
            ),
            Span::raw(" "),
            Span::styled(confidence, Style::default().add_modifier(Modifier::DIM)),
            Span::raw("  "),
            Span::raw(recommendation),
        ]),
        Line::from(Span::raw(summary.to_string())),
    ];

    let block = Block::default()
        .title(" Risk Assessment ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

/// One vital card: current value, trend sparkline, normal-range caption.
#[allow(clippy::too_many_arguments)]
fn render_vital_card(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    value: Option<String>,
    status: VitalStatus,
    series: &[f64],
    caption: String,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 {
        return;
    }

    let rows = Layout::vertical([
        Constraint::Length(1), // Current value
        Constraint::Min(1),    // Sparkline
        Constraint::Length(1), // Normal range caption
    ])
    .split(inner);

    let value_line = Line::from(vec![
        Span::styled(
            value.unwrap_or_else(|| "--".to_string()),
            app.theme.status_style(status).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            status.symbol(),
            app.theme.status_style(status).add_modifier(Modifier::DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(value_line), rows[0]);

    let points: Vec<u64> = series
        .iter()
        .rev()
        .take(rows[1].width as usize)
        .rev()
        .map(|&v| v.max(0.0).round() as u64)
        .collect();
    if !points.is_empty() {
        let sparkline = Sparkline::default()
            .data(&points)
            .style(Style::default().fg(app.theme.highlight));
        frame.render_widget(sparkline, rows[1]);
    }

    frame.render_widget(
        Paragraph::new(caption).style(Style::default().add_modifier(Modifier::DIM)),
        rows[2],
    );
}

/// The ECG waveform as a braille line chart.
fn render_ecg(frame: &mut Frame, app: &App, area: Rect, series: &[f64]) {
    let block = Block::default()
        .title(" ECG Waveform · Lead II ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if series.len() < 2 {
        let paragraph = Paragraph::new("No waveform data")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();

    let y_min = series.iter().copied().fold(f64::MAX, f64::min);
    let y_max = series.iter().copied().fold(f64::MIN, f64::max);
    let pad = ((y_max - y_min) * 0.1).max(0.1);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.trace))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, (series.len().max(2) - 1) as f64]))
        .y_axis(Axis::default().bounds([y_min - pad, y_max + pad]));

    frame.render_widget(chart, area);
}

/// Accelerometer values and the fall-detection state.
fn render_motion(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref vitals) = app.vitals else {
        return;
    };

    let mut lines = Vec::new();

    if vitals.fall_detected {
        lines.push(Line::from(Span::styled(
            " FALL DETECTED ",
            Style::default()
                .fg(app.theme.critical)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )));
        lines.push(Line::from(Span::styled(
            "Immediate attention required.",
            Style::default().fg(app.theme.critical),
        )));
        lines.push(Line::from(""));
    }

    match vitals.accel {
        Some([x, y, z]) => {
            lines.push(Line::from(format!("X: {:+.2} g", x)));
            lines.push(Line::from(format!("Y: {:+.2} g", y)));
            lines.push(Line::from(format!("Z: {:+.2} g", z)));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No accelerometer data",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }

    lines.push(Line::from(""));
    if let Some(ref status) = vitals.motion_status {
        lines.push(Line::from(vec![
            Span::styled("Motion: ", Style::default().add_modifier(Modifier::DIM)),
            Span::raw(status.clone()),
        ]));
    }

    let (activity, style) = if vitals.fall_detected {
        ("Alert Active", app.theme.status_style(VitalStatus::Critical))
    } else if !app.thresholds.fall_detection {
        ("Fall detection off", Style::default().add_modifier(Modifier::DIM))
    } else {
        ("Normal Activity", app.theme.status_style(VitalStatus::Normal))
    };
    lines.push(Line::from(Span::styled(activity, style)));

    let block = Block::default()
        .title(" Motion Monitor ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(if vitals.fall_detected {
            Style::default().fg(app.theme.critical)
        } else {
            Style::default().fg(app.theme.border)
        });

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// One-line summary of the latest readings with text sparkline trends.
fn render_latest_values(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref vitals) = app.vitals else {
        return;
    };

    let key = app.chart_key();
    let hr_trend = render_sparkline(&crate::data::normalize_levels(&app.history.heart_rate(&key)));
    let spo2_trend = render_sparkline(&crate::data::normalize_levels(&app.history.spo2(&key)));

    let fmt = |v: Option<f64>, unit: &str| {
        v.map(|v| format!("{:.1}{}", v, unit)).unwrap_or_else(|| "--".to_string())
    };

    let line = Line::from(vec![
        Span::raw(" HR "),
        Span::styled(
            fmt(vitals.heart_rate, " BPM"),
            app.theme.status_style(vitals.heart_rate_status),
        ),
        Span::raw(format!(" {} │ SpO₂ ", hr_trend)),
        Span::styled(fmt(vitals.spo2, " %"), app.theme.status_style(vitals.spo2_status)),
        Span::raw(format!(" {} │ Temp ", spo2_trend)),
        Span::styled(
            fmt(vitals.temperature, " °F"),
            app.theme.status_style(vitals.temperature_status),
        ),
        Span::raw(format!(" │ {} aggregate windows", app.aggregates.len())),
    ]);

    let block = Block::default()
        .title(" Latest Values ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_sparkline(levels: &[u8]) -> String {
    if levels.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = levels.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
