//! History view rendering.
//!
//! Displays the backend-produced aggregate windows for the monitored
//! patient in a sortable, filterable table.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::feed::Aggregate;

/// Column to sort by in the History view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by window start time.
    #[default]
    Start,
    /// Sort by average heart rate.
    HeartRate,
    /// Sort by average SpO2.
    SpO2,
    /// Sort by average temperature.
    Temperature,
    /// Sort by risk level.
    Risk,
    /// Sort by scorer confidence.
    Confidence,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Start => SortColumn::HeartRate,
            SortColumn::HeartRate => SortColumn::SpO2,
            SortColumn::SpO2 => SortColumn::Temperature,
            SortColumn::Temperature => SortColumn::Risk,
            SortColumn::Risk => SortColumn::Confidence,
            SortColumn::Confidence => SortColumn::Start,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortColumn::Start => "start",
            SortColumn::HeartRate => "hr",
            SortColumn::SpO2 => "spo2",
            SortColumn::Temperature => "temp",
            SortColumn::Risk => "risk",
            SortColumn::Confidence => "conf",
        }
    }
}

/// Render the History view showing aggregate windows in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    // Get filtered and sorted aggregates
    let mut rows_data: Vec<&Aggregate> =
        app.aggregates.iter().filter(|a| app.matches_filter(a)).collect();
    sort_aggregates_by(&mut rows_data, app.sort_column, app.sort_ascending);

    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !rows_data.is_empty() {
        format!(
            " [{}/{}]",
            app.selected_row.min(rows_data.len() - 1) + 1,
            rows_data.len()
        )
    } else {
        String::new()
    };

    let title = format!(
        " Aggregate Windows ({}/{}) [s:sort {}{}]{}{} ",
        rows_data.len(),
        app.aggregates.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if rows_data.is_empty() {
        let message = if app.aggregates.is_empty() {
            "No aggregate history received"
        } else {
            "No windows match the filter"
        };
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Start"),
        Cell::from("End"),
        Cell::from("HR (bpm)"),
        Cell::from("SpO₂ (%)"),
        Cell::from("Temp"),
        Cell::from("Accel (x,y,z)"),
        Cell::from("Risk"),
        Cell::from("Conf"),
        Cell::from("Summary"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = rows_data
        .iter()
        .map(|agg| {
            let accel = format!(
                "({:.2},{:.2},{:.2})",
                agg.avg_accel_x.unwrap_or(0.0),
                agg.avg_accel_y.unwrap_or(0.0),
                agg.avg_accel_z.unwrap_or(0.0)
            );

            Row::new(vec![
                Cell::from(agg.start_time.format("%m-%d %H:%M").to_string()),
                Cell::from(agg.end_time.format("%H:%M").to_string()),
                Cell::from(format_avg(agg.avg_heart_rate)),
                Cell::from(format_avg(agg.avg_spo2)),
                Cell::from(format_avg(agg.avg_temperature)),
                Cell::from(accel),
                Cell::from(agg.risk_level.label()).style(app.theme.risk_style(agg.risk_level)),
                Cell::from(
                    agg.confidence
                        .map(|c| format!("{:.1}%", c * 100.0))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(agg.summary.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(11), // Start
        Constraint::Length(5),  // End
        Constraint::Length(8),  // HR
        Constraint::Length(8),  // SpO2
        Constraint::Length(6),  // Temp
        Constraint::Length(18), // Accel
        Constraint::Length(8),  // Risk
        Constraint::Length(6),  // Confidence
        Constraint::Fill(1),    // Summary - takes the rest
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_row.min(rows_data.len() - 1)));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_avg(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

/// Sort aggregates by the given column and direction.
pub fn sort_aggregates_by(aggregates: &mut [&Aggregate], column: SortColumn, ascending: bool) {
    aggregates.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Start => a.start_time.cmp(&b.start_time),
            SortColumn::HeartRate => cmp_avg(a.avg_heart_rate, b.avg_heart_rate),
            SortColumn::SpO2 => cmp_avg(a.avg_spo2, b.avg_spo2),
            SortColumn::Temperature => cmp_avg(a.avg_temperature, b.avg_temperature),
            SortColumn::Risk => risk_rank(a.risk_level).cmp(&risk_rank(b.risk_level)),
            SortColumn::Confidence => cmp_avg(a.confidence, b.confidence),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by start time for stability when values tie
        if primary == std::cmp::Ordering::Equal {
            a.start_time.cmp(&b.start_time)
        } else {
            primary
        }
    });
}

/// Unscored windows sort below every scored one.
fn risk_rank(risk: crate::feed::RiskLevel) -> u8 {
    match risk {
        crate::feed::RiskLevel::Unknown => 0,
        crate::feed::RiskLevel::Low => 1,
        crate::feed::RiskLevel::Moderate => 2,
        crate::feed::RiskLevel::High => 3,
    }
}

fn cmp_avg(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    a.unwrap_or(f64::MIN)
        .partial_cmp(&b.unwrap_or(f64::MIN))
        .unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{AggregatePatient, RiskLevel};
    use chrono::{TimeZone, Utc};

    fn aggregate(id: i64, hour: u32, hr: Option<f64>, risk: RiskLevel) -> Aggregate {
        Aggregate {
            id,
            start_time: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 1, hour, 5, 0).unwrap(),
            patient: AggregatePatient {
                id: 1,
                name: "John Doe".to_string(),
            },
            avg_heart_rate: hr,
            avg_spo2: None,
            avg_temperature: None,
            avg_accel_x: None,
            avg_accel_y: None,
            avg_accel_z: None,
            risk_level: risk,
            confidence: None,
            summary: String::new(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, hour, 5, 1).unwrap(),
        }
    }

    #[test]
    fn test_sort_by_start_time() {
        let a = aggregate(1, 10, Some(70.0), RiskLevel::Low);
        let b = aggregate(2, 8, Some(90.0), RiskLevel::High);
        let mut rows = vec![&a, &b];

        sort_aggregates_by(&mut rows, SortColumn::Start, true);
        assert_eq!(rows[0].id, 2);

        sort_aggregates_by(&mut rows, SortColumn::Start, false);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn test_sort_by_heart_rate_puts_missing_last() {
        let a = aggregate(1, 10, None, RiskLevel::Low);
        let b = aggregate(2, 8, Some(90.0), RiskLevel::Low);
        let c = aggregate(3, 9, Some(70.0), RiskLevel::Low);
        let mut rows = vec![&a, &b, &c];

        sort_aggregates_by(&mut rows, SortColumn::HeartRate, false);
        assert_eq!(rows[0].id, 2);
        assert_eq!(rows[1].id, 3);
        assert_eq!(rows[2].id, 1);
    }

    #[test]
    fn test_sort_by_risk() {
        let a = aggregate(1, 10, None, RiskLevel::Low);
        let b = aggregate(2, 8, None, RiskLevel::High);
        let mut rows = vec![&a, &b];

        sort_aggregates_by(&mut rows, SortColumn::Risk, false);
        assert_eq!(rows[0].id, 2);
    }

    #[test]
    fn test_sort_column_cycles_back() {
        let mut col = SortColumn::Start;
        for _ in 0..6 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Start);
    }
}
