use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If the patient selector is open, it captures navigation keys
    if app.show_patient_selector {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('p') => {
                app.close_patient_selector();
            }
            KeyCode::Up | KeyCode::Char('k') => app.selector_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.selector_next(),
            KeyCode::Enter => app.confirm_selection(),
            KeyCode::Char('r') => app.retry_roster(),
            _ => {}
        }
        return;
    }

    // If filter input is active, handle text input
    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::History),
        KeyCode::Char('3') => app.set_view(View::Settings),

        // Navigation (up/down for items, left/right depends on view)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => {
            if app.current_view == View::Settings {
                app.adjust_setting(-1.0);
            } else {
                app.prev_view();
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.current_view == View::Settings {
                app.adjust_setting(1.0);
            } else {
                app.next_view();
            }
        }
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Patient selector
        KeyCode::Char('p') => app.open_patient_selector(),

        // Settings: Enter toggles the boolean field; +/- also adjust
        KeyCode::Enter => {
            if app.current_view == View::Settings {
                app.adjust_setting(1.0);
            }
        }
        KeyCode::Char('+') => {
            if app.current_view == View::Settings {
                app.adjust_setting(1.0);
            }
        }
        KeyCode::Char('-') => {
            if app.current_view == View::Settings {
                app.adjust_setting(-1.0);
            }
        }
        KeyCode::Char('w') => {
            if app.current_view == View::Settings {
                app.save_thresholds();
            }
        }
        KeyCode::Char('d') => {
            if app.current_view == View::Settings {
                app.reset_thresholds();
            }
        }

        // Retry roster (after a failed fetch) or force a poll
        KeyCode::Char('r') => {
            if app.roster_error.is_some() {
                app.retry_roster();
            } else {
                let _ = app.reload_data();
            }
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting (History view)
        KeyCode::Char('s') => {
            if app.current_view == View::History {
                app.cycle_sort();
            }
        }
        KeyCode::Char('S') => {
            if app.current_view == View::History {
                app.toggle_sort_direction();
            }
        }

        // Filter (History view)
        KeyCode::Char('/') => {
            if app.current_view == View::History {
                app.start_filter();
            }
        }
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        // Export
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("vitals_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        // Backspace
        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        // Type characters
        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    if app.show_patient_selector {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.selector_prev(),
            MouseEventKind::ScrollDown => app.selector_next(),
            _ => {}
        }
        return;
    }

    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => {
            app.select_prev();
        }
        MouseEventKind::ScrollDown => {
            app.select_next();
        }

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Content rows (after header, tabs, table header)
            if clicked_row > content_start_row && app.current_view == View::History {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                if item_row < app.filtered_aggregate_count() {
                    app.selected_row = item_row;
                }
            }

            // Tab clicks (row 1, after the header bar)
            if clicked_row == 1 {
                let col = mouse.column;
                // Approximate tab positions: Dashboard (0-12), History (13-23), Settings (24-35)
                if col < 13 {
                    app.set_view(View::Dashboard);
                } else if col < 24 {
                    app.set_view(View::History);
                } else if col < 36 {
                    app.set_view(View::Settings);
                }
            }
        }

        _ => {}
    }
}
