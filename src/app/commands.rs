use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gtk4::glib;
use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::state::{AppState, BackendEvent};
use crate::command::Command;
use crate::insights;
use crate::stopwatch::format_hms;

/// Apply a stopwatch command. Buttons and recognized voice phrases both land
/// here, on the GTK main thread, so every mutation is serialized.
pub fn apply_command(state: &Rc<RefCell<AppState>>, command: Command) {
    log::info!("Applying command: {}", command.label());
    match command {
        Command::Start => start(state),
        Command::Stop => stop(state),
        Command::Reset => reset(state),
        Command::Lap => lap(state),
        Command::Analyze => analyze(state),
    }
}

fn start(state: &Rc<RefCell<AppState>>) {
    {
        let mut s = state.borrow_mut();
        if s.stopwatch.is_running() {
            return;
        }
        s.stopwatch.start();
    }
    start_tick(state);
    refresh_time_label(state);
    refresh_controls(state);
    state.borrow().speak("Stopwatch started");
}

fn stop(state: &Rc<RefCell<AppState>>) {
    {
        let mut s = state.borrow_mut();
        if !s.stopwatch.is_running() {
            return;
        }
        s.stopwatch.stop();
    }
    stop_tick(state);
    refresh_time_label(state);
    refresh_controls(state);
    state.borrow().speak("Stopwatch stopped");
}

fn reset(state: &Rc<RefCell<AppState>>) {
    state.borrow_mut().stopwatch.reset();
    stop_tick(state);
    refresh_time_label(state);
    sync_chart(state);
    {
        let s = state.borrow();
        if let Some(ref dash) = s.dashboard {
            dash.insights_view.buffer().set_text("");
        }
    }
    refresh_controls(state);
    state.borrow().speak("Stopwatch reset");
}

fn lap(state: &Rc<RefCell<AppState>>) {
    let recorded = {
        let mut s = state.borrow_mut();
        let lap = s.stopwatch.record_lap();
        lap.map(|duration| (s.stopwatch.laps().len(), duration))
    };
    let Some((number, duration)) = recorded else {
        log::debug!("Lap ignored while stopped");
        return;
    };
    {
        let s = state.borrow();
        append_insight(&s, &format!("Lap {number}: {duration:.2} seconds"));
    }
    sync_chart(state);
}

fn analyze(state: &Rc<RefCell<AppState>>) {
    let report = insights::analyze(state.borrow().stopwatch.laps());
    let s = state.borrow();
    match report {
        None => append_insight(
            &s,
            "No laps recorded. Start the stopwatch and record laps to analyze productivity.",
        ),
        Some(report) => {
            append_insight(&s, &format!("Total Time: {:.2} seconds", report.total_time));
            append_insight(
                &s,
                &format!("Average Lap Time: {:.2} seconds", report.average_lap),
            );
            append_insight(&s, &format!("Productivity Score: {}/100", report.score));
            s.speak(&format!(
                "Your productivity score is {} out of 100.",
                report.score
            ));
        }
    }
}

/// Export lap data to a CSV file chosen by the user. With no laps recorded,
/// warns and writes nothing.
pub fn export_lap_data(state: &Rc<RefCell<AppState>>) {
    let laps = state.borrow().stopwatch.laps().to_vec();
    let Some(window) = state.borrow().dashboard.as_ref().map(|d| d.window.clone()) else {
        return;
    };

    if laps.is_empty() {
        let dialog = libadwaita::AlertDialog::new(Some("No Data"), Some("No lap data to export!"));
        dialog.add_response("close", "Close");
        dialog.present(Some(&window));
        return;
    }

    let dialog = gtk4::FileDialog::builder()
        .title("Export Lap Data")
        .initial_name("laps.csv")
        .build();

    let state_clone = state.clone();
    dialog.save(
        Some(&window),
        gtk4::gio::Cancellable::NONE,
        move |result| {
            let file = match result {
                Ok(file) => file,
                Err(e) => {
                    log::info!("Export dialog dismissed: {e}");
                    return;
                }
            };
            let Some(path) = file.path() else {
                log::warn!("Export target has no local path");
                return;
            };
            match crate::export::export_laps(&path, &laps) {
                Ok(()) => state_clone.borrow().speak("Data exported successfully."),
                Err(e) => {
                    log::error!("Export failed: {e}");
                    if let Some(ref dash) = state_clone.borrow().dashboard {
                        dash.status_label.set_text(&format!("Export failed: {e}"));
                    }
                }
            }
        },
    );
}

/// Repaint the elapsed-time label from the stopwatch.
pub fn refresh_time_label(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref dash) = s.dashboard {
        dash.time_label.set_text(&format_hms(s.stopwatch.elapsed()));
    }
}

/// Copy the lap list into the chart model and request a redraw.
fn sync_chart(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(ref dash) = s.dashboard {
        *dash.chart_laps.borrow_mut() = s.stopwatch.laps().to_vec();
        dash.chart.queue_draw();
    }
}

fn refresh_controls(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    let running = s.stopwatch.is_running();
    if let Some(ref dash) = s.dashboard {
        dash.start_button.set_sensitive(!running);
        dash.stop_button.set_sensitive(running);
    }
}

fn append_insight(s: &AppState, line: &str) {
    if let Some(ref dash) = s.dashboard {
        let buffer = dash.insights_view.buffer();
        buffer.insert(&mut buffer.end_iter(), &format!("{line}\n"));
    }
}

/// 100ms display tick while the stopwatch runs.
fn start_tick(state: &Rc<RefCell<AppState>>) {
    let sender = state.borrow().backend_sender.clone();
    let source = glib::timeout_add_local(Duration::from_millis(100), move || {
        let _ = sender.try_send(BackendEvent::TimerTick);
        glib::ControlFlow::Continue
    });
    if let Some(old) = state.borrow_mut().tick_source.replace(source) {
        old.remove();
    }
}

fn stop_tick(state: &Rc<RefCell<AppState>>) {
    if let Some(source) = state.borrow_mut().tick_source.take() {
        source.remove();
    }
}
