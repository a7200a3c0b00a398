use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gtk4::glib;
use gtk4::prelude::*;

use super::commands::{apply_command, refresh_time_label};
use super::model::load_speech_model;
use super::pipeline::dispatch_recognition;
use super::state::{AppState, AppStatus, BackendEvent, OverlayPhase, update_status};
use crate::command::Command;
use crate::ui::overlay::{push_audio_level, set_overlay_phase};

/// Handle a backend event. This is the single entry point through which the
/// background listener reaches the stopwatch.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::ListenBegan { manual } => {
            if manual {
                log::info!("One-shot listening window opened");
            }
            cancel_dismiss(state);
            show_overlay_phase(state, OverlayPhase::Listening);
            update_status(state, AppStatus::Listening, "Listening...");
        }
        BackendEvent::AudioLevel(level) => {
            let s = state.borrow();
            if let Some(ref overlay) = s.overlay {
                push_audio_level(overlay, level);
            }
        }
        BackendEvent::ListenEnded => {
            // If the window was pure silence nothing follows; a phrase event
            // arriving right after will cancel this dismissal.
            if state.borrow().status == AppStatus::Listening {
                update_status(state, AppStatus::Idle, "Idle");
            }
            schedule_dismiss(state, Duration::from_millis(400));
        }
        BackendEvent::PhraseCaptured { samples, manual } => {
            cancel_dismiss(state);
            show_overlay_phase(state, OverlayPhase::Recognizing);
            update_status(state, AppStatus::Recognizing, "Recognizing...");
            dispatch_recognition(state, samples, manual);
        }
        BackendEvent::CommandRecognized { text, .. } => {
            log::info!("Recognized: {text:?}");
            state.borrow().listener.set_muted(false);
            match Command::parse(&text) {
                Some(command) => {
                    show_overlay_phase(state, OverlayPhase::Heard(command.label().to_string()));
                    update_status(state, AppStatus::Idle, "Idle");
                    apply_command(state, command);
                }
                None => {
                    show_overlay_phase(state, OverlayPhase::NotUnderstood);
                    update_status(state, AppStatus::Idle, "Idle");
                    state.borrow().speak("Command not recognized.");
                }
            }
            schedule_dismiss(state, Duration::from_secs(2));
        }
        BackendEvent::RecognitionFailed { reason, manual } => {
            log::warn!("Recognition failed: {reason}");
            state.borrow().listener.set_muted(false);
            show_overlay_phase(state, OverlayPhase::NotUnderstood);
            update_status(state, AppStatus::Idle, "Idle");
            if manual {
                state.borrow().speak("Sorry, I couldn't understand that.");
            }
            schedule_dismiss(state, Duration::from_secs(2));
        }
        BackendEvent::TimerTick => refresh_time_label(state),
        BackendEvent::ModelDownloadProgress(downloaded, total) => {
            if let Some(ref dash) = state.borrow().dashboard {
                dash.progress_bar.set_visible(true);
                if total > 0 {
                    dash.progress_bar
                        .set_fraction(downloaded as f64 / total as f64);
                    let mb_done = downloaded as f64 / 1_048_576.0;
                    let mb_total = total as f64 / 1_048_576.0;
                    dash.progress_bar.set_text(Some(&format!(
                        "Downloading speech model: {mb_done:.1} / {mb_total:.1} MB"
                    )));
                } else {
                    dash.progress_bar.pulse();
                }
            }
        }
        BackendEvent::ModelDownloadComplete => {
            if let Some(ref dash) = state.borrow().dashboard {
                dash.progress_bar.set_visible(false);
            }
            load_speech_model(state);
        }
        BackendEvent::ProcessingError(err) => {
            log::error!("Processing error: {err}");
            state.borrow().listener.set_muted(false);
            dismiss_overlay(state);
            update_status(state, AppStatus::Idle, &format!("Error: {err}"));
        }
    }
}

/// Show the overlay in the given phase.
fn show_overlay_phase(state: &Rc<RefCell<AppState>>, phase: OverlayPhase) {
    let mut s = state.borrow_mut();
    s.overlay_phase = Some(phase.clone());
    if let Some(ref overlay) = s.overlay {
        set_overlay_phase(overlay, &phase);
        overlay.window.set_visible(true);
    }
}

/// Hide the overlay after `delay`, replacing any earlier pending dismissal.
fn schedule_dismiss(state: &Rc<RefCell<AppState>>, delay: Duration) {
    cancel_dismiss(state);
    let state_clone = state.clone();
    let source = glib::timeout_add_local_once(delay, move || {
        state_clone.borrow_mut().overlay_dismiss_source = None;
        dismiss_overlay(&state_clone);
    });
    state.borrow_mut().overlay_dismiss_source = Some(source);
}

fn cancel_dismiss(state: &Rc<RefCell<AppState>>) {
    if let Some(source) = state.borrow_mut().overlay_dismiss_source.take() {
        source.remove();
    }
}

/// Hide overlay and clear phase.
fn dismiss_overlay(state: &Rc<RefCell<AppState>>) {
    let mut s = state.borrow_mut();
    s.overlay_phase = None;
    if let Some(ref overlay) = s.overlay {
        overlay.window.set_visible(false);
    }
}
