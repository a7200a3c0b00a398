mod app;
mod command;
mod config;
mod export;
mod insights;
mod listener;
mod recorder;
mod speaker;
mod stopwatch;
mod transcriber;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{AppState, BackendEvent};
use command::Command;

fn main() {
    env_logger::init();
    log::info!("Voice Stopwatch starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.voice-stopwatch")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = Rc::new(RefCell::new(AppState::new(backend_tx)));

    // Build UI
    let dashboard = ui::dashboard::build_dashboard(app, "Starting...");
    let overlay = ui::overlay::build_overlay(app);

    // Quit action for the header menu
    let quit = gtk4::gio::SimpleAction::new("quit", None);
    let app_for_quit = app.clone();
    quit.connect_activate(move |_, _| app_for_quit.quit());
    app.add_action(&quit);

    // Wire up the stopwatch controls; buttons and voice share one code path
    for (button, command) in [
        (&dashboard.start_button, Command::Start),
        (&dashboard.stop_button, Command::Stop),
        (&dashboard.reset_button, Command::Reset),
        (&dashboard.lap_button, Command::Lap),
        (&dashboard.analyze_button, Command::Analyze),
    ] {
        let state_clone = state.clone();
        button.connect_clicked(move |_| app::apply_command(&state_clone, command));
    }

    // One-shot voice command
    {
        let state_clone = state.clone();
        dashboard.voice_button.connect_clicked(move |_| {
            let s = state_clone.borrow();
            s.speak("Listening for a voice command...");
            s.listener.request_listen();
        });
    }

    // CSV export
    {
        let state_clone = state.clone();
        dashboard.export_button.connect_clicked(move |_| {
            app::export_lap_data(&state_clone);
        });
    }

    // Store UI handles in state
    {
        let mut s = state.borrow_mut();
        s.dashboard = Some(dashboard);
        s.overlay = Some(overlay);
    }

    // Show the dashboard
    state.borrow().dashboard.as_ref().unwrap().window.present();

    // Start the background voice listener
    {
        let s = state.borrow();
        listener::start(
            s.backend_sender.clone(),
            s.listener.clone(),
            s.config.listen_window_secs,
            s.config.silence_threshold,
        );
    }

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }

    // Download/load the whisper model
    app::ensure_speech_model(&state);
}
