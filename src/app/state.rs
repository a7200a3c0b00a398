use std::sync::Arc;

use gtk4::glib;

use crate::config::Config;
use crate::listener::ListenerControl;
use crate::stopwatch::Stopwatch;
use crate::ui::dashboard::DashboardWidgets;
use crate::ui::overlay::OverlayWidgets;

/// Events sent from background threads to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    /// A listening window opened. `manual` marks one-shot listens from the
    /// Voice Control button.
    ListenBegan { manual: bool },
    /// Microphone level for the overlay waveform.
    AudioLevel(f32),
    /// The listening window closed.
    ListenEnded,
    /// A voiced phrase was captured and awaits recognition.
    PhraseCaptured { samples: Vec<f32>, manual: bool },
    /// Recognition produced lower-cased text.
    CommandRecognized { text: String, manual: bool },
    /// Recognition failed or heard nothing usable. Never fatal.
    RecognitionFailed { reason: String, manual: bool },
    /// 100ms cadence while the stopwatch runs.
    TimerTick,
    ModelDownloadProgress(u64, u64),
    ModelDownloadComplete,
    ProcessingError(String),
}

/// Voice pipeline status shown on the dashboard. The stopwatch's own
/// running/stopped state lives in `Stopwatch`.
#[derive(Debug, Clone, PartialEq)]
pub enum AppStatus {
    Idle,
    Listening,
    Recognizing,
    ModelDownloading,
}

/// Overlay phase while a voice command is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayPhase {
    Listening,
    Recognizing,
    Heard(String),
    NotUnderstood,
}

/// Central application state. Lives on the GTK main thread inside
/// Rc<RefCell<>>; this is the single serialization point for all stopwatch
/// and lap mutations.
pub struct AppState {
    pub status: AppStatus,
    pub config: Config,
    pub stopwatch: Stopwatch,
    pub listener: Arc<ListenerControl>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub whisper_ctx: Option<Arc<whisper_rs::WhisperContext>>,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // Stopwatch display tick, present only while running
    pub tick_source: Option<glib::SourceId>,

    // Overlay phase tracking
    pub overlay_phase: Option<OverlayPhase>,
    pub overlay_dismiss_source: Option<glib::SourceId>,

    // UI handles
    pub dashboard: Option<DashboardWidgets>,
    pub overlay: Option<OverlayWidgets>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> Self {
        let config = Config::load();
        let listener = ListenerControl::new(config.continuous_listening);
        let tokio_rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        Self {
            status: AppStatus::Idle,
            config,
            stopwatch: Stopwatch::new(),
            listener,
            tokio_rt,
            whisper_ctx: None,
            backend_sender: sender,
            tick_source: None,
            overlay_phase: None,
            overlay_dismiss_source: None,
            dashboard: None,
            overlay: None,
        }
    }

    /// Speak a phrase if voice feedback is enabled.
    pub fn speak(&self, phrase: &str) {
        if self.config.speech_feedback {
            crate::speaker::say(phrase);
        }
    }
}

/// Helper to update status label and state.
pub fn update_status(
    state: &std::rc::Rc<std::cell::RefCell<AppState>>,
    status: AppStatus,
    label_text: &str,
) {
    let mut s = state.borrow_mut();
    s.status = status;
    if let Some(ref dash) = s.dashboard {
        dash.status_label.set_text(label_text);
    }
}
