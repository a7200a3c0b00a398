mod commands;
mod event_handler;
mod model;
mod pipeline;
mod state;

pub use commands::{apply_command, export_lap_data};
pub use event_handler::handle_backend_event;
pub use model::ensure_speech_model;
pub use state::{AppState, BackendEvent, OverlayPhase};
