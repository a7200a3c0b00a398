use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::glib;

use super::state::{AppState, AppStatus, BackendEvent, update_status};

/// Download the whisper model if missing, then load it.
pub fn ensure_speech_model(state: &Rc<RefCell<AppState>>) {
    if crate::transcriber::model_exists() {
        load_speech_model(state);
    } else {
        log::info!("Speech model not found, starting download");
        update_status(state, AppStatus::ModelDownloading, "Downloading speech model...");
        let sender = state.borrow().backend_sender.clone();
        let progress_sender = sender.clone();

        state.borrow().tokio_rt.spawn(async move {
            let result = crate::transcriber::download_model(move |downloaded, total| {
                let _ = progress_sender
                    .try_send(BackendEvent::ModelDownloadProgress(downloaded, total));
            })
            .await;

            match result {
                Ok(()) => {
                    let _ = sender.send(BackendEvent::ModelDownloadComplete).await;
                }
                Err(e) => {
                    let _ = sender
                        .send(BackendEvent::ProcessingError(format!(
                            "Model download failed: {e}"
                        )))
                        .await;
                }
            }
        });
    }
}

/// Load the whisper model in a blocking task, then deliver it to the main
/// thread. Voice commands stay inert until this completes; the buttons work
/// regardless.
pub fn load_speech_model(state: &Rc<RefCell<AppState>>) {
    log::info!("Loading speech model...");
    update_status(state, AppStatus::Idle, "Loading speech model...");

    let sender = state.borrow().backend_sender.clone();

    // The loaded context can't ride an Rc<RefCell> into tokio, so hand it
    // back to the main thread over its own channel.
    let (ctx_tx, ctx_rx) = async_channel::bounded::<whisper_rs::WhisperContext>(1);

    state.borrow().tokio_rt.spawn(async move {
        let result = tokio::task::spawn_blocking(crate::transcriber::load_model).await;

        match result {
            Ok(Ok(ctx)) => {
                let _ = ctx_tx.send(ctx).await;
            }
            Ok(Err(e)) => {
                let _ = sender
                    .send(BackendEvent::ProcessingError(format!(
                        "Failed to load speech model: {e}"
                    )))
                    .await;
            }
            Err(e) => {
                let _ = sender
                    .send(BackendEvent::ProcessingError(format!(
                        "Model load panicked: {e}"
                    )))
                    .await;
            }
        }
    });

    let state_clone = state.clone();
    glib::spawn_future_local(async move {
        if let Ok(ctx) = ctx_rx.recv().await {
            state_clone.borrow_mut().whisper_ctx = Some(Arc::new(ctx));
            update_status(&state_clone, AppStatus::Idle, "Idle");
            log::info!("Speech model ready, voice commands live");
        }
    });
}
