use std::cell::RefCell;
use std::rc::Rc;

use super::state::{AppState, AppStatus, BackendEvent, update_status};

/// Dispatch whisper recognition of a captured phrase on the tokio runtime.
pub fn dispatch_recognition(state: &Rc<RefCell<AppState>>, samples: Vec<f32>, manual: bool) {
    let s = state.borrow();
    let ctx = match &s.whisper_ctx {
        Some(ctx) => ctx.clone(),
        None => {
            let listener = s.listener.clone();
            drop(s);
            // Drop the phrase; the model is still downloading or failed to load.
            listener.set_muted(false);
            update_status(state, AppStatus::Idle, "Speech model not ready");
            return;
        }
    };
    let sender = s.backend_sender.clone();

    s.tokio_rt.spawn(async move {
        let result = tokio::task::spawn_blocking(move || {
            crate::transcriber::recognize(&ctx, &samples)
        })
        .await;

        let event = match result {
            Ok(Ok(text)) if !text.is_empty() => BackendEvent::CommandRecognized { text, manual },
            Ok(Ok(_)) => BackendEvent::RecognitionFailed {
                reason: "heard nothing intelligible".into(),
                manual,
            },
            Ok(Err(e)) => BackendEvent::RecognitionFailed {
                reason: format!("recognition failed: {e}"),
                manual,
            },
            Err(e) => BackendEvent::RecognitionFailed {
                reason: format!("recognition task panicked: {e}"),
                manual,
            },
        };
        let _ = sender.send(event).await;
    });
}
