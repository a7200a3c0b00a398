//! Background voice-command listener. A dedicated OS thread owns the
//! microphone: it captures fixed listening windows, gates out silence, and
//! ships voiced phrases to the GTK main thread as backend events. Recognition
//! itself happens elsewhere; a failed window never terminates this loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::app::BackendEvent;
use crate::recorder;

/// Shared switches between the main thread and the listener thread.
pub struct ListenerControl {
    /// Continuous listening. When off, only one-shot requests open the mic.
    enabled: AtomicBool,
    /// Set while a captured phrase is being recognized, so the listener does
    /// not talk over an in-flight transcription.
    muted: AtomicBool,
    /// One-shot listen requested by the Voice Control button.
    listen_once: AtomicBool,
}

impl ListenerControl {
    pub fn new(enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            enabled: AtomicBool::new(enabled),
            muted: AtomicBool::new(false),
            listen_once: AtomicBool::new(false),
        })
    }

    /// Ask the listener to open a single window even if continuous listening
    /// is off or muted.
    pub fn request_listen(&self) {
        self.listen_once.store(true, Ordering::SeqCst);
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    fn take_listen_once(&self) -> bool {
        self.listen_once.swap(false, Ordering::SeqCst)
    }

    fn should_listen(&self) -> bool {
        self.enabled.load(Ordering::SeqCst) && !self.muted.load(Ordering::SeqCst)
    }
}

/// Start the listener on a dedicated OS thread.
pub fn start(
    sender: async_channel::Sender<BackendEvent>,
    control: Arc<ListenerControl>,
    window_secs: f32,
    silence_threshold: f32,
) {
    thread::Builder::new()
        .name("voice-listener".into())
        .spawn(move || listener_loop(&sender, &control, window_secs, silence_threshold))
        .expect("failed to spawn listener thread");
}

fn listener_loop(
    sender: &async_channel::Sender<BackendEvent>,
    control: &ListenerControl,
    window_secs: f32,
    silence_threshold: f32,
) {
    log::info!("Voice listener started (window {window_secs}s)");
    loop {
        let manual = control.take_listen_once();
        if !manual && !control.should_listen() {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        match capture_window(sender, window_secs, silence_threshold, manual) {
            Ok(Some(samples)) => {
                // Stay quiet until the main thread finishes recognizing.
                control.set_muted(true);
                let event = BackendEvent::PhraseCaptured { samples, manual };
                if sender.try_send(event).is_err() {
                    log::info!("Event channel closed, exiting voice listener");
                    return;
                }
            }
            Ok(None) => {
                log::debug!("Listening window contained no speech");
                if manual {
                    let _ = sender.try_send(BackendEvent::RecognitionFailed {
                        reason: "no speech detected".into(),
                        manual: true,
                    });
                }
            }
            Err(e) => {
                log::error!("Voice capture failed: {e}");
                if manual {
                    let _ = sender
                        .try_send(BackendEvent::ProcessingError(format!("Microphone error: {e}")));
                }
                thread::sleep(Duration::from_secs(2));
            }
        }
    }
}

/// Open the microphone for one listening window. Returns the captured
/// samples, or `None` when the window held nothing above the silence gate.
fn capture_window(
    sender: &async_channel::Sender<BackendEvent>,
    window_secs: f32,
    silence_threshold: f32,
    manual: bool,
) -> Result<Option<Vec<f32>>, Box<dyn std::error::Error>> {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let capture = recorder::open(buffer.clone())?;
    let _ = sender.try_send(BackendEvent::ListenBegan { manual });

    // ~12fps level updates for the overlay waveform.
    let opened = Instant::now();
    while opened.elapsed().as_secs_f32() < window_secs {
        thread::sleep(Duration::from_millis(80));
        let level = recorder::tail_rms(&buffer, 1280);
        let _ = sender.try_send(BackendEvent::AudioLevel(level));
    }

    drop(capture);
    let _ = sender.try_send(BackendEvent::ListenEnded);

    let samples = std::mem::take(&mut *buffer.lock().unwrap());
    log::debug!("Captured {} samples", samples.len());
    if recorder::has_speech(&samples, silence_threshold) {
        Ok(Some(samples))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_request_is_consumed_once() {
        let control = ListenerControl::new(false);
        assert!(!control.take_listen_once());
        control.request_listen();
        assert!(control.take_listen_once());
        assert!(!control.take_listen_once());
    }

    #[test]
    fn muting_suppresses_continuous_listening() {
        let control = ListenerControl::new(true);
        assert!(control.should_listen());
        control.set_muted(true);
        assert!(!control.should_listen());
        control.set_muted(false);
        assert!(control.should_listen());
    }

    #[test]
    fn disabled_listener_only_honors_one_shots() {
        let control = ListenerControl::new(false);
        assert!(!control.should_listen());
        control.request_listen();
        assert!(control.take_listen_once());
    }
}
