//! Fire-and-forget speech output. Status phrases go to an external speech
//! engine; when none is installed, a short acknowledgement tone plays instead
//! so voice commands still get audible feedback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::f32::consts::PI;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

#[cfg(target_os = "macos")]
const ENGINES: &[&str] = &["say"];
#[cfg(not(target_os = "macos"))]
const ENGINES: &[&str] = &["spd-say", "espeak-ng", "espeak"];

/// Vocalize a short phrase. Spawns a thread and returns immediately; the
/// result is never consumed and failures are only logged.
pub fn say(phrase: &str) {
    let phrase = phrase.to_string();
    std::thread::spawn(move || {
        if let Err(e) = speak_blocking(&phrase) {
            log::warn!("Speech output unavailable ({e}); playing tone");
            if let Err(e) = play_ack_tone() {
                log::warn!("Acknowledgement tone failed: {e}");
            }
        }
    });
}

/// Run the first available speech engine with the phrase as its argument.
fn speak_blocking(phrase: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for engine in ENGINES {
        match Command::new(engine)
            .arg(phrase)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => return Err(format!("{engine} exited with status {status}").into()),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(format!("failed to spawn {engine}: {e}").into()),
        }
    }
    Err("no speech engine found".into())
}

/// Play a brief two-note chirp through the default output device.
fn play_ack_tone() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("no output device found")?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate() as f32;
    let channels = config.channels() as usize;

    let duration_secs = 0.2_f32;
    let total = (sample_rate * duration_secs) as usize;

    // 660 Hz for the first half, 880 Hz for the second, with a fade-out.
    let mut samples = Vec::with_capacity(total);
    for i in 0..total {
        let t = i as f32 / sample_rate;
        let progress = i as f32 / total as f32;
        let freq = if progress < 0.5 { 660.0 } else { 880.0 };
        let envelope = 1.0 - progress;
        samples.push((2.0 * PI * freq * t).sin() * envelope * 0.25);
    }

    let samples = std::sync::Arc::new(samples);
    let cursor = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let samples_cb = samples.clone();
    let cursor_cb = cursor.clone();
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut idx = cursor_cb.load(std::sync::atomic::Ordering::Relaxed);
            for frame in data.chunks_mut(channels) {
                let value = samples_cb.get(idx).copied().unwrap_or(0.0);
                for sample in frame.iter_mut() {
                    *sample = value;
                }
                idx += 1;
            }
            cursor_cb.store(idx, std::sync::atomic::Ordering::Relaxed);
        },
        |err| log::error!("Audio output error: {err}"),
        None,
    )?;
    stream.play()?;

    // Let playback finish before dropping the stream.
    std::thread::sleep(std::time::Duration::from_millis(250));
    Ok(())
}
