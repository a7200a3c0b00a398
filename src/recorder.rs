use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Sample rate whisper expects.
const TARGET_RATE: u32 = 16_000;

/// An open microphone capture. Samples accumulate in the shared buffer as
/// ~16kHz mono f32; dropping the capture stops the stream.
pub struct Capture {
    // Held only to keep the stream alive.
    _stream: cpal::Stream,
}

/// Start capturing from the default input device into `buffer`.
pub fn open(buffer: Arc<Mutex<Vec<f32>>>) -> Result<Capture, Box<dyn std::error::Error>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or("no input device found")?;
    log::debug!("Input device: {:?}", device.description());

    // Prefer a native 16kHz mono f32 config; otherwise decimate from the
    // device default.
    let native_16k = device.supported_input_configs()?.find(|c| {
        c.channels() == 1
            && c.min_sample_rate() <= TARGET_RATE
            && c.max_sample_rate() >= TARGET_RATE
            && c.sample_format() == cpal::SampleFormat::F32
    });

    let (config, step) = match native_16k {
        Some(c) => (c.with_sample_rate(TARGET_RATE).config(), 1usize),
        None => {
            let fallback = device.default_input_config()?;
            let rate = fallback.sample_rate();
            let step = (rate / TARGET_RATE).max(1) as usize;
            log::debug!("No native 16kHz config; decimating {rate}Hz by {step}x");
            (fallback.config(), step)
        }
    };

    let channels = config.channels as usize;
    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mut buf = buffer.lock().unwrap();
            for (i, frame) in data.chunks(channels).enumerate() {
                if i % step == 0 {
                    buf.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
        },
        |err| log::error!("Input stream error: {err}"),
        None,
    )?;
    stream.play()?;

    Ok(Capture { _stream: stream })
}

/// RMS of the most recent `window` samples, for the overlay level bars.
pub fn tail_rms(buffer: &Arc<Mutex<Vec<f32>>>, window: usize) -> f32 {
    let buf = buffer.lock().unwrap();
    let n = buf.len().min(window);
    if n == 0 {
        return 0.0;
    }
    let tail = &buf[buf.len() - n..];
    let sum_sq: f32 = tail.iter().map(|&s| s * s).sum();
    (sum_sq / n as f32).sqrt()
}

/// Whether any 1024-sample frame of `samples` rises above `threshold` RMS.
/// Used to skip transcribing windows that contain only room noise.
pub fn has_speech(samples: &[f32], threshold: f32) -> bool {
    const FRAME: usize = 1024;
    if samples.is_empty() {
        return false;
    }
    samples.chunks(FRAME).any(|frame| {
        let sum_sq: f32 = frame.iter().map(|&s| s * s).sum();
        (sum_sq / frame.len() as f32).sqrt() >= threshold
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_has_no_speech() {
        let silence = vec![0.0f32; 16_000];
        assert!(!has_speech(&silence, 0.015));
        assert!(!has_speech(&[], 0.015));
    }

    #[test]
    fn a_tone_counts_as_speech() {
        let tone: Vec<f32> = (0..16_000)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        assert!(has_speech(&tone, 0.015));
    }

    #[test]
    fn a_short_burst_in_a_long_window_is_still_detected() {
        let mut samples = vec![0.0f32; 64_000];
        for (i, s) in samples[30_000..32_000].iter_mut().enumerate() {
            *s = (i as f32 * 0.1).sin() * 0.4;
        }
        assert!(has_speech(&samples, 0.015));
    }

    #[test]
    fn tail_rms_of_empty_buffer_is_zero() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        assert_eq!(tail_rms(&buffer, 1280), 0.0);
    }

    #[test]
    fn tail_rms_tracks_recent_amplitude() {
        let buffer = Arc::new(Mutex::new(vec![0.0f32; 4000]));
        buffer.lock().unwrap().extend(vec![0.5f32; 2000]);
        let rms = tail_rms(&buffer, 1280);
        assert!((rms - 0.5).abs() < 1e-3);
    }
}
