use std::path::PathBuf;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

// Command phrases are short, so the tiny English model is plenty and keeps
// recognition latency well under the listening window.
const MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin";
const MODEL_FILENAME: &str = "ggml-tiny.en.bin";

/// Directory for model storage: ~/.local/share/voice-stopwatch/models/
fn models_dir() -> PathBuf {
    let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("voice-stopwatch");
    p.push("models");
    p
}

fn model_path() -> PathBuf {
    models_dir().join(MODEL_FILENAME)
}

/// Check whether the whisper model file exists.
pub fn model_exists() -> bool {
    model_path().exists()
}

/// Download the whisper model, reporting progress via the provided callback.
/// `on_progress(bytes_downloaded, total_bytes)` — total may be 0 if unknown.
pub async fn download_model<F>(
    on_progress: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Fn(u64, u64) + Send + 'static,
{
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    tokio::fs::create_dir_all(models_dir()).await?;

    let response = reqwest::get(MODEL_URL).await?;
    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let path = model_path();
    let mut file = tokio::fs::File::create(&path).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        on_progress(downloaded, total);
    }

    file.flush().await?;
    log::info!("Model downloaded to {}", path.display());
    Ok(())
}

/// Load the whisper model from disk. CPU-heavy; call from a blocking context.
pub fn load_model() -> Result<WhisperContext, Box<dyn std::error::Error + Send + Sync>> {
    let path = model_path();
    let ctx = WhisperContext::new_with_params(
        path.to_str().ok_or("invalid model path")?,
        WhisperContextParameters::default(),
    )
    .map_err(|e| format!("failed to load whisper model: {e}"))?;
    log::info!("Whisper model loaded");
    Ok(ctx)
}

/// Recognize a command phrase from 16kHz mono f32 samples, returning
/// lower-cased text ready for `Command::parse`. CPU-heavy — call from
/// `spawn_blocking`.
pub fn recognize(
    ctx: &WhisperContext,
    samples: &[f32],
) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut state = ctx
        .create_state()
        .map_err(|e| format!("whisper state error: {e}"))?;

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_language(Some("en"));
    params.set_suppress_blank(true);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as i32)
        .unwrap_or(4);
    params.set_n_threads(cpus);

    state
        .full(params, samples)
        .map_err(|e| format!("recognition failed: {e}"))?;

    let mut text = String::new();
    for segment in state.as_iter() {
        text.push_str(&format!("{segment}"));
        text.push(' ');
    }

    Ok(text.trim().to_lowercase())
}
