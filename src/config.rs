use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Speak confirmations and analysis results aloud.
    pub speech_feedback: bool,
    /// Keep the background listener capturing command phrases.
    pub continuous_listening: bool,
    /// Length of one listening window, in seconds.
    pub listen_window_secs: f32,
    /// Peak frame RMS below this counts as silence and is never transcribed.
    pub silence_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speech_feedback: true,
            continuous_listening: true,
            listen_window_secs: 5.0,
            silence_threshold: 0.015,
        }
    }
}

impl Config {
    /// Directory: ~/.config/voice-stopwatch/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("voice-stopwatch");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk. On first launch the file is missing; write the
    /// defaults so users have something to edit.
    pub fn load() -> Self {
        let path = Self::path();
        match Self::load_from(&path) {
            Some(config) => config,
            None => {
                let config = Self::default();
                if let Err(e) = config.save_to(&path) {
                    log::warn!("Failed to write default config: {e}");
                }
                config
            }
        }
    }

    fn load_from(path: &Path) -> Option<Self> {
        let data = fs::read_to_string(path).ok()?;
        Some(serde_json::from_str(&data).unwrap_or_default())
    }

    fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_voice_features() {
        let config = Config::default();
        assert!(config.speech_feedback);
        assert!(config.continuous_listening);
        assert!(config.listen_window_secs > 0.0);
    }

    #[test]
    fn partial_json_falls_back_to_field_defaults() {
        let config: Config = serde_json::from_str(r#"{"speech_feedback": false}"#).unwrap();
        assert!(!config.speech_feedback);
        assert!(config.continuous_listening);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("config.json")), None);
    }

    #[test]
    fn saved_defaults_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice-stopwatch").join("config.json");
        let config = Config::default();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), Some(config));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("config.json");
        Config::default().save_to(&path).unwrap();
        assert!(path.exists());
    }
}
