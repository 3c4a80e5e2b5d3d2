//! Runtime configuration.
//!
//! Priority: environment > `config.toml` in the data directory > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.toml";
pub const DB_FILE: &str = "archive.db";

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Models {
    pub flash: String,
    pub pro: String,
    pub image: String,
    pub video: String,
    pub maps: String,
    pub tts: String,
    pub live: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            flash: "gemini-3-flash-preview".to_string(),
            pro: "gemini-3-pro-preview".to_string(),
            image: "gemini-2.5-flash-image".to_string(),
            video: "veo-3.1-fast-generate-preview".to_string(),
            maps: "gemini-2.5-flash".to_string(),
            tts: "gemini-2.5-flash-preview-tts".to_string(),
            live: "gemini-2.5-flash-native-audio-preview-09-2025".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub live_url: String,
    pub models: Models,
    pub voice: String,
    pub request_timeout_secs: u64,
    pub video_poll_interval_secs: u64,
    pub cinematic_step_ms: u64,
    pub cinematic_final_ms: u64,
    pub auth_delay_ms: u64,

    /// Never read from disk.
    #[serde(skip)]
    pub api_key: Option<String>,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            live_url: DEFAULT_LIVE_URL.to_string(),
            models: Models::default(),
            voice: "Charon".to_string(),
            request_timeout_secs: 120,
            video_poll_interval_secs: 10,
            cinematic_step_ms: 2500,
            cinematic_final_ms: 2000,
            auth_delay_ms: 1500,
            api_key: None,
            data_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Load `config.toml` from `data_dir` (if present) and apply environment
    /// overrides.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.is_file() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::from_toml(&raw).with_context(|| format!("invalid {}", path.display()))?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();
        config.apply_env(|name| env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay environment values. `lookup` is `env::var` outside of tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(base) = non_empty("PBA_API_BASE") {
            self.api_base = base.trim_end_matches('/').to_string();
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn video_poll_interval(&self) -> Duration {
        Duration::from_secs(self.video_poll_interval_secs)
    }

    pub fn cinematic_step(&self) -> Duration {
        Duration::from_millis(self.cinematic_step_ms)
    }

    pub fn cinematic_final(&self) -> Duration {
        Duration::from_millis(self.cinematic_final_ms)
    }

    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }
}

/// Resolve the data directory.
/// Priority: explicit override > PBA_DATA_DIR env > ~/.pre-birth-archive
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    env::var("PBA_DATA_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            env::var("HOME")
                .or_else(|_| env::var("USERPROFILE"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".pre-birth-archive")
        })
}
