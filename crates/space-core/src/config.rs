use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::catalog::MAX_RESULTS;
use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Media provider endpoints and credentials.  Credentials are empty by
/// default; `PEXELS_API_KEY` / `FREESOUND_TOKEN` override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub pexels_api_key: String,
    #[serde(default)]
    pub freesound_token: String,
    #[serde(default = "default_image_search_url")]
    pub image_search_url: String,
    #[serde(default = "default_sound_search_url")]
    pub sound_search_url: String,
    #[serde(default = "default_sound_detail_url")]
    pub sound_detail_url: String,
}

impl ProvidersConfig {
    pub fn pexels_api_key(&self) -> Option<String> {
        non_blank(&self.pexels_api_key)
    }

    pub fn freesound_token(&self) -> Option<String> {
        non_blank(&self.freesound_token)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Durable selection store (background + favorites).
    #[serde(default = "default_storage_file")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl PlaybackConfig {
    /// Volume as mpv expects it (0–100).
    pub fn mpv_volume(&self) -> f64 {
        (self.volume.clamp(0.0, 1.0) as f64 * 100.0).round()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_image_query")]
    pub default_image_query: String,
    #[serde(default = "default_sound_query")]
    pub default_sound_query: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl SearchConfig {
    pub fn page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_RESULTS)
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            pexels_api_key: String::new(),
            freesound_token: String::new(),
            image_search_url: default_image_search_url(),
            sound_search_url: default_sound_search_url(),
            sound_detail_url: default_sound_detail_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: default_storage_file(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_image_query: default_image_query(),
            default_sound_query: default_sound_query(),
            page_size: default_page_size(),
        }
    }
}

fn default_image_search_url() -> String {
    "https://api.pexels.com/v1/search".to_string()
}

fn default_sound_search_url() -> String {
    "https://freesound.org/apiv2/search/text/".to_string()
}

fn default_sound_detail_url() -> String {
    "https://freesound.org/apiv2/sounds/".to_string()
}

fn default_storage_file() -> PathBuf {
    platform::data_dir().join("storage.json")
}

fn default_volume() -> f32 {
    0.5
}

fn default_image_query() -> String {
    "calm nature".to_string()
}

fn default_sound_query() -> String {
    "ambient sounds".to_string()
}

fn default_page_size() -> usize {
    MAX_RESULTS
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        let mut config = if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            config
        } else {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Credentials from the environment win over the file.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("PEXELS_API_KEY").and_then(|v| non_blank(&v)) {
            self.providers.pexels_api_key = key;
        }
        if let Some(token) = lookup("FREESOUND_TOKEN").and_then(|v| non_blank(&v)) {
            self.providers.freesound_token = token;
        }
    }
}
