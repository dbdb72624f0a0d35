use serde::Deserialize;

use crate::application::services::OverflowPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub asr: AsrSettings,
    pub translation: TranslationSettings,
    #[serde(default)]
    pub downloader: DownloaderSettings,
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub lifecycle: LifecycleSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub provider: PersistenceProviderSetting,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceProviderSetting {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub upload_dir: String,
    #[serde(default = "default_max_upload_size_bytes")]
    pub max_upload_size_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AsrSettings {
    pub endpoint: String,
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    #[serde(default)]
    pub dispatch_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationSettings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloaderSettings {
    pub binary: String,
    pub format: String,
}

impl Default for DownloaderSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "bestaudio/best".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    pub capacity: usize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: 100,
            overflow: OverflowPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleSettings {
    #[serde(default)]
    pub fail_on_translation_error: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    #[serde(default = "default_crate_level")]
    pub crate_level: String,
    #[serde(default)]
    pub enable_json: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_max_upload_size_bytes() -> usize {
    2 * 1024 * 1024 * 1024
}

fn default_health_timeout_secs() -> u64 {
    10
}

fn default_crate_level() -> String {
    "debug".to_string()
}
