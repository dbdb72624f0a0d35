use crate::presentation::config::{Environment, LoggingSettings};

/// What `init_tracing` needs from the loaded settings.
pub struct TracingConfig {
    pub environment: Environment,
    pub json_format: bool,
    pub level: String,
    pub crate_level: String,
}

impl TracingConfig {
    pub fn from_settings(environment: Environment, logging: &LoggingSettings) -> Self {
        Self {
            environment,
            json_format: logging.enable_json,
            level: logging.level.clone(),
            crate_level: logging.crate_level.clone(),
        }
    }

    /// Filter used when `RUST_LOG` is unset. Request traces stay at the
    /// crate's level so job ids show up next to the HTTP spans.
    pub fn default_directive(&self) -> String {
        format!(
            "{},listenbox={},tower_http={}",
            self.level, self.crate_level, self.crate_level
        )
    }
}
