mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AsrSettings, DatabaseSettings, DownloaderSettings, LifecycleSettings, LoggingSettings,
    PersistenceProviderSetting, QueueSettings, ServerSettings, Settings, StorageSettings,
    TranslationSettings,
};
