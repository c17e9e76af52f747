// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{
    apply_env_overrides, default_config_path, load_config, load_from_file, ENV_BIND, ENV_DATA_DIR,
    ENV_STORE,
};
pub use settings::{
    solace_dir, ChatConfig, Config, DataConfig, LoggingConfig, ServerConfig, StorageConfig,
    StoreKind,
};
