//! Configuration: config file loading and per-feed preferences.

pub mod loader;
pub mod preferences;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};
pub use preferences::{FeedPreferences, MemoryPreferenceStore, PreferenceStore};
