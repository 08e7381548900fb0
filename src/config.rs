//! Settings of the localization runtime, read from `.dom-l10n.json`.
/// Config file loader
mod loader;
/// Settings manager
mod manager;
/// Settings types and validation
mod types;

pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    L10nSettings,
    ValidationError,
};
