//! Chat-client plugin registering a `testmessage` command whose behavior is
//! driven by settings kept in sync with the host's persisted store.

pub mod command;
pub mod config;
mod error;
pub mod plugin;
pub mod settings;
pub mod value;

pub use config::{ConfigItem, ConfigStore};
pub use error::{ConfigError, PluginError, UnknownValueType};
pub use plugin::TestMessagePlugin;
pub use settings::{Declaration, Setting};
pub use value::{Value, ValueType};
