use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown configuration item: '{0}'")]
    UnknownKey(String),

    #[error("malformed configuration item: '{0}'")]
    MalformedItem(String),

    #[error("unsupported configuration value type for '{key}': '{type_name}'")]
    UnsupportedType { key: String, type_name: String },
}

/// A declared type name outside the supported set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown value type '{0}'")]
pub struct UnknownValueType(pub String);

#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed hooking configuration '{glob}'")]
    HookRegistrationFailed { glob: String },

    #[error("could not register the script '{name}'")]
    RegistrationFailed { name: String },
}
