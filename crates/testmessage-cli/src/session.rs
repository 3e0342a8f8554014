use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// A scripted host session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Persisted settings present before the plugin loads, by bare key
    #[serde(default)]
    pub settings: BTreeMap<String, String>,

    /// Buffers known to the host
    #[serde(default)]
    pub buffers: Vec<BufferDef>,

    /// Events delivered after the plugin loaded, in order
    #[serde(default)]
    pub events: Vec<Event>,

    /// Run the shutdown callback once the events are exhausted
    #[serde(default = "default_unload")]
    pub unload: bool,
}

/// A buffer to create in the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferDef {
    pub name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Issue the plugin command from a buffer, named by short or full name
    Command {
        buffer: String,
        #[serde(default)]
        args: String,
    },
    /// Change a setting; keys without a dot live in the plugin namespace
    Set { key: String, value: String },
    /// Remove a setting
    Unset { key: String },
}

fn default_unload() -> bool {
    true
}

impl Session {
    /// Load a session from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => match Self::from_toml(&content) {
                Ok(session) => Ok(session),
                Err(toml_err) => Self::from_json(&content).map_err(|json_err| {
                    anyhow::anyhow!(
                        "session {} is neither TOML ({toml_err:#}) nor JSON ({json_err:#})",
                        path.display()
                    )
                }),
            },
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse session as TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse session as JSON")
    }

    pub fn validate(&self) -> Result<()> {
        for (index, buffer) in self.buffers.iter().enumerate() {
            if buffer.name.is_empty() || buffer.full_name.is_empty() {
                anyhow::bail!("buffers[{index}] needs a name and a full_name");
            }
            if self.buffers[..index]
                .iter()
                .any(|other| other.full_name == buffer.full_name)
            {
                anyhow::bail!("buffer '{}' is declared twice", buffer.full_name);
            }
        }

        for (index, event) in self.events.iter().enumerate() {
            match event {
                Event::Command { buffer, .. } => {
                    let known = self
                        .buffers
                        .iter()
                        .any(|b| &b.name == buffer || &b.full_name == buffer);
                    if !known {
                        anyhow::bail!("events[{index}] uses unknown buffer '{buffer}'");
                    }
                }
                Event::Set { key, .. } | Event::Unset { key } => {
                    if key.is_empty() {
                        anyhow::bail!("events[{index}] has an empty key");
                    }
                }
            }
        }

        Ok(())
    }
}

/// Full setting path for `key`; keys containing a dot are already full.
pub fn setting_path(namespace: &str, key: &str) -> String {
    if key.contains('.') {
        key.to_string()
    } else {
        format!("{namespace}.{key}")
    }
}
