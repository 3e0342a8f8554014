//! The plugin API a chat-client host exposes to its plugins.
//!
//! Plugins never own buffers, settings or hooks; they call into a [`Host`]
//! for all of it. Callbacks travel the other way as [`HostEvent`]s, which
//! the host delivers one at a time to the plugin that registered for them.

mod memory;

pub use memory::{Hook, HookKind, Line, MemoryHost, Notification};

use std::fmt;

/// Root of the per-plugin settings tree, `plugins.var.<plugin>.<key>`.
pub const PLUGIN_SETTINGS_ROOT: &str = "plugins.var";

/// Opaque handle to a host-managed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferRef(pub u64);

impl fmt::Display for BufferRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Where a printed line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// The global core buffer.
    Core,
    Buffer(BufferRef),
}

/// String properties readable from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferField {
    /// Short name, e.g. `#rust`.
    Name,
    /// Namespaced name, e.g. `irc.libera.#rust`.
    FullName,
}

/// Outcome of writing a persisted setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    Changed,
    SameValue,
    NotFound,
    Error,
}

impl SetStatus {
    /// Numeric status as hosts traditionally report it.
    pub fn code(self) -> i32 {
        match self {
            SetStatus::Changed => 2,
            SetStatus::SameValue => 1,
            SetStatus::Error => 0,
            SetStatus::NotFound => -1,
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, SetStatus::Changed | SetStatus::SameValue)
    }
}

/// Value returned from plugin callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok,
    /// The callback could not do what the event asked for.
    Error,
}

/// Identifier handed out for an installed hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub u64);

/// Static metadata a plugin registers itself with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: String,
    pub author: String,
    pub version: String,
    pub license: String,
    pub description: String,
    /// Empty means the host default.
    pub charset: String,
}

impl PluginInfo {
    /// Settings namespace owned by this plugin.
    pub fn settings_namespace(&self) -> String {
        format!("{PLUGIN_SETTINGS_ROOT}.{}", self.name)
    }
}

/// Everything needed to install a command hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub usage: String,
    pub option_help: String,
    pub completion: String,
}

/// A callback delivered by the host to a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A registered command was issued in `buffer`.
    Command { buffer: BufferRef, args: String },
    /// A setting matching a config hook changed; `value` is `None` when the
    /// setting was removed.
    ConfigChanged { path: String, value: Option<String> },
}

/// Host primitives available to a plugin.
///
/// Setting keys are bare (`message_count`); the host resolves them under the
/// namespace of the plugin that registered itself.
pub trait Host {
    fn print(&mut self, target: Target, text: &str);

    fn buffer_field(&self, buffer: BufferRef, field: BufferField) -> Option<String>;

    fn is_setting_set(&self, key: &str) -> bool;

    fn setting(&self, key: &str) -> Option<String>;

    fn set_setting(&mut self, key: &str, value: &str) -> SetStatus;

    fn set_setting_description(&mut self, key: &str, description: &str);

    /// Install a change hook on every setting path matching `glob`.
    /// Returns `None` if the host refuses.
    fn hook_config(&mut self, glob: &str) -> Option<HookId>;

    fn hook_command(&mut self, spec: &CommandSpec) -> Option<HookId>;

    /// Remove every hook owned by the named plugin.
    fn unhook_all(&mut self, owner: &str);

    /// Register the calling plugin. Returns `false` if the host refuses.
    fn register(&mut self, info: &PluginInfo) -> bool;
}

/// Match `text` against a pattern where `*` stands for any run of characters.
pub fn glob_matches(pattern: &str, text: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == text,
        Some((head, rest)) => {
            let Some(mut tail) = text.strip_prefix(head) else {
                return false;
            };
            if rest.is_empty() {
                return true;
            }
            loop {
                if glob_matches(rest, tail) {
                    return true;
                }
                let mut chars = tail.chars();
                if chars.next().is_none() {
                    return false;
                }
                tail = chars.as_str();
            }
        }
    }
}
