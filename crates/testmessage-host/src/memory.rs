//! In-memory host used to drive plugins outside a chat client.
//!
//! It keeps the persisted settings tree, the known buffers, installed hooks
//! and every printed line. Setting changes that match an installed config
//! hook are queued as notifications for the caller to deliver.

use crate::{
    BufferField, BufferRef, CommandSpec, Host, HookId, PluginInfo, SetStatus, Target, glob_matches,
};
use std::collections::{BTreeMap, VecDeque};

/// One printed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub target: Target,
    pub text: String,
}

/// A pending change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub path: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookKind {
    Config { glob: String },
    Command(CommandSpec),
}

/// An installed hook and the plugin owning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub id: HookId,
    pub owner: String,
    pub kind: HookKind,
}

#[derive(Debug, Clone)]
struct BufferEntry {
    name: String,
    full_name: String,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    plugin: Option<PluginInfo>,
    options: BTreeMap<String, String>,
    descriptions: BTreeMap<String, String>,
    buffers: Vec<BufferEntry>,
    hooks: Vec<Hook>,
    next_hook_id: u64,
    output: Vec<Line>,
    pending: VecDeque<Notification>,
    refuse_register: bool,
    refuse_config_hook: bool,
    refuse_command_hook: bool,
    refuse_setting_writes: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer and return its handle.
    pub fn add_buffer(&mut self, name: &str, full_name: &str) -> BufferRef {
        self.buffers.push(BufferEntry {
            name: name.to_string(),
            full_name: full_name.to_string(),
        });
        BufferRef(self.buffers.len() as u64)
    }

    /// Look a buffer up by short or full name.
    pub fn find_buffer(&self, name: &str) -> Option<BufferRef> {
        self.buffers
            .iter()
            .position(|b| b.name == name || b.full_name == name)
            .map(|index| BufferRef(index as u64 + 1))
    }

    /// Store an option without notifying anyone, as if read from disk.
    pub fn preset_option(&mut self, path: &str, value: &str) {
        self.options.insert(path.to_string(), value.to_string());
    }

    /// Set an option by full path, the way a user would from the client.
    pub fn set_option(&mut self, path: &str, value: &str) -> SetStatus {
        if self.options.get(path).map(String::as_str) == Some(value) {
            return SetStatus::SameValue;
        }
        self.options.insert(path.to_string(), value.to_string());
        self.notify(path, Some(value));
        SetStatus::Changed
    }

    /// Remove an option by full path.
    pub fn unset_option(&mut self, path: &str) -> SetStatus {
        if self.options.remove(path).is_none() {
            return SetStatus::NotFound;
        }
        self.notify(path, None);
        SetStatus::Changed
    }

    pub fn option(&self, path: &str) -> Option<&str> {
        self.options.get(path).map(String::as_str)
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn description(&self, path: &str) -> Option<&str> {
        self.descriptions.get(path).map(String::as_str)
    }

    /// Drain queued change notifications in delivery order.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    pub fn output(&self) -> &[Line] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<Line> {
        std::mem::take(&mut self.output)
    }

    /// Text printed to `target`, in order.
    pub fn lines_for(&self, target: Target) -> Vec<&str> {
        self.output
            .iter()
            .filter(|line| line.target == target)
            .map(|line| line.text.as_str())
            .collect()
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    /// Whether a command hook with this name is installed.
    pub fn has_command(&self, name: &str) -> bool {
        self.hooks
            .iter()
            .any(|hook| matches!(&hook.kind, HookKind::Command(spec) if spec.name == name))
    }

    /// Drop the registered plugin after its shutdown callback ran. Settings
    /// stay, as they would on disk.
    pub fn forget_plugin(&mut self) -> Option<PluginInfo> {
        self.pending.clear();
        self.plugin.take()
    }

    /// Target label used when rendering transcripts.
    pub fn target_label(&self, target: Target) -> String {
        match target {
            Target::Core => "core".to_string(),
            Target::Buffer(buffer) => self
                .buffer_field(buffer, BufferField::FullName)
                .unwrap_or_else(|| buffer.to_string()),
        }
    }

    pub fn refuse_register(&mut self, refuse: bool) {
        self.refuse_register = refuse;
    }

    pub fn refuse_config_hook(&mut self, refuse: bool) {
        self.refuse_config_hook = refuse;
    }

    pub fn refuse_command_hook(&mut self, refuse: bool) {
        self.refuse_command_hook = refuse;
    }

    /// Make every plugin write to the persisted settings fail.
    pub fn refuse_setting_writes(&mut self, refuse: bool) {
        self.refuse_setting_writes = refuse;
    }

    fn plugin_path(&self, key: &str) -> Option<String> {
        self.plugin
            .as_ref()
            .map(|info| format!("{}.{key}", info.settings_namespace()))
    }

    fn notify(&mut self, path: &str, value: Option<&str>) {
        let hooked = self.hooks.iter().any(
            |hook| matches!(&hook.kind, HookKind::Config { glob } if glob_matches(glob, path)),
        );
        if hooked {
            self.pending.push_back(Notification {
                path: path.to_string(),
                value: value.map(str::to_string),
            });
        }
    }

    fn install(&mut self, kind: HookKind) -> Option<HookId> {
        let owner = self.plugin.as_ref()?.name.clone();
        self.next_hook_id += 1;
        let id = HookId(self.next_hook_id);
        self.hooks.push(Hook { id, owner, kind });
        Some(id)
    }
}

impl Host for MemoryHost {
    fn print(&mut self, target: Target, text: &str) {
        self.output.push(Line {
            target,
            text: text.to_string(),
        });
    }

    fn buffer_field(&self, buffer: BufferRef, field: BufferField) -> Option<String> {
        let index = usize::try_from(buffer.0).ok()?.checked_sub(1)?;
        let entry = self.buffers.get(index)?;
        Some(match field {
            BufferField::Name => entry.name.clone(),
            BufferField::FullName => entry.full_name.clone(),
        })
    }

    fn is_setting_set(&self, key: &str) -> bool {
        self.plugin_path(key)
            .is_some_and(|path| self.options.contains_key(&path))
    }

    fn setting(&self, key: &str) -> Option<String> {
        let path = self.plugin_path(key)?;
        self.options.get(&path).cloned()
    }

    fn set_setting(&mut self, key: &str, value: &str) -> SetStatus {
        match self.plugin_path(key) {
            Some(_) if self.refuse_setting_writes => SetStatus::Error,
            Some(path) => self.set_option(&path, value),
            None => SetStatus::Error,
        }
    }

    fn set_setting_description(&mut self, key: &str, description: &str) {
        if let Some(path) = self.plugin_path(key) {
            self.descriptions.insert(path, description.to_string());
        }
    }

    fn hook_config(&mut self, glob: &str) -> Option<HookId> {
        if self.refuse_config_hook {
            tracing::debug!(glob, "refusing config hook");
            return None;
        }
        self.install(HookKind::Config {
            glob: glob.to_string(),
        })
    }

    fn hook_command(&mut self, spec: &CommandSpec) -> Option<HookId> {
        if self.refuse_command_hook || self.has_command(&spec.name) {
            tracing::debug!(command = %spec.name, "refusing command hook");
            return None;
        }
        self.install(HookKind::Command(spec.clone()))
    }

    fn unhook_all(&mut self, owner: &str) {
        self.hooks.retain(|hook| hook.owner != owner);
    }

    fn register(&mut self, info: &PluginInfo) -> bool {
        if self.refuse_register || self.plugin.is_some() {
            return false;
        }
        self.plugin = Some(info.clone());
        true
    }
}
