//! The settings this plugin declares.

use crate::value::ValueType;

/// A setting owned by the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Comma-separated buffer names allowed to run the command; empty allows all.
    Buffers,
    /// How many test messages to print.
    MessageCount,
}

impl Setting {
    /// Declaration order, which is also the startup sync order.
    pub const ALL: [Setting; 2] = [Setting::Buffers, Setting::MessageCount];

    pub fn key(self) -> &'static str {
        match self {
            Setting::Buffers => "buffers",
            Setting::MessageCount => "message_count",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Setting::Buffers => ValueType::String,
            Setting::MessageCount => ValueType::Integer,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Setting::Buffers => {
                "Comma-separated buffer list to process. If empty - process all buffers."
            }
            Setting::MessageCount => "Test message count to send.",
        }
    }

    /// Default in host string form.
    pub fn default_raw(self) -> &'static str {
        match self {
            Setting::Buffers => "",
            Setting::MessageCount => "2",
        }
    }

    pub fn declaration(self) -> Declaration {
        Declaration {
            key: self.key(),
            type_name: Some(self.value_type().name()),
            description: self.description(),
            default: Some(self.default_raw()),
        }
    }
}

/// Table row a [`ConfigStore`](crate::ConfigStore) is built from.
///
/// Fields are optional so a declaration can be incomplete; the store reports
/// that when the item is used rather than when it is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub key: &'static str,
    pub type_name: Option<&'static str>,
    pub description: &'static str,
    pub default: Option<&'static str>,
}

/// Declarations for every [`Setting`], in declaration order.
pub fn declarations() -> Vec<Declaration> {
    Setting::ALL.into_iter().map(Setting::declaration).collect()
}
