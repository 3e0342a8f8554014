//! Typed configuration store mirrored to the host's persisted settings.
//!
//! Items are declared once at construction. At startup every item is either
//! loaded from the persisted store or written to it as a default; after that
//! host change notifications keep the in-memory copy current. Every write
//! coerces to the item's declared type, so a stored value always has it.

use crate::{
    error::{ConfigError, PluginError, UnknownValueType},
    settings::{Declaration, Setting},
    value::{Value, ValueType},
};
use std::collections::HashMap;
use testmessage_host::{Host, HookId, SetStatus, Target};

/// A declared setting and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigItem {
    pub key: String,
    /// Declared type name; resolved on use.
    pub type_name: Option<String>,
    pub description: String,
    /// Declared default in host string form.
    pub default: Option<String>,
    pub value: Option<Value>,
}

impl ConfigItem {
    fn declared(declaration: &Declaration) -> Self {
        let ty = declaration
            .type_name
            .and_then(|name| name.parse::<ValueType>().ok());
        let value = match (ty, declaration.default) {
            (Some(ty), Some(default)) => Some(Value::from(default).coerce(ty)),
            _ => None,
        };
        Self {
            key: declaration.key.to_string(),
            type_name: declaration.type_name.map(str::to_string),
            description: declaration.description.to_string(),
            default: declaration.default.map(str::to_string),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    namespace: String,
    order: Vec<String>,
    items: HashMap<String, ConfigItem>,
}

impl ConfigStore {
    /// Build a store for the settings under `namespace`.
    ///
    /// A key declared twice keeps its first position and its last declaration.
    pub fn new(namespace: impl Into<String>, declarations: &[Declaration]) -> Self {
        let mut order = Vec::with_capacity(declarations.len());
        let mut items = HashMap::with_capacity(declarations.len());
        for declaration in declarations {
            if items
                .insert(declaration.key.to_string(), ConfigItem::declared(declaration))
                .is_none()
            {
                order.push(declaration.key.to_string());
            }
        }
        Self {
            namespace: namespace.into(),
            order,
            items,
        }
    }

    /// Glob covering every setting of this store.
    pub fn hook_glob(&self) -> String {
        format!("{}.*", self.namespace)
    }

    pub fn item(&self, key: &str) -> Result<&ConfigItem, ConfigError> {
        self.items
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    pub fn value_type(&self, key: &str) -> Result<ValueType, ConfigError> {
        let item = self.item(key)?;
        let type_name = item
            .type_name
            .as_deref()
            .ok_or_else(|| ConfigError::MalformedItem(key.to_string()))?;
        type_name
            .parse::<ValueType>()
            .map_err(|UnknownValueType(type_name)| ConfigError::UnsupportedType {
                key: key.to_string(),
                type_name,
            })
    }

    pub fn value(&self, key: &str) -> Result<&Value, ConfigError> {
        self.item(key)?
            .value
            .as_ref()
            .ok_or_else(|| ConfigError::MalformedItem(key.to_string()))
    }

    pub fn string(&self, setting: Setting) -> Result<&str, ConfigError> {
        self.value(setting.key())?
            .as_str()
            .ok_or_else(|| ConfigError::MalformedItem(setting.key().to_string()))
    }

    pub fn integer(&self, setting: Setting) -> Result<i64, ConfigError> {
        self.value(setting.key())?
            .as_integer()
            .ok_or_else(|| ConfigError::MalformedItem(setting.key().to_string()))
    }

    /// Coerce `value` to the item's type and store it.
    ///
    /// Returns `false` without touching anything when the coerced value equals
    /// the current one. A change is reported on the core buffer.
    pub fn set_value(
        &mut self,
        host: &mut impl Host,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<bool, ConfigError> {
        let ty = self.value_type(key)?;
        let value = value.into().coerce(ty);
        let item = self
            .items
            .get_mut(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        if item.value.as_ref() == Some(&value) {
            return Ok(false);
        }

        let previous = item.value.replace(value);
        let previous = previous.map(|v| v.to_string()).unwrap_or_default();
        let current = item.value.as_ref().map(Value::to_string).unwrap_or_default();
        tracing::debug!(key, %previous, %current, "setting changed");
        host.print(
            Target::Core,
            &format!("[ ! ] Settings item has changed, '{key}': '{previous}' -> '{current}'"),
        );
        Ok(true)
    }

    /// Read `key` from the persisted store, falling back to `default`.
    ///
    /// `None` means nothing usable was found.
    pub fn sync_from_persisted(
        &self,
        host: &impl Host,
        key: &str,
        default: Option<&str>,
    ) -> Option<String> {
        if host.is_setting_set(key) {
            host.setting(key)
        } else {
            default.map(str::to_string)
        }
    }

    /// Unconditionally write `value` to the persisted store.
    pub fn write_to_persisted(&self, host: &mut impl Host, key: &str, value: &Value) -> SetStatus {
        let status = host.set_setting(key, &value.to_string());
        tracing::debug!(key, status = status.code(), "wrote persisted setting");
        status
    }

    /// Startup synchronization, then install the change hook.
    pub fn initialize(&mut self, host: &mut impl Host) -> Result<HookId, PluginError> {
        host.print(Target::Core, "[ * ] Setting configuration");

        let keys = self.order.clone();
        for key in &keys {
            let description = self.item(key)?.description.clone();
            host.set_setting_description(key, &description);

            if let Some(found) = self.sync_from_persisted(&*host, key, None) {
                if self.set_value(host, key, found)? {
                    tracing::info!(key = %key, "loaded persisted setting");
                    host.print(
                        Target::Core,
                        &format!("[ + ] Set found config value: '{key}'"),
                    );
                }
                continue;
            }

            let default = self.value(key)?.clone();
            let status = self.write_to_persisted(host, key, &default);
            if status.is_ok() {
                tracing::info!(key = %key, value = %default, "persisted default setting");
            } else {
                tracing::warn!(
                    key = %key,
                    value = %default,
                    status = status.code(),
                    "default setting not persisted"
                );
            }
            host.print(
                Target::Core,
                &format!("[   ] Set default config value: '{key}'"),
            );
        }

        let glob = self.hook_glob();
        let hook = host
            .hook_config(&glob)
            .ok_or(PluginError::HookRegistrationFailed { glob })?;

        host.print(Target::Core, "[ + ] Set configuration");
        Ok(hook)
    }

    /// Apply a host change notification.
    ///
    /// Paths outside the namespace are ignored and report `false`. A missing
    /// value means the setting was removed; the declared default comes back.
    pub fn on_change(
        &mut self,
        host: &mut impl Host,
        path: &str,
        value: Option<&str>,
    ) -> Result<bool, ConfigError> {
        let Some(key) = path
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
        else {
            return Ok(false);
        };

        let raw = match value {
            Some(raw) => raw.to_string(),
            None => self
                .item(key)?
                .default
                .clone()
                .ok_or_else(|| ConfigError::MalformedItem(key.to_string()))?,
        };
        self.set_value(host, key, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::declarations;
    use testmessage_host::{MemoryHost, PluginInfo};

    const NAMESPACE: &str = "plugins.var.demo";

    fn host() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.register(&PluginInfo {
            name: "demo".to_string(),
            author: String::new(),
            version: String::new(),
            license: String::new(),
            description: String::new(),
            charset: String::new(),
        });
        host
    }

    fn store() -> ConfigStore {
        ConfigStore::new(NAMESPACE, &declarations())
    }

    #[test]
    fn test_declared_types_resolve() {
        let store = store();
        for setting in Setting::ALL {
            assert_eq!(store.value_type(setting.key()), Ok(setting.value_type()));
        }
        assert_eq!(store.integer(Setting::MessageCount), Ok(2));
        assert_eq!(store.string(Setting::Buffers), Ok(""));
    }

    #[test]
    fn test_unknown_key() {
        let mut host = host();
        let mut store = store();
        let err = ConfigError::UnknownKey("nope".to_string());
        assert_eq!(store.item("nope").unwrap_err(), err);
        assert_eq!(store.value_type("nope").unwrap_err(), err);
        assert_eq!(store.value("nope").unwrap_err(), err);
        assert_eq!(store.set_value(&mut host, "nope", 1i64).unwrap_err(), err);
    }

    #[test]
    fn test_malformed_declarations() {
        let mut host = host();
        let mut store = ConfigStore::new(
            NAMESPACE,
            &[
                Declaration {
                    key: "untyped",
                    type_name: None,
                    description: "",
                    default: Some("1"),
                },
                Declaration {
                    key: "float",
                    type_name: Some("float"),
                    description: "",
                    default: Some("1.5"),
                },
                Declaration {
                    key: "empty",
                    type_name: Some("integer"),
                    description: "",
                    default: None,
                },
            ],
        );

        assert_eq!(
            store.value_type("untyped"),
            Err(ConfigError::MalformedItem("untyped".to_string()))
        );
        assert_eq!(
            store.value_type("float"),
            Err(ConfigError::UnsupportedType {
                key: "float".to_string(),
                type_name: "float".to_string(),
            })
        );
        assert_eq!(
            store.set_value(&mut host, "float", "2"),
            Err(ConfigError::UnsupportedType {
                key: "float".to_string(),
                type_name: "float".to_string(),
            })
        );
        assert_eq!(
            store.value("empty"),
            Err(ConfigError::MalformedItem("empty".to_string()))
        );

        // a write gives the item a value
        assert_eq!(store.set_value(&mut host, "empty", "4"), Ok(true));
        assert_eq!(store.value("empty"), Ok(&Value::Integer(4)));
    }

    #[test]
    fn test_set_value_is_idempotent() {
        let mut host = host();
        let mut store = store();

        assert_eq!(store.set_value(&mut host, "message_count", "5"), Ok(true));
        assert_eq!(host.take_output().len(), 1);

        assert_eq!(store.set_value(&mut host, "message_count", 5i64), Ok(false));
        assert_eq!(store.set_value(&mut host, "message_count", " 5"), Ok(false));
        assert!(host.output().is_empty());
    }

    #[test]
    fn test_set_value_coerces() {
        let mut host = host();
        let mut store = store();

        let cases: [(Value, Value); 5] = [
            (Value::from("7"), Value::Integer(7)),
            (Value::from("abc"), Value::Integer(0)),
            (Value::from(true), Value::Integer(1)),
            (Value::from("-3x"), Value::Integer(-3)),
            (Value::from(12i64), Value::Integer(12)),
        ];
        for (input, expected) in cases {
            store.set_value(&mut host, "message_count", input).unwrap();
            assert_eq!(store.value("message_count"), Ok(&expected));
        }

        store.set_value(&mut host, "buffers", 42i64).unwrap();
        assert_eq!(store.value("buffers"), Ok(&Value::from("42")));
    }

    #[test]
    fn test_change_is_reported() {
        let mut host = host();
        let mut store = store();
        store.set_value(&mut host, "message_count", "3").unwrap();
        assert_eq!(
            host.lines_for(Target::Core),
            ["[ ! ] Settings item has changed, 'message_count': '2' -> '3'"]
        );
    }

    #[test]
    fn test_sync_from_persisted() {
        let mut host = host();
        let store = store();

        assert_eq!(store.sync_from_persisted(&host, "message_count", None), None);
        assert_eq!(
            store.sync_from_persisted(&host, "message_count", Some("9")),
            Some("9".to_string())
        );

        host.set_setting("message_count", "4");
        assert_eq!(
            store.sync_from_persisted(&host, "message_count", Some("9")),
            Some("4".to_string())
        );
    }

    #[test]
    fn test_write_to_persisted() {
        let mut host = host();
        let store = store();
        let value = Value::Integer(6);
        assert_eq!(
            store.write_to_persisted(&mut host, "message_count", &value),
            SetStatus::Changed
        );
        assert_eq!(
            store.write_to_persisted(&mut host, "message_count", &value),
            SetStatus::SameValue
        );
        assert_eq!(host.option("plugins.var.demo.message_count"), Some("6"));
    }

    #[test]
    fn test_on_change_strips_namespace() {
        let mut host = host();
        let mut store = store();

        assert_eq!(
            store.on_change(&mut host, "plugins.var.demo.message_count", Some("3")),
            Ok(true)
        );
        assert_eq!(store.integer(Setting::MessageCount), Ok(3));

        assert_eq!(
            store.on_change(&mut host, "plugins.var.other.message_count", Some("8")),
            Ok(false)
        );
        assert_eq!(
            store.on_change(&mut host, "plugins.var.demonstration", Some("8")),
            Ok(false)
        );
        assert_eq!(store.integer(Setting::MessageCount), Ok(3));

        assert_eq!(
            store.on_change(&mut host, "plugins.var.demo.colour", Some("red")),
            Err(ConfigError::UnknownKey("colour".to_string()))
        );
    }

    #[test]
    fn test_on_change_unset_restores_default() {
        let mut host = host();
        let mut store = store();
        store.set_value(&mut host, "message_count", 9i64).unwrap();

        assert_eq!(
            store.on_change(&mut host, "plugins.var.demo.message_count", None),
            Ok(true)
        );
        assert_eq!(store.integer(Setting::MessageCount), Ok(2));
    }
}
