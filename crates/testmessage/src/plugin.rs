//! Plugin lifecycle: registration, configuration, command hook and unload.
//!
//! The host constructs one [`TestMessagePlugin`] per load and hands every
//! callback to it through [`TestMessagePlugin::handle`]. Unloading consumes
//! the plugin, so nothing survives into the next load.

use crate::{
    command::{self, COMMAND_NAME},
    config::ConfigStore,
    error::PluginError,
    settings::declarations,
};
use testmessage_host::{BufferRef, HookId, Host, HostEvent, PluginInfo, ReturnCode, Target};

pub const PLUGIN_NAME: &str = "custom_test";

const BANNER: &str = "----------------------------------------------------------------";

pub fn plugin_info() -> PluginInfo {
    PluginInfo {
        name: PLUGIN_NAME.to_string(),
        author: "Artfaith".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        license: "MIT".to_string(),
        description: "Test plugin printing configurable test messages.".to_string(),
        charset: String::new(),
    }
}

#[derive(Debug)]
pub struct TestMessagePlugin {
    info: PluginInfo,
    config: ConfigStore,
    command_hook: Option<HookId>,
}

impl TestMessagePlugin {
    /// Register with the host, sync configuration and install the command.
    ///
    /// Any failure is printed to the core buffer and stops the load before
    /// the command is installed.
    pub fn load(host: &mut impl Host) -> Result<Self, PluginError> {
        host.print(Target::Core, BANNER);
        host.print(
            Target::Core,
            &format!("Plugin version: '{}'", env!("CARGO_PKG_VERSION")),
        );

        let info = plugin_info();
        if !host.register(&info) {
            let err = PluginError::RegistrationFailed {
                name: info.name.clone(),
            };
            tracing::error!(%err, "plugin registration refused");
            host.print(
                Target::Core,
                &format!("[ - ] Failed registering script: {err}"),
            );
            return Err(err);
        }

        let mut config = ConfigStore::new(info.settings_namespace(), &declarations());
        let config_hook = match config.initialize(host) {
            Ok(hook) => hook,
            Err(err) => {
                tracing::error!(%err, "configuration failed");
                host.print(
                    Target::Core,
                    &format!("[ - ] Failed setting configuration: {err}"),
                );
                return Err(err);
            }
        };
        tracing::debug!(hook = ?config_hook, "config hook installed");

        host.print(
            Target::Core,
            &format!("[ * ] Loading script '{}'", info.name),
        );
        let command_hook = host.hook_command(&command::command_spec());
        if command_hook.is_none() {
            tracing::warn!(command = COMMAND_NAME, "command hook refused");
            host.print(
                Target::Core,
                &format!("[ - ] Failed hooking command '{COMMAND_NAME}'"),
            );
        }
        host.print(
            Target::Core,
            &format!("[ + ] Loaded script '{}'", info.name),
        );

        Ok(Self {
            info,
            config,
            command_hook,
        })
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn command_hook(&self) -> Option<HookId> {
        self.command_hook
    }

    /// Entry point for every host callback.
    pub fn handle(&mut self, host: &mut impl Host, event: HostEvent) -> ReturnCode {
        match event {
            HostEvent::Command { buffer, args } => self.on_command(host, buffer, &args),
            HostEvent::ConfigChanged { path, value } => {
                self.on_config_change(host, &path, value.as_deref())
            }
        }
    }

    pub fn on_command(&self, host: &mut impl Host, buffer: BufferRef, args: &str) -> ReturnCode {
        command::run(&self.config, host, buffer, args)
    }

    pub fn on_config_change(
        &mut self,
        host: &mut impl Host,
        path: &str,
        value: Option<&str>,
    ) -> ReturnCode {
        match self.config.on_change(host, path, value) {
            Ok(_) => ReturnCode::Ok,
            Err(err) => {
                tracing::warn!(path, %err, "ignoring settings change");
                host.print(
                    Target::Core,
                    &format!("[ - ] Ignoring settings change '{path}': {err}"),
                );
                ReturnCode::Error
            }
        }
    }

    /// Remove every hook this plugin owns and drop its state.
    pub fn unload(self, host: &mut impl Host) -> ReturnCode {
        host.print(
            Target::Core,
            &format!("[ * ] Unloading script '{}'", self.info.name),
        );
        host.unhook_all(&self.info.name);
        host.print(
            Target::Core,
            &format!("[ + ] Unloaded script '{}'", self.info.name),
        );
        ReturnCode::Ok
    }
}
