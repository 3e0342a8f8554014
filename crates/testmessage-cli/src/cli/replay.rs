use crate::session::{Event, Session, setting_path};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use testmessage::{TestMessagePlugin, command::COMMAND_NAME, plugin::plugin_info};
use testmessage_host::{HostEvent, MemoryHost, ReturnCode};

#[derive(Args)]
pub struct ReplayArgs {
    /// Path to the session file (TOML or JSON).
    pub session: PathBuf,

    /// Print the persisted settings after the replay.
    #[arg(long)]
    pub show_settings: bool,
}

impl ReplayArgs {
    pub fn run(&self) -> Result<()> {
        let session = Session::from_file(&self.session)?;
        session.validate()?;
        tracing::info!("Replaying session: {}", self.session.display());

        let mut host = MemoryHost::new();
        let result = replay(&mut host, &session);

        for line in render_transcript(&host) {
            println!("{line}");
        }
        if self.show_settings {
            for (path, value) in host.options() {
                println!("{path} = {value:?}");
            }
        }

        result
    }
}

/// Load the plugin into `host` and feed it the session's events.
pub fn replay(host: &mut MemoryHost, session: &Session) -> Result<()> {
    let namespace = plugin_info().settings_namespace();
    for (key, value) in &session.settings {
        host.preset_option(&setting_path(&namespace, key), value);
    }
    for buffer in &session.buffers {
        host.add_buffer(&buffer.name, &buffer.full_name);
    }

    let mut plugin = TestMessagePlugin::load(host).context("plugin failed to load")?;

    for event in &session.events {
        match event {
            Event::Command { buffer, args } => {
                let buffer = host
                    .find_buffer(buffer)
                    .with_context(|| format!("unknown buffer '{buffer}'"))?;
                if !host.has_command(COMMAND_NAME) {
                    tracing::warn!("command '{}' is not hooked, skipping", COMMAND_NAME);
                    continue;
                }
                plugin.handle(
                    host,
                    HostEvent::Command {
                        buffer,
                        args: args.clone(),
                    },
                );
            }
            Event::Set { key, value } => {
                let status = host.set_option(&setting_path(&namespace, key), value);
                tracing::debug!(key = %key, status = status.code(), "set option");
            }
            Event::Unset { key } => {
                let status = host.unset_option(&setting_path(&namespace, key));
                tracing::debug!(key = %key, status = status.code(), "unset option");
            }
        }

        for notification in host.take_notifications() {
            let path = notification.path.clone();
            let code = plugin.handle(
                host,
                HostEvent::ConfigChanged {
                    path: notification.path,
                    value: notification.value,
                },
            );
            if code == ReturnCode::Error {
                tracing::warn!(path = %path, "plugin rejected settings change");
            }
        }
    }

    if session.unload {
        plugin.unload(host);
        host.forget_plugin();
    }

    Ok(())
}

pub fn render_transcript(host: &MemoryHost) -> Vec<String> {
    host.output()
        .iter()
        .map(|line| format!("[{}] {}", host.target_label(line.target), line.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_session() {
        let session = Session::from_toml(
            r##"
[settings]
message_count = "1"

[[buffers]]
name = "#rust"
full_name = "irc.libera.#rust"

[[buffers]]
name = "#go"
full_name = "irc.libera.#go"

[[events]]
kind = "set"
key = "buffers"
value = "#rust"

[[events]]
kind = "command"
buffer = "#go"
args = "one"

[[events]]
kind = "set"
key = "message_count"
value = "2"

[[events]]
kind = "command"
buffer = "irc.libera.#rust"
args = "two"
"##,
        )
        .unwrap();

        let mut host = MemoryHost::new();
        replay(&mut host, &session).unwrap();

        let transcript = render_transcript(&host);
        let tail: Vec<&str> = transcript
            .iter()
            .skip_while(|line| !line.contains("Loaded script"))
            .skip(1)
            .map(String::as_str)
            .collect();
        assert_eq!(
            tail,
            [
                "[core] [ ! ] Settings item has changed, 'buffers': '' -> '#rust'",
                "[core] Issued command 'testmessage' in a disallowed buffer (\"irc.libera.#go\"), args: one",
                "[core] [ ! ] Settings item has changed, 'message_count': '1' -> '2'",
                "[irc.libera.#rust] Hurray #1! Command 'testmessage', args: two",
                "[irc.libera.#rust] Hurray #2! Command 'testmessage', args: two",
                "[core] [ * ] Unloading script 'custom_test'",
                "[core] [ + ] Unloaded script 'custom_test'",
            ]
        );
        assert!(host.hooks().is_empty());
        assert_eq!(
            host.option("plugins.var.custom_test.message_count"),
            Some("2")
        );
    }

    #[test]
    fn test_replay_keeps_transcript_on_load_failure() {
        let mut host = MemoryHost::new();
        host.refuse_register(true);
        let session = Session::from_toml("").unwrap();

        let err = replay(&mut host, &session).unwrap_err();
        assert_eq!(err.to_string(), "plugin failed to load");
        assert!(
            render_transcript(&host)
                .last()
                .is_some_and(|line| line.contains("Failed registering script"))
        );
    }
}
