//! The `testmessage` command.

use crate::{config::ConfigStore, settings::Setting};
use testmessage_host::{BufferField, BufferRef, CommandSpec, Host, ReturnCode, Target};

pub const COMMAND_NAME: &str = "testmessage";

pub fn command_spec() -> CommandSpec {
    CommandSpec {
        name: COMMAND_NAME.to_string(),
        description: "This a test command".to_string(),
        usage: "option1 [-a|-b] || option2".to_string(),
        option_help: "option1: Test Option #1\noption2: Test Option #2".to_string(),
        completion: "option1 || option2".to_string(),
    }
}

/// Parse the `buffers` setting; empty segments are dropped.
pub fn allow_list(raw: &str) -> Vec<&str> {
    raw.split(',').filter(|name| !name.is_empty()).collect()
}

/// An empty allow-list admits every buffer.
pub fn is_allowed(allow_list: &[&str], buffer_name: &str) -> bool {
    allow_list.is_empty() || allow_list.contains(&buffer_name)
}

/// Handle one invocation of the command from `buffer`.
///
/// Never fails: settings that cannot be read behave as an empty allow-list
/// and a single message.
pub fn run(store: &ConfigStore, host: &mut impl Host, buffer: BufferRef, args: &str) -> ReturnCode {
    let buffers = store.string(Setting::Buffers).unwrap_or_else(|err| {
        tracing::warn!(%err, "allow-list unreadable, allowing every buffer");
        ""
    });
    let name = host
        .buffer_field(buffer, BufferField::Name)
        .unwrap_or_default();

    if !is_allowed(&allow_list(buffers), &name) {
        let full_name = host
            .buffer_field(buffer, BufferField::FullName)
            .unwrap_or_default();
        tracing::debug!(buffer = %full_name, "command issued in disallowed buffer");
        host.print(
            Target::Core,
            &format!(
                "Issued command '{COMMAND_NAME}' in a disallowed buffer (\"{full_name}\"), args: {args}"
            ),
        );
        return ReturnCode::Ok;
    }

    let count = store.integer(Setting::MessageCount).unwrap_or_else(|err| {
        tracing::warn!(%err, "message count unreadable, sending one message");
        1
    });
    let target = Target::Buffer(buffer);

    if count <= 1 {
        host.print(
            target,
            &format!("Hurray! Command '{COMMAND_NAME}', args: {args}"),
        );
        return ReturnCode::Ok;
    }

    for i in 1..=count {
        host.print(
            target,
            &format!("Hurray #{i}! Command '{COMMAND_NAME}', args: {args}"),
        );
    }
    ReturnCode::Ok
}
