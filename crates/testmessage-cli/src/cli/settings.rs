use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use testmessage::{Setting, plugin::plugin_info};

#[derive(Args)]
pub struct SettingsArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SettingRow {
    path: String,
    #[serde(rename = "type")]
    value_type: &'static str,
    default: &'static str,
    description: &'static str,
}

impl SettingsArgs {
    pub fn run(&self) -> Result<()> {
        let rows = rows();
        if self.json {
            let json = serde_json::to_string_pretty(&rows).context("failed to render settings")?;
            println!("{json}");
            return Ok(());
        }

        for row in rows {
            println!(
                "{} ({}, default {:?})\n    {}",
                row.path, row.value_type, row.default, row.description
            );
        }
        Ok(())
    }
}

fn rows() -> Vec<SettingRow> {
    let namespace = plugin_info().settings_namespace();
    Setting::ALL
        .into_iter()
        .map(|setting| SettingRow {
            path: format!("{namespace}.{}", setting.key()),
            value_type: setting.value_type().name(),
            default: setting.default_raw(),
            description: setting.description(),
        })
        .collect()
}
