use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;
mod session;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => args.run(),
        Command::Settings(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "testmessage", about = "Drive the testmessage plugin outside a chat client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the plugin into an in-memory host and replay a session file.
    Replay(cli::replay::ReplayArgs),
    /// List the settings the plugin declares.
    Settings(cli::settings::SettingsArgs),
}
