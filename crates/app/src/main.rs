use std::process::ExitCode;

use crate::error::Result;

mod client;
mod commands;
mod config;
mod error;
mod local_state;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let (config, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendlog={level},engine={level}",
            level = config.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    commands::run(config, command).await
}
