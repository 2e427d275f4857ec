//! winkey-hook: console host for the system-wide keyboard hook
//!
//! Installs the low-level keyboard hook, prints every key transition it
//! relays and removes the hook on Ctrl+C.
//!
//! Environment:
//! - `WINKEY_OUTPUT`: `text` (default) or `json`
//! - `WINKEY_HOOK_THREAD`: name of the hook thread
//! - `RUST_LOG`: log filter (default `info`)

mod config;
#[cfg_attr(not(windows), allow(dead_code, unused_imports))]
mod lifecycle;

use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use winkey_hook::KeyEvent;

use crate::config::{Config, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only key events
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "winkey-hook starting"
    );

    let config = Config::load().context("failed to load configuration")?;
    info!(output = ?config.output, hook_thread = %config.hook_thread_name, "configuration loaded");

    run(config).await
}

#[cfg(windows)]
async fn run(config: Config) -> Result<()> {
    use winkey_hook::HookController;

    use crate::lifecycle::ShutdownSignal;

    let shutdown = ShutdownSignal::new();
    let output = config.output;

    let mut hook = HookController::with_options(config.hook_options());
    hook.start(move |event: KeyEvent| -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        write_event(&mut stdout, output, &event)
    })
    .context("failed to start keyboard hook")?;

    info!("keyboard listener started, press Ctrl+C to exit");

    shutdown.wait().await;

    info!("shutting down...");
    hook.stop();
    info!("winkey-hook stopped");

    Ok(())
}

#[cfg(not(windows))]
async fn run(_config: Config) -> Result<()> {
    anyhow::bail!("the low-level keyboard hook is only available on Windows")
}

/// Print one delivered event in the configured format
#[cfg_attr(not(windows), allow(dead_code))]
fn write_event(out: &mut impl Write, output: OutputFormat, event: &KeyEvent) -> Result<()> {
    match output {
        OutputFormat::Text => writeln!(out, "{}", event)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
