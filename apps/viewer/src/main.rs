use anyhow::Context;
use log::{info, warn};

use nativeview_core::config::DEFAULT_CONFIG_FILE;
use nativeview_core::{DylibLoader, LifecycleGate, ShutdownToken, ViewerConfig};
use nativeview_platform_winit::run_viewer;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    let mut config = ViewerConfig::load_or_default(&config_path)
        .with_context(|| format!("loading config '{config_path}'"))?;
    config.apply_env();

    nativeview_modules_logging::init(&config.log_level);

    let spec = config.module_spec().context("resolving backend location")?;
    info!("viewer: backend {spec}");

    // Never returns without a backend: a failed load ends the process here.
    let backend = LifecycleGate::global().ensure_ready_or_exit(&DylibLoader, &spec);

    let shutdown = ShutdownToken::new();
    if let Err(e) = shutdown.install_ctrlc() {
        warn!("viewer: Ctrl+C handler not installed: {e}");
    }

    run_viewer(config, backend, shutdown)?;
    info!("viewer: bye");
    Ok(())
}
